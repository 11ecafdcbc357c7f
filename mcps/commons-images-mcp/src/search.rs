//! Search orchestration
//!
//! Composes request building, the transport and the resolver. What happens to
//! a failure is decided by [`FailurePolicy`]: the default degrades it into an
//! empty, logged outcome so batch workflows keep going.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

use crate::config::Config;
use crate::error::{ImagesError, ImagesResult};
use crate::request::{Identification, SearchRequest};
use crate::resolve::{resolve, Resolution};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::SearchOutcome;

/// What [`ImageSearch::run`] does with a failed search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and return an empty outcome carrying a diagnostic
    #[default]
    Degrade,
    /// Return the error to the caller
    Propagate,
}

/// Stateless Commons image search; cheap to clone and safe to share
#[derive(Clone)]
pub struct ImageSearch {
    transport: Arc<dyn Transport>,
    identification: Identification,
    endpoint: Url,
    policy: FailurePolicy,
}

impl ImageSearch {
    pub fn new(transport: Arc<dyn Transport>, identification: Identification, endpoint: Url) -> Self {
        Self {
            transport,
            identification,
            endpoint,
            policy: FailurePolicy::default(),
        }
    }

    /// Build a search over the reqwest transport from configuration
    pub fn from_config(config: &Config) -> ImagesResult<Self> {
        let transport = ReqwestTransport::new(config.search.timeout())?;
        let search = Self::new(
            Arc::new(transport),
            config.identification.clone(),
            config.search.endpoint()?,
        );
        Ok(search.with_policy(config.search.failure_policy()))
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn identification(&self) -> &Identification {
        &self.identification
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Search without any failure conversion
    pub async fn try_search_images(&self, query: &str, limit: u32) -> ImagesResult<Resolution> {
        let request = SearchRequest::build(query, limit, &self.identification, &self.endpoint)?;
        let raw = self.transport.fetch(&request).await?;
        resolve(&raw)
    }

    /// Search, never failing: errors become an empty outcome with a diagnostic
    pub async fn search_images(&self, query: &str, limit: u32) -> SearchOutcome {
        match self.try_search_images(query, limit).await {
            Ok(resolution) => outcome_from(query, resolution),
            Err(e) => degraded(query, &e),
        }
    }

    /// Search under the configured [`FailurePolicy`]
    pub async fn run(&self, query: &str, limit: u32) -> ImagesResult<SearchOutcome> {
        match self.policy {
            FailurePolicy::Degrade => Ok(self.search_images(query, limit).await),
            FailurePolicy::Propagate => {
                let resolution = self.try_search_images(query, limit).await?;
                Ok(outcome_from(query, resolution))
            }
        }
    }
}

fn outcome_from(query: &str, resolution: Resolution) -> SearchOutcome {
    let diagnostic = resolution.empty_reason().map(|reason| {
        tracing::info!(query, "{}", reason);
        reason.to_string()
    });

    if diagnostic.is_none() {
        tracing::info!(query, count = resolution.records().len(), "Resolved images");
    }

    SearchOutcome {
        query: query.to_string(),
        results: resolution.into_records(),
        diagnostic,
    }
}

fn degraded(query: &str, error: &ImagesError) -> SearchOutcome {
    tracing::warn!(query, kind = error.kind(), "Error fetching images: {}", error);

    SearchOutcome {
        query: query.to_string(),
        results: Vec::new(),
        diagnostic: Some(format!("Error fetching images: {}", error)),
    }
}
