//! HTTP transport for search requests
//!
//! The resolver only sees decoded JSON; everything network-shaped happens
//! behind the [`Transport`] trait so callers (and tests) can swap it out.

use async_trait::async_trait;
use reqwest::{header::USER_AGENT, Client};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{ImagesError, ImagesResult};
use crate::request::SearchRequest;

/// Library identifier appended to the User-Agent by [`ReqwestTransport`]
pub const REQWEST_IDENTIFIER: &str = "reqwest/0.12";

/// Longest body excerpt carried in a transport error
const ERROR_EXCERPT_CHARS: usize = 200;

/// Performs the HTTP exchange for a [`SearchRequest`]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Library identifier appended to the identification descriptor
    fn identifier(&self) -> &str;

    /// Send the request and return the decoded JSON body
    ///
    /// # Errors
    ///
    /// [`ImagesError::Transport`] on network failure or non-success status,
    /// [`ImagesError::MalformedResponse`] if the body is not JSON.
    async fn fetch(&self, request: &SearchRequest) -> ImagesResult<Value>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> ImagesResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImagesError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    fn identifier(&self) -> &str {
        REQWEST_IDENTIFIER
    }

    #[instrument(skip(self, request), fields(query = %request.query(), limit = request.limit()))]
    async fn fetch(&self, request: &SearchRequest) -> ImagesResult<Value> {
        debug!("GET {}", request.endpoint());

        let response = self
            .client
            .get(request.endpoint().clone())
            .query(&request.params())
            .header(USER_AGENT, request.user_agent(self.identifier()))
            .send()
            .await
            .map_err(|e| {
                ImagesError::Transport(format!("request to {} failed: {}", request.endpoint(), e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ImagesError::Transport(format!(
                "Commons API error {}: {}",
                status,
                excerpt(&text)
            )));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ImagesError::MalformedResponse(format!(
                "response is not valid JSON ({}): {}",
                e,
                excerpt(&text)
            ))
        })
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(ERROR_EXCERPT_CHARS).collect()
}
