//! Search request construction
//!
//! Builds the MediaWiki `generator=search` query that asks Commons for files
//! in the File namespace, restricted to bitmaps, with image info attached.
//! See: https://commons.wikimedia.org/w/api.php?action=help&modules=query%2Bimageinfo

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ImagesError, ImagesResult};

/// Public Commons API endpoint
pub const COMMONS_API_URL: &str = "https://commons.wikimedia.org/w/api.php";

/// Page count requested when the caller does not give one
pub const DEFAULT_LIMIT: u32 = 100;

/// Width of the pre-scaled rendition returned as `thumburl`
pub const THUMBNAIL_WIDTH: u32 = 800;

/// MediaWiki File namespace
const FILE_NAMESPACE: &str = "6";

/// Identifies this client to the remote service (sent as the User-Agent)
///
/// Rendered as `<bot>/<version> (<contact>)`; the transport appends its own
/// library identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identification {
    pub bot_name: String,
    pub version: String,
    pub contact: String,
}

impl Default for Identification {
    fn default() -> Self {
        Self {
            bot_name: "WikiImageBot".to_string(),
            version: "1.0".to_string(),
            contact: "your-github-repo-or-email".to_string(),
        }
    }
}

impl Identification {
    pub fn new(
        bot_name: impl Into<String>,
        version: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            bot_name: bot_name.into(),
            version: version.into(),
            contact: contact.into(),
        }
    }

    /// `<bot>/<version> (<contact>)`
    pub fn descriptor(&self) -> String {
        format!("{}/{} ({})", self.bot_name, self.version, self.contact)
    }

    /// Full User-Agent value with the transport library identifier appended
    pub fn user_agent(&self, transport: &str) -> String {
        format!("{} {}", self.descriptor(), transport)
    }
}

/// A fully specified search request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    endpoint: Url,
    query: String,
    limit: u32,
    identification: String,
}

impl SearchRequest {
    /// Build a request for `topic`
    ///
    /// The topic is embedded unmodified into `filetype:bitmap <topic>`.
    ///
    /// # Errors
    ///
    /// Returns [`ImagesError::InvalidArgument`] if `limit` is zero.
    pub fn build(
        topic: &str,
        limit: u32,
        identification: &Identification,
        endpoint: &Url,
    ) -> ImagesResult<Self> {
        if limit == 0 {
            return Err(ImagesError::InvalidArgument(
                "limit must be a positive integer".to_string(),
            ));
        }

        Ok(Self {
            endpoint: endpoint.clone(),
            query: format!("filetype:bitmap {}", topic),
            limit,
            identification: identification.descriptor(),
        })
    }

    /// Start a builder with the default limit, identification and endpoint
    pub fn builder(topic: impl Into<String>) -> SearchRequestBuilder {
        SearchRequestBuilder::new(topic)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The search expression sent as `gsrsearch`
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Identification descriptor, without the transport suffix
    pub fn identification(&self) -> &str {
        &self.identification
    }

    /// User-Agent value for a given transport library identifier
    pub fn user_agent(&self, transport: &str) -> String {
        format!("{} {}", self.identification, transport)
    }

    /// Outbound query parameters, in the order they are sent
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("action", "query".to_string()),
            ("format", "json".to_string()),
            ("generator", "search".to_string()),
            ("gsrnamespace", FILE_NAMESPACE.to_string()),
            ("gsrsearch", self.query.clone()),
            ("gsrlimit", self.limit.to_string()),
            ("prop", "imageinfo".to_string()),
            ("iiprop", "url|dimensions|mime".to_string()),
            ("iiurlwidth", THUMBNAIL_WIDTH.to_string()),
        ]
    }
}

/// Builder for [`SearchRequest`] with the usual defaults filled in
#[derive(Debug, Clone)]
pub struct SearchRequestBuilder {
    topic: String,
    limit: u32,
    identification: Identification,
    endpoint: Option<Url>,
}

impl SearchRequestBuilder {
    fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            limit: DEFAULT_LIMIT,
            identification: Identification::default(),
            endpoint: None,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn identification(mut self, identification: Identification) -> Self {
        self.identification = identification;
        self
    }

    pub fn endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn build(self) -> ImagesResult<SearchRequest> {
        let endpoint = match self.endpoint {
            Some(url) => url,
            None => parse_endpoint(COMMONS_API_URL)?,
        };
        SearchRequest::build(&self.topic, self.limit, &self.identification, &endpoint)
    }
}

/// Parse an API endpoint, rejecting anything that is not http(s)
pub fn parse_endpoint(raw: &str) -> ImagesResult<Url> {
    let url = Url::parse(raw)
        .map_err(|e| ImagesError::InvalidArgument(format!("invalid endpoint '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ImagesError::InvalidArgument(format!(
            "unsupported endpoint scheme '{}'",
            other
        ))),
    }
}
