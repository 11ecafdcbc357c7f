//! Common types for Commons image search results
//!
//! These are the shapes handed between the resolver, the downloader and the
//! outer surfaces (CLI and MCP tools).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single normalized image from a Commons search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// File title with the `File:` namespace prefix removed
    pub title: String,
    /// URL of the full resolution original (empty if the service omitted it)
    pub full_url: String,
    /// URL of the 800px wide rendition (empty if the service omitted it)
    pub thumb_url: String,
}

/// Outcome of a search after the failure policy has been applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// The topic that was searched for
    pub query: String,
    /// Records in the order the service returned the pages
    pub results: Vec<ImageRecord>,
    /// Why `results` is empty, when it is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Which URL of each record the downloader fetches
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum UrlField {
    /// The full resolution original
    Full,
    /// The 800px wide rendition
    Thumbnail,
}

impl UrlField {
    /// Project the selected URL out of a record
    pub fn select<'a>(&self, record: &'a ImageRecord) -> &'a str {
        match self {
            Self::Full => &record.full_url,
            Self::Thumbnail => &record.thumb_url,
        }
    }
}

/// Result of fetching one URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadItem {
    pub url: String,
    /// Where the file was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Why the fetch failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a bulk download
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadReport {
    /// Destination directory
    pub destination: PathBuf,
    /// URL field that was downloaded
    pub field: UrlField,
    pub saved: usize,
    pub failed: usize,
    /// Records whose selected URL was empty
    pub skipped: usize,
    /// Per-URL results, in record order
    pub items: Vec<DownloadItem>,
}
