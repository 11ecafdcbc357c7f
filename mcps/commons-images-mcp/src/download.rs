//! Bulk image download
//!
//! Fetches one URL per record into a destination directory with bounded
//! concurrency. A failed URL is recorded in the report and never aborts the
//! rest of the batch.

use futures_util::stream::{self, StreamExt};
use reqwest::{header::USER_AGENT, Client};
use std::path::Path;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::DownloadConfig;
use crate::error::{ImagesError, ImagesResult};
use crate::request::Identification;
use crate::transport::REQWEST_IDENTIFIER;
use crate::types::{DownloadItem, DownloadReport, ImageRecord, UrlField};

/// Extension used when the URL path has none
const FALLBACK_EXTENSION: &str = "jpg";

/// Concurrent fetch-and-save of image URLs
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    user_agent: String,
    max_concurrent: usize,
}

impl Downloader {
    pub fn new(config: &DownloadConfig, identification: &Identification) -> ImagesResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ImagesError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            user_agent: identification.user_agent(REQWEST_IDENTIFIER),
            max_concurrent: config.max_concurrent.max(1),
        })
    }

    /// Download the `field` URL of every record into `dest`
    ///
    /// Records whose selected URL is empty are counted as skipped.
    ///
    /// # Errors
    ///
    /// Fails only if `dest` is empty or cannot be created; per-file failures
    /// are reported in [`DownloadReport::items`].
    pub async fn download(
        &self,
        records: &[ImageRecord],
        field: UrlField,
        dest: &Path,
    ) -> ImagesResult<DownloadReport> {
        if dest.as_os_str().is_empty() {
            return Err(ImagesError::InvalidArgument(
                "destination directory must not be empty".to_string(),
            ));
        }
        tokio::fs::create_dir_all(dest).await?;

        let urls: Vec<String> = records
            .iter()
            .map(|r| field.select(r))
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();
        let skipped = records.len() - urls.len();

        info!(
            count = urls.len(),
            skipped,
            dest = %dest.display(),
            "Downloading images"
        );

        let items: Vec<DownloadItem> = stream::iter(urls)
            .map(|url| self.fetch_one(url, dest))
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let failed = items.iter().filter(|item| item.error.is_some()).count();

        Ok(DownloadReport {
            destination: dest.to_path_buf(),
            field,
            saved: items.len() - failed,
            failed,
            skipped,
            items,
        })
    }

    async fn fetch_one(&self, url: String, dest: &Path) -> DownloadItem {
        let path = dest.join(file_name_for(&url));

        match self.save(&url, &path).await {
            Ok(()) => {
                debug!(url = %url, path = %path.display(), "saved");
                DownloadItem {
                    url,
                    path: Some(path),
                    error: None,
                }
            }
            Err(e) => {
                warn!(url = %url, kind = e.kind(), "download failed: {}", e);
                DownloadItem {
                    url,
                    path: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn save(&self, url: &str, path: &Path) -> ImagesResult<()> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImagesError::Transport(format!("HTTP {} for {}", status, url)));
        }

        let bytes = response.bytes().await?;
        tokio::fs::write(path, &bytes).await?;
        Ok(())
    }
}

/// `<uuid>.<ext>`, taking the extension from the URL path when it has one
fn file_name_for(url: &str) -> String {
    let extension = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .and_then(|name| {
            name.rsplit_once('.')
                .map(|(_, ext)| ext.to_ascii_lowercase())
                .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        })
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());

    format!("{}.{}", uuid::Uuid::new_v4(), extension)
}
