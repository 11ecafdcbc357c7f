//! MCP Server implementation for Commons image search
//!
//! Exposes search and bulk download as MCP tools over stdio.

use anyhow::Result;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::Config;
use crate::download::Downloader;
use crate::error::ImagesError;
use crate::search::ImageSearch;
use crate::types::{DownloadReport, SearchOutcome, UrlField};

/// The main Commons Images MCP Server
#[derive(Clone)]
pub struct CommonsImagesMcpServer {
    search: ImageSearch,
    downloader: Downloader,
    config: Config,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Parameter Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchImagesParams {
    /// The search topic
    #[schemars(description = "Free-text topic, e.g. 'polar bear'")]
    pub query: String,
    /// Maximum number of files to request
    #[schemars(description = "Maximum number of files to request (default: 100)")]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DownloadImagesParams {
    /// The search topic
    #[schemars(description = "Free-text topic, e.g. 'grizzly bear'")]
    pub query: String,
    /// Destination directory
    #[schemars(description = "Directory to save images into (created if missing)")]
    pub dest: String,
    /// Which URL of each result to download
    #[schemars(description = "'full' for the original file, 'thumbnail' for the 800px rendition")]
    pub field: UrlField,
    /// Maximum number of files to request
    #[schemars(description = "Maximum number of files to request (default: 100)")]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
struct DownloadSummary {
    search: SearchOutcome,
    download: DownloadReport,
}

fn to_mcp_error(e: ImagesError) -> McpError {
    match e {
        ImagesError::InvalidArgument(msg) => McpError::invalid_params(msg, None),
        other => McpError::internal_error(other.to_string(), None),
    }
}

fn json_success<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Tool Router Implementation
// ============================================================================

#[tool_router]
impl CommonsImagesMcpServer {
    pub fn new(config: Config) -> Result<Self> {
        tracing::info!("Using Commons API at {}", config.search.api_url);

        let search = ImageSearch::from_config(&config)?;
        let downloader = Downloader::new(&config.download, &config.identification)?;

        Ok(Self {
            search,
            downloader,
            config,
            tool_router: Self::tool_router(),
        })
    }

    #[tool(description = "Search Wikimedia Commons for bitmap images. Returns titles, full-resolution URLs and 800px thumbnail URLs.")]
    async fn search_images(
        &self,
        Parameters(params): Parameters<SearchImagesParams>,
    ) -> Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(self.config.search.default_limit);

        tracing::info!("Searching images for: {} (limit: {})", params.query, limit);

        let outcome = self
            .search
            .run(&params.query, limit)
            .await
            .map_err(to_mcp_error)?;

        json_success(&outcome)
    }

    #[tool(description = "Search Wikimedia Commons and download the chosen URL field of every result into a directory.")]
    async fn download_images(
        &self,
        Parameters(params): Parameters<DownloadImagesParams>,
    ) -> Result<CallToolResult, McpError> {
        let limit = params.limit.unwrap_or(self.config.search.default_limit);

        tracing::info!(
            "Downloading {:?} images for: {} (limit: {}) into {}",
            params.field,
            params.query,
            limit,
            params.dest
        );

        let search = self
            .search
            .run(&params.query, limit)
            .await
            .map_err(to_mcp_error)?;

        let download = self
            .downloader
            .download(&search.results, params.field, Path::new(&params.dest))
            .await
            .map_err(to_mcp_error)?;

        json_success(&DownloadSummary { search, download })
    }

    #[tool(description = "Get the current Commons search configuration.")]
    async fn get_config(&self) -> Result<CallToolResult, McpError> {
        #[derive(Serialize)]
        struct ConfigStatus {
            api_url: String,
            user_agent_descriptor: String,
            default_limit: u32,
            failure_policy: crate::search::FailurePolicy,
            max_concurrent_downloads: usize,
        }

        let status = ConfigStatus {
            api_url: self.search.endpoint().to_string(),
            user_agent_descriptor: self.search.identification().descriptor(),
            default_limit: self.config.search.default_limit,
            failure_policy: self.search.policy(),
            max_concurrent_downloads: self.config.download.max_concurrent,
        };

        json_success(&status)
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for CommonsImagesMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Commons Images MCP Server - searches Wikimedia Commons for bitmap \
                 images and bulk-downloads either the full resolution files or \
                 their 800px thumbnails. No API keys required."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
