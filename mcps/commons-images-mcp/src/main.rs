//! Commons Images CLI and MCP Server
//!
//! Searches Wikimedia Commons for bitmap images, downloads them, or serves
//! both operations as MCP tools over stdio.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rmcp::{transport::stdio, ServiceExt};
use serde::Serialize;
use std::path::PathBuf;

use commons_images_mcp::{
    init::init_tracing, CommonsImagesMcpServer, Config, Downloader, ImageSearch, UrlField,
};

#[derive(Parser)]
#[command(name = "commons-images")]
#[command(about = "Search and download bitmap images from Wikimedia Commons")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.binks/commons-images.toml)
    #[arg(long, global = true, env = "COMMONS_IMAGES_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Log level for this crate
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Search and print the results as JSON
    Search {
        /// Topic to search for
        query: String,
        /// Maximum number of files to request
        #[arg(long, short)]
        limit: Option<u32>,
    },
    /// Search, then download the chosen URL of every result
    Download {
        /// Topic to search for
        query: String,
        /// Destination directory
        #[arg(long, short)]
        dest: PathBuf,
        /// Which URL to download
        #[arg(long, short, value_enum)]
        field: UrlField,
        /// Maximum number of files to request
        #[arg(long, short)]
        limit: Option<u32>,
    },
    /// Run as an MCP server on stdio
    Serve,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing("commons_images_mcp", &cli.log_level)?;

    let config = match cli.config {
        Some(path) => Config::load_from(Some(path))?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Search { query, limit } => {
            let search = ImageSearch::from_config(&config)?;
            let limit = limit.unwrap_or(config.search.default_limit);
            let outcome = search.run(&query, limit).await?;
            print_json(&outcome)?;
        }
        Commands::Download {
            query,
            dest,
            field,
            limit,
        } => {
            let search = ImageSearch::from_config(&config)?;
            let downloader = Downloader::new(&config.download, &config.identification)?;
            let limit = limit.unwrap_or(config.search.default_limit);

            let outcome = search.run(&query, limit).await?;
            if let Some(diagnostic) = &outcome.diagnostic {
                tracing::warn!("{}", diagnostic);
            }

            let report = downloader.download(&outcome.results, field, &dest).await?;
            tracing::info!(
                saved = report.saved,
                failed = report.failed,
                skipped = report.skipped,
                "Download finished"
            );
            print_json(&report)?;
        }
        Commands::Serve => {
            tracing::info!("Starting Commons Images MCP Server");

            let server = CommonsImagesMcpServer::new(config)?;
            let service = server.serve(stdio()).await?;

            tracing::info!("Server running, waiting for requests...");
            service.waiting().await?;

            tracing::info!("Server shutting down");
        }
    }

    Ok(())
}
