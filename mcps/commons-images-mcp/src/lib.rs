//! Commons Images MCP Library
//!
//! Searches Wikimedia Commons for bitmap images and normalizes the results
//! into [`ImageRecord`]s, with an optional bulk downloader on top.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use commons_images_mcp::{Config, ImageSearch};
//!
//! let search = ImageSearch::from_config(&Config::load()?)?;
//! let outcome = search.search_images("polar bear", 10).await;
//! for image in &outcome.results {
//!     println!("{} -> {}", image.title, image.thumb_url);
//! }
//! ```
//!
//! # Configuration
//! Set `COMMONS_BOT_NAME` / `COMMONS_BOT_CONTACT` env vars or configure in
//! `~/.binks/commons-images.toml`

pub mod config;
pub mod download;
pub mod error;
pub mod init;
pub mod request;
pub mod resolve;
pub mod search;
pub mod server;
pub mod transport;
pub mod types;

pub use config::Config;
pub use download::Downloader;
pub use error::{ImagesError, ImagesResult};
pub use request::{Identification, SearchRequest};
pub use resolve::{resolve, EmptyReason, Resolution};
pub use search::{FailurePolicy, ImageSearch};
pub use server::CommonsImagesMcpServer;
pub use transport::{ReqwestTransport, Transport};
pub use types::{DownloadReport, ImageRecord, SearchOutcome, UrlField};
