//! Error types for Commons image search
//!
//! Field-level absence inside a well-formed response is never an error (the
//! resolver substitutes defaults), and a zero-match search is reported through
//! [`crate::resolve::Resolution::Empty`]. What remains lives here.

use thiserror::Error;

/// Errors that can occur while building, fetching, resolving or downloading
#[derive(Error, Debug)]
pub enum ImagesError {
    /// A caller-supplied argument was rejected before any I/O happened
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Network failure or a non-success HTTP status
    #[error("transport error: {0}")]
    Transport(String),

    /// The body was not JSON, not an object, or had a container of the wrong type
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Filesystem failure while saving downloads
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImagesError {
    /// Short, stable name of the error kind (used in diagnostics and logs)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Transport(_) => "transport_error",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Io(_) => "io_error",
        }
    }
}

impl From<reqwest::Error> for ImagesError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Result type alias for image search operations
pub type ImagesResult<T> = Result<T, ImagesError>;
