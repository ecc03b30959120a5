//! Error types for lolpub-core

use thiserror::Error;

use crate::models::TargetKind;

/// Result type alias using lolpub-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in lolpub-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing address, token or other required setting. No network call is made.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Remote call failed
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// Front-matter block could not be parsed
    #[error("Front-matter parse error: {0}")]
    Frontmatter(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Failure of a single remote call, tagged with the target it was aimed at.
#[derive(Error, Debug)]
#[error("{target} request failed: {cause}")]
pub struct PublishError {
    pub target: TargetKind,
    pub cause: PublishFailure,
}

impl PublishError {
    #[must_use]
    pub const fn new(target: TargetKind, cause: PublishFailure) -> Self {
        Self { target, cause }
    }

    /// True when the request never produced an HTTP response.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self.cause, PublishFailure::Network(_))
    }
}

/// Why a remote call failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishFailure {
    /// Transport-level failure (DNS, TLS, connection reset, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx status
    #[error("HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// 2xx status but the success envelope is missing or malformed
    #[error("response missing `{0}`")]
    MalformedEnvelope(String),
}
