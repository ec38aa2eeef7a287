//! Common error types for MCN

use thiserror::Error;

/// Common result type for MCN operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the MCN crates
///
/// Ordinary "not found" and "not yet granted" conditions are returned by the
/// core as outcome values; these variants exist for loading faults and for
/// mapping outcomes onto transport responses.
#[derive(Error, Debug)]
pub enum Error {
    /// Artwork or route identifier absent from the catalog
    #[error("Not found: {0}")]
    NotFound(String),

    /// Artwork exists but the visitor session has not scanned it
    #[error("Access not granted for artwork {0}")]
    Unauthorized(String),

    /// Language code outside fr, en, wo
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Scan or manual input does not resolve to any artwork
    #[error("Invalid code: {0}")]
    InvalidCode(String),

    /// External collaborator (chat gateway, camera) failed
    #[error("Collaborator failure: {0}")]
    Collaborator(#[from] CollaboratorFailure),

    /// Catalog dataset violates a load-time invariant
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON dataset
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed TOML configuration
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Transient failure of an external collaborator
///
/// Always retryable from the visitor's point of view.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorFailure {
    #[error("rate limit exceeded, please try again later")]
    RateLimited,

    #[error("payment required by the assistant provider")]
    PaymentRequired,

    #[error("upstream returned status {0}")]
    Upstream(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed reply: {0}")]
    MalformedReply(String),

    #[error("assistant is not configured")]
    Unavailable,

    #[error("camera permission denied")]
    CameraPermissionDenied,
}
