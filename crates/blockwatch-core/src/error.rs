use thiserror::Error;

/// Application-wide error types for blockwatch.
///
/// Per-domain network failures are not represented here: they are
/// [`ProbeFailure`](crate::models::ProbeFailure)s and never leave the
/// per-domain pipeline.
#[derive(Error, Debug)]
pub enum AppError {
    /// Domain list missing or unreadable.
    #[error("Input error: {0}")]
    InputError(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP client could not be constructed.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Writing a verdict to the result sink failed.
    #[error("Output error: {0}")]
    OutputError(String),

    /// Persisting captured block evidence failed.
    #[error("Evidence error: {0}")]
    EvidenceError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}
