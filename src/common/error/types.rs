//! Unified error types for the transfer engine.

use thiserror::Error;

/// Main error type for transfer operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The bearer credential for the source or destination has been revoked
    /// or expired beyond refresh.
    #[error("Access revoked: {0}")]
    AccessRevoked(String),

    /// The remote service rejected the call for this specific resource.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The remote resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Destination schema does not match the declared column mappings.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The source service could not be reached at all.
    #[error("Source unreachable: {0}")]
    SourceUnreachable(String),

    /// No job with the given id exists in the store.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// The job is in a state that does not permit the requested operation.
    #[error("Invalid job state: {0}")]
    InvalidJob(String),

    /// Job store failure
    #[error("Job store error: {0}")]
    Store(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error aborts a running job rather than being isolated
    /// to a single row or image.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::AccessRevoked(_) | Error::SchemaMismatch(_) | Error::SourceUnreachable(_)
        )
    }
}

/// Result type for transfer operations.
pub type Result<T> = std::result::Result<T, Error>;
