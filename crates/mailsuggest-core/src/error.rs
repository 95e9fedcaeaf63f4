//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The recipient history document could not be parsed.
    #[error("History document error: {0}")]
    XmlRead(#[from] quick_xml::DeError),

    /// The recipient history document could not be written.
    #[error("History document error: {0}")]
    XmlWrite(#[from] quick_xml::SeError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The recipient history could not be read.
    #[error("Recipient history unavailable: {0}")]
    StoreUnavailable(String),

    /// A recipient could not be recorded.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
