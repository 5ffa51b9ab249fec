//! Error types for configuration loading and validation.
//!
//! Classification and scanning never fail; only reading configuration or
//! tree documents, and explicit pattern validation, produce these.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern '{source_text}': {message}")]
    InvalidPattern {
        /// Regex text as written in the catalog. Not named `source`, which
        /// thiserror would take as the underlying cause.
        source_text: String,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
