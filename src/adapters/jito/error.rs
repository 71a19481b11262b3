//! Jito Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum JitoError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Block engine error: {message} (code: {code})")]
    Api { code: i32, message: String },

    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for JitoError {
    fn from(err: reqwest::Error) -> Self {
        JitoError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for JitoError {
    fn from(err: serde_json::Error) -> Self {
        JitoError::Serialization(err.to_string())
    }
}
