//! Error taxonomy for the scoring service.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    /// A required parameter is missing or malformed. Aborts only the call.
    #[error("Invalid parameter: {0}")]
    InvalidInput(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScoutError>;

impl ScoutError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScoutError::InvalidInput(_) | ScoutError::UnknownFunction(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Validate a token address parameter and return it trimmed.
pub fn require_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(ScoutError::InvalidInput("token address is required".into()));
    }
    if trimmed.len() > 64 {
        return Err(ScoutError::InvalidInput("token address is too long".into()));
    }
    Ok(trimmed.to_string())
}
