use thiserror::Error;

use crate::models::AdState;

/// Errors that can occur when driving a VPAID ad unit
#[derive(Error, Debug)]
pub enum VpaidError {
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unknown ad event: {0}")]
    UnknownEvent(String),

    #[error("Cannot {operation} while the ad is {state}")]
    InvalidState {
        operation: &'static str,
        state: AdState,
    },
}

impl VpaidError {
    /// Create an invalid state error for a host call made at the wrong point of the lifecycle
    pub fn invalid_state(operation: &'static str, state: AdState) -> Self {
        Self::InvalidState { operation, state }
    }
}

pub type Result<T> = std::result::Result<T, VpaidError>;
