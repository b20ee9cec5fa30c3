use std::time::Duration;

use thiserror::Error;

/// Why a fetch produced no response at all.
///
/// An HTTP error status is still a response and never shows up here.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network unavailable (offline mode)")]
    Offline,

    #[error("Network did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("No response available for {url}")]
    NoResponse { url: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    pub fn no_response(url: impl Into<String>) -> Self {
        FetchError::NoResponse { url: url.into() }
    }

    /// True for failures that mean the network itself is unreachable.
    pub fn is_connectivity(&self) -> bool {
        match self {
            FetchError::Offline | FetchError::Timeout(_) => true,
            FetchError::Network(e) => e.is_connect() || e.is_timeout(),
            FetchError::NoResponse { .. } | FetchError::InvalidRequest(_) => false,
        }
    }
}
