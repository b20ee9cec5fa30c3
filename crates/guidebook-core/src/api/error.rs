use thiserror::Error;

use crate::models::GuideError;
use crate::offline::FetchError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Guide not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Malformed guide document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid guide document: {0}")]
    Invalid(#[from] GuideError),

    #[error("Invalid guide slug: {0:?}")]
    InvalidSlug(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: u16, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status {
            404 => ApiError::NotFound(truncated),
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// True when the failure says nothing about the guide itself, only about
    /// reaching it.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ApiError::Fetch(e) if e.is_connectivity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(ApiError::from_status(404, ""), ApiError::NotFound(_)));
        assert!(matches!(ApiError::from_status(503, "down"), ApiError::ServerError(b) if b == "down"));
        assert!(matches!(ApiError::from_status(418, "teapot"), ApiError::InvalidResponse(m) if m == "Status 418: teapot"));
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "x".repeat(800);
        match ApiError::from_status(500, &body) {
            ApiError::ServerError(msg) => {
                assert!(msg.starts_with(&"x".repeat(500)));
                assert!(msg.ends_with("(truncated, 800 total bytes)"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let body = "ø".repeat(400);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }

    #[test]
    fn test_connectivity() {
        assert!(ApiError::Fetch(FetchError::Offline).is_connectivity());
        assert!(!ApiError::NotFound(String::new()).is_connectivity());
    }
}
