//! Guide document API.
//!
//! This module provides the `ApiClient` that requests
//! `/guides/{slug}/guide.json` through any `Fetch` implementation (the raw
//! network or the Offline Cache Controller) and turns the response into a
//! validated `Guide`.

pub mod client;
pub mod error;

pub use client::{is_valid_slug, ApiClient, FetchedGuide, MAX_SLUG_LENGTH};
pub use error::ApiError;
