//! Local caching module for offline data access.
//!
//! This module provides the `CacheManager`, the on-disk store behind the
//! Offline Cache Controller. Responses are kept per resource class (a
//! "bucket") and keyed by URL:
//!
//! - `<bucket>/index.json`: URL → capture time and response metadata
//! - `<bucket>/<sha256(url)>.body`: raw response bytes
//!
//! Each bucket is pruned by its own `ExpirationPolicy`.

pub mod expiration;
pub mod manager;

pub use expiration::ExpirationPolicy;
pub use manager::{BucketStats, CacheManager, CachedData, EntryMeta};
