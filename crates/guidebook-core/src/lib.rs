//! Core library for Guidebook.
//!
//! Guidebook renders a static, JSON-driven apartment guide and keeps it usable
//! when the network is slow or gone. This crate holds everything that is not
//! presentation:
//!
//! - `models`: the `Guide` document and its localizable text
//! - `i18n`: supported languages and text resolution
//! - `offline`: the Offline Cache Controller (routing + caching strategies)
//! - `cache`: the on-disk cache store and expiration policies
//! - `api` / `loader`: fetching, validating and selecting a language for a guide
//! - `search`: the flattened, language-aware item index
//! - `view`: the six-view navigation state machine and its fragment history
//! - `contact`, `image`, `manifest`: smaller contracts consumed by the viewer

pub mod api;
pub mod cache;
pub mod config;
pub mod contact;
pub mod i18n;
pub mod image;
pub mod loader;
pub mod manifest;
pub mod models;
pub mod offline;
pub mod search;
pub mod utils;
pub mod view;

pub use api::{ApiClient, ApiError};
pub use config::Config;
pub use image::{ImagePlaceholder, ImageTracker};
pub use i18n::Lang;
pub use loader::{GuideLoader, LoadOutcome, LoadTicket, LoadedGuide};
pub use models::Guide;
pub use offline::{Fetch, FetchError, OfflineController, Request, Response};
pub use search::{SearchEntry, SearchIndex};
pub use view::{Action, History, View, ViewState};
