//! Offline Cache Controller.
//!
//! Intercepts requests and decides, per request, whether to answer from the
//! network, from the cache, or both. The pieces:
//!
//! - `request`: the runtime-independent `Request` / `Response` pair
//! - `fetch`: the `Fetch` contract and the reqwest-backed `NetworkFetcher`
//! - `route`: resource classes and the ordered, first-match-wins `Router`
//! - `controller`: the `OfflineController` that applies each route's strategy

pub mod controller;
pub mod error;
pub mod fetch;
pub mod request;
pub mod route;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{ControllerState, OfflineController};
pub use error::FetchError;
pub use fetch::{Fetch, NetworkFetcher};
pub use request::{CacheMode, Destination, Request, Response, ResponseSource};
pub use route::{Matcher, ResourceClass, Route, Router, Strategy};
