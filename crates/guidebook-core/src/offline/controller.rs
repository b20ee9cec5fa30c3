use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::{Fetch, FetchError, Request, Response, Route, Router, Strategy};
use crate::cache::{BucketStats, CacheManager};
use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Installing,
    Active,
}

struct Inner {
    network: Arc<dyn Fetch>,
    router: Router,
    cache: CacheManager,
    active: AtomicBool,
    background: Mutex<JoinSet<()>>,
}

/// Intercepts fetches and applies the matching route's caching strategy.
///
/// Each interception is an independent decision over the shared cache store.
/// Network fetches that outlive their caller, and stale-while-revalidate
/// refreshes, run as detached tasks tracked in a `JoinSet`.
#[derive(Clone)]
pub struct OfflineController {
    inner: Arc<Inner>,
}

impl OfflineController {
    /// Create a controller over `network`. It starts `Installing` and passes
    /// requests straight through until activated.
    pub fn new(router: Router, cache: CacheManager, network: Arc<dyn Fetch>) -> Self {
        Self {
            inner: Arc::new(Inner {
                network,
                router,
                cache,
                active: AtomicBool::new(false),
                background: Mutex::new(JoinSet::new()),
            }),
        }
    }

    /// Create and immediately activate, taking over every request without
    /// waiting for a previous controller to go away.
    pub fn install(router: Router, cache: CacheManager, network: Arc<dyn Fetch>) -> Self {
        let controller = Self::new(router, cache, network);
        controller.activate();
        controller
    }

    /// Install a controller for the configured origin over the cache stored
    /// in `cache_dir`. Entries written by an earlier run are served as soon
    /// as this returns.
    pub fn register(
        config: &Config,
        cache_dir: PathBuf,
        network: Arc<dyn Fetch>,
    ) -> anyhow::Result<Self> {
        let origin = config.origin()?;
        let cache = CacheManager::new(cache_dir)?;
        let router = Router::standard(origin, &config.external_image_hosts);
        Ok(Self::install(router, cache, network))
    }

    pub fn activate(&self) {
        if !self.inner.active.swap(true, Ordering::SeqCst) {
            info!(origin = %self.inner.router.origin(), "Offline controller activated");
        }
    }

    pub fn state(&self) -> ControllerState {
        if self.inner.active.load(Ordering::SeqCst) {
            ControllerState::Active
        } else {
            ControllerState::Installing
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == ControllerState::Active
    }

    pub fn router(&self) -> &Router {
        &self.inner.router
    }

    pub fn cache(&self) -> &CacheManager {
        &self.inner.cache
    }

    /// Entry counts for every bucket the routes write to.
    pub fn stats(&self) -> Vec<BucketStats> {
        self.inner
            .router
            .routes()
            .iter()
            .filter_map(|route| match self.inner.cache.stats(route.class.cache_name()) {
                Ok(stats) => Some(stats),
                Err(e) => {
                    warn!(bucket = route.class.cache_name(), error = %e, "Failed to read cache stats");
                    None
                }
            })
            .collect()
    }

    /// Wait for all detached network work to finish.
    pub async fn settle(&self) {
        loop {
            let mut pending = std::mem::take(&mut *self.background());
            if pending.is_empty() {
                return;
            }
            while pending.join_next().await.is_some() {}
        }
    }

    fn background(&self) -> std::sync::MutexGuard<'_, JoinSet<()>> {
        self.inner.background.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut set = self.background();
        // Reap finished tasks so the set does not grow for the whole session
        while set.try_join_next().is_some() {}
        set.spawn(task);
    }

    /// Network-first: race the network against `timeout`, then fall back to
    /// the freshest cached copy. A network fetch that loses the race keeps
    /// running and still updates the cache.
    async fn network_first(&self, route: &Route, request: &Request, timeout: Duration) -> Result<Response, FetchError> {
        let (tx, rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        let detached_route = route.clone();
        let detached_request = request.clone();
        self.spawn(async move {
            let result = inner.network.fetch(&detached_request).await;
            if let Ok(response) = &result {
                inner.store(&detached_route, response);
            }
            // Receiver is gone when the caller already fell back to cache
            let _ = tx.send(result);
        });

        let error = match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(Ok(response))) => return Ok(response),
            Ok(Ok(Err(e))) => e,
            Ok(Err(_)) => FetchError::no_response(request.url.as_str()),
            Err(_) => {
                debug!(url = %request.url, ?timeout, "Network too slow, trying cache");
                FetchError::Timeout(timeout)
            }
        };

        match self.inner.cached(route, request.url.as_str()) {
            Some(cached) => {
                debug!(url = %request.url, error = %error, "Serving cached copy after network failure");
                Ok(cached)
            }
            None => Err(error),
        }
    }

    /// Stale-while-revalidate: answer from cache and refresh it in the
    /// background. On a miss the network answer is awaited instead.
    async fn stale_while_revalidate(&self, route: &Route, request: &Request) -> Result<Response, FetchError> {
        let Some(cached) = self.inner.cached(route, request.url.as_str()) else {
            return match self.inner.network.fetch(request).await {
                Ok(response) => {
                    self.inner.store(route, &response);
                    Ok(response)
                }
                Err(e) => {
                    debug!(url = %request.url, error = %e, "No cached copy and network failed");
                    Err(FetchError::no_response(request.url.as_str()))
                }
            };
        };

        let inner = Arc::clone(&self.inner);
        let detached_route = route.clone();
        let detached_request = request.clone();
        self.spawn(async move {
            match inner.network.fetch(&detached_request).await {
                Ok(response) => inner.store(&detached_route, &response),
                Err(e) => debug!(url = %detached_request.url, error = %e, "Background refresh failed"),
            }
        });

        Ok(cached)
    }
}

impl Inner {
    /// Fresh cached copy for `url`, if any. Expired entries and storage
    /// failures both read as a miss.
    fn cached(&self, route: &Route, url: &str) -> Option<Response> {
        let bucket = route.class.cache_name();
        match self.cache.get(bucket, url) {
            Ok(Some(entry)) if route.expiration.is_fresh(entry.cached_at, Utc::now()) => Some(entry.data),
            Ok(Some(entry)) => {
                debug!(bucket, url, cached_at = %entry.cached_at, "Cached copy expired");
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(bucket, url, error = %e, "Cache read failed");
                None
            }
        }
    }

    /// Store a cacheable response and prune its bucket. Failures are logged
    /// and otherwise ignored.
    fn store(&self, route: &Route, response: &Response) {
        if !response.is_cacheable() {
            debug!(url = %response.url, status = response.status, "Not caching response");
            return;
        }
        let bucket = route.class.cache_name();
        if let Err(e) = self.cache.put(bucket, response) {
            warn!(bucket, url = %response.url, error = %e, "Cache write failed");
            return;
        }
        if let Err(e) = self.cache.prune(bucket, &route.expiration, Utc::now()) {
            warn!(bucket, error = %e, "Cache prune failed");
        }
    }
}

#[async_trait]
impl Fetch for OfflineController {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        if !self.is_active() {
            return self.inner.network.fetch(request).await;
        }

        let Some(route) = self.inner.router.route(request) else {
            return self.inner.network.fetch(request).await;
        };
        debug!(url = %request.url, class = ?route.class, "Routing request");

        match route.strategy {
            Strategy::NetworkFirst { timeout } => self.network_first(route, request, timeout).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(route, request).await,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
