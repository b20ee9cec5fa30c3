use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::debug;

use super::{CacheMode, FetchError, Request, Response, ResponseSource};

/// HTTP request timeout in seconds.
/// Independent of the controller's own, much shorter, network-first bound.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Anything that can turn a `Request` into a `Response`.
///
/// Implemented by the raw network fetcher and by the `OfflineController`,
/// which wraps another `Fetch` and intercepts its traffic.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

/// Network access through reqwest.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct NetworkFetcher {
    client: Client,
    offline: bool,
}

impl NetworkFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            offline: false,
        })
    }

    /// A fetcher that fails every request as if the device had no network.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }
}

#[async_trait]
impl Fetch for NetworkFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        if self.offline {
            return Err(FetchError::Offline);
        }

        let mut builder = self.client.get(request.url.clone());
        if request.cache_mode == CacheMode::NoStore {
            builder = builder
                .header(header::CACHE_CONTROL, "no-store")
                .header(header::PRAGMA, "no-cache");
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        debug!(url = %request.url, status, bytes = body.len(), "Network response");

        Ok(Response {
            url: request.url.to_string(),
            status,
            content_type,
            body,
            source: ResponseSource::Network,
        })
    }
}
