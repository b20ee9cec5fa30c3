use reqwest::Url;
use serde::de::DeserializeOwned;

/// What the requester intends to do with the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    #[default]
    Document,
    Image,
    Other,
}

/// Request-level cache directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    #[default]
    Default,
    /// Bypass any HTTP-level cache between us and the origin.
    NoStore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: Url,
    pub destination: Destination,
    pub cache_mode: CacheMode,
}

impl Request {
    pub fn get(url: Url) -> Self {
        Self {
            url,
            destination: Destination::Document,
            cache_mode: CacheMode::Default,
        }
    }

    pub fn image(url: Url) -> Self {
        Self {
            destination: Destination::Image,
            ..Self::get(url)
        }
    }

    pub fn no_store(mut self) -> Self {
        self.cache_mode = CacheMode::NoStore;
        self
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub source: ResponseSource,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Only complete `200` responses fresh from the network are stored.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.source == ResponseSource::Network
    }

    pub fn from_cache(&self) -> bool {
        self.source == ResponseSource::Cache
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}
