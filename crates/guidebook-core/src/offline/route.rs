use std::time::Duration;

use reqwest::Url;

use super::{Destination, Request};
use crate::cache::ExpirationPolicy;

/// Network wait before a guide document falls back to cache.
pub const GUIDE_NETWORK_TIMEOUT: Duration = Duration::from_secs(3);

/// Network wait for shell assets before falling back to cache.
pub const SHELL_NETWORK_TIMEOUT: Duration = Duration::from_secs(10);

/// Path prefix and file name that identify a guide document.
const GUIDE_PATH_PREFIX: &str = "/guides/";
const GUIDE_FILE_SUFFIX: &str = "/guide.json";

/// Named category of request governing which strategy applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    GuideDocument,
    LocalImage,
    ExternalImage,
    Shell,
    CrossOrigin,
}

impl ResourceClass {
    pub const ALL: [ResourceClass; 5] = [
        ResourceClass::GuideDocument,
        ResourceClass::LocalImage,
        ResourceClass::ExternalImage,
        ResourceClass::Shell,
        ResourceClass::CrossOrigin,
    ];

    /// Cache bucket this class stores into.
    pub fn cache_name(&self) -> &'static str {
        match self {
            ResourceClass::GuideDocument => "guide-json",
            ResourceClass::LocalImage => "local-images",
            ResourceClass::ExternalImage => "external-images",
            ResourceClass::Shell => "others",
            ResourceClass::CrossOrigin => "cross-origin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Prefer the network; fall back to cache after `timeout` or on failure.
    NetworkFirst { timeout: Duration },
    /// Answer from cache immediately and refresh it in the background.
    StaleWhileRevalidate,
}

/// Request predicate for one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Same origin, under `/guides/`, ending in `/guide.json`.
    GuideDocument,
    /// Image destination on the same origin.
    SameOriginImage,
    /// Image destination on one of the listed hosts (or their subdomains).
    ExternalImage { hosts: Vec<String> },
    /// Anything on the same origin.
    SameOrigin,
    /// Anything at all.
    Any,
}

impl Matcher {
    pub fn matches(&self, request: &Request, origin: &Url) -> bool {
        let url = &request.url;
        let same_origin = url.origin() == origin.origin();
        match self {
            Matcher::GuideDocument => {
                same_origin
                    && url.path().starts_with(GUIDE_PATH_PREFIX)
                    && url.path().ends_with(GUIDE_FILE_SUFFIX)
            }
            Matcher::SameOriginImage => same_origin && request.destination == Destination::Image,
            Matcher::ExternalImage { hosts } => {
                request.destination == Destination::Image
                    && url
                        .host_str()
                        .map(|host| hosts.iter().any(|h| host_matches(host, h)))
                        .unwrap_or(false)
            }
            Matcher::SameOrigin => same_origin,
            Matcher::Any => true,
        }
    }
}

fn host_matches(host: &str, pattern: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let pattern = pattern.to_ascii_lowercase();
    host == pattern || host.ends_with(&format!(".{}", pattern))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub class: ResourceClass,
    pub matcher: Matcher,
    pub strategy: Strategy,
    pub expiration: ExpirationPolicy,
}

/// Ordered routes, evaluated first-match-wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Router {
    origin: Url,
    routes: Vec<Route>,
}

impl Router {
    pub fn new(origin: Url, routes: Vec<Route>) -> Self {
        Self { origin, routes }
    }

    /// The standard route table for a site served from `origin`.
    pub fn standard(origin: Url, external_image_hosts: &[String]) -> Self {
        let routes = vec![
            Route {
                class: ResourceClass::GuideDocument,
                matcher: Matcher::GuideDocument,
                strategy: Strategy::NetworkFirst {
                    timeout: GUIDE_NETWORK_TIMEOUT,
                },
                expiration: ExpirationPolicy::days(50, 30),
            },
            Route {
                class: ResourceClass::LocalImage,
                matcher: Matcher::SameOriginImage,
                strategy: Strategy::StaleWhileRevalidate,
                expiration: ExpirationPolicy::days(200, 30),
            },
            Route {
                class: ResourceClass::ExternalImage,
                matcher: Matcher::ExternalImage {
                    hosts: external_image_hosts.to_vec(),
                },
                strategy: Strategy::StaleWhileRevalidate,
                expiration: ExpirationPolicy::days(200, 14),
            },
            Route {
                class: ResourceClass::Shell,
                matcher: Matcher::SameOrigin,
                strategy: Strategy::NetworkFirst {
                    timeout: SHELL_NETWORK_TIMEOUT,
                },
                expiration: ExpirationPolicy::hours(32, 24),
            },
            Route {
                class: ResourceClass::CrossOrigin,
                matcher: Matcher::Any,
                strategy: Strategy::NetworkFirst {
                    timeout: SHELL_NETWORK_TIMEOUT,
                },
                expiration: ExpirationPolicy::hours(32, 1),
            },
        ];
        Self::new(origin, routes)
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route(&self, request: &Request) -> Option<&Route> {
        self.routes.iter().find(|r| r.matcher.matches(request, &self.origin))
    }
}
