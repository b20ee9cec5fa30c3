//! Client for guide documents and their images.

use std::sync::Arc;

use reqwest::Url;
use tracing::debug;

use super::ApiError;
use crate::models::Guide;
use crate::offline::{Fetch, FetchError, Request, Response, ResponseSource};

/// Slugs longer than this are rejected without a request.
pub const MAX_SLUG_LENGTH: usize = 64;

/// A slug is one path segment of ASCII letters, digits, `-` or `_`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LENGTH
        && slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// A validated guide and where its bytes came from.
#[derive(Debug, Clone)]
pub struct FetchedGuide {
    pub guide: Guide,
    pub source: ResponseSource,
}

/// Guide API over any `Fetch`.
/// Clone is cheap - the fetcher is shared behind an Arc.
#[derive(Clone)]
pub struct ApiClient {
    origin: Url,
    fetcher: Arc<dyn Fetch>,
}

impl ApiClient {
    pub fn new(origin: Url, fetcher: Arc<dyn Fetch>) -> Self {
        Self { origin, fetcher }
    }

    /// Same origin, different fetch path (e.g. once the offline controller
    /// has taken over).
    pub fn with_fetcher(&self, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            origin: self.origin.clone(),
            fetcher,
        }
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn guide_url(&self, slug: &str) -> Result<Url, ApiError> {
        if !is_valid_slug(slug) {
            return Err(ApiError::InvalidSlug(slug.to_string()));
        }
        self.resolve(&format!("/guides/{}/guide.json", slug))
            .map_err(ApiError::from)
    }

    /// Resolve a possibly relative resource reference against the origin.
    pub fn resolve(&self, reference: &str) -> Result<Url, FetchError> {
        self.origin
            .join(reference)
            .map_err(|e| FetchError::InvalidRequest(format!("{}: {}", reference, e)))
    }

    /// Fetch, parse and validate the guide for `slug`.
    ///
    /// The request always carries a no-store directive so only the offline
    /// controller's policy decides what is served from cache.
    pub async fn fetch_guide(&self, slug: &str) -> Result<FetchedGuide, ApiError> {
        let url = self.guide_url(slug)?;
        let request = Request::get(url).no_store();
        let response = self.fetcher.fetch(&request).await?;

        if !response.is_success() {
            return Err(ApiError::from_status(response.status, &response.text()));
        }

        let guide: Guide = response.json()?;
        guide.validate()?;

        debug!(
            slug,
            source = ?response.source,
            categories = guide.categories.len(),
            "Fetched guide"
        );
        Ok(FetchedGuide {
            guide,
            source: response.source,
        })
    }

    /// Fetch an image referenced by a guide.
    pub async fn fetch_image(&self, reference: &str) -> Result<Response, FetchError> {
        let request = Request::image(self.resolve(reference)?);
        let response = self.fetcher.fetch(&request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(FetchError::no_response(response.url))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::testing::ScriptedFetch;

    const GUIDE_URL: &str = "https://guide.example/guides/harbor/guide.json";

    const MINIMAL: &str = r#"{
        "apartmentId": "harbor",
        "name": "Harbor Loft",
        "emergency": {"contacts": [], "items": []},
        "categories": []
    }"#;

    fn client() -> (Arc<ScriptedFetch>, ApiClient) {
        let network = Arc::new(ScriptedFetch::new());
        let client = ApiClient::new(Url::parse("https://guide.example").unwrap(), network.clone());
        (network, client)
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("harbor-loft_2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("../etc"));
        assert!(!is_valid_slug("a b"));
        assert!(!is_valid_slug("ø"));
        assert!(is_valid_slug(&"a".repeat(64)));
        assert!(!is_valid_slug(&"a".repeat(65)));
    }

    #[test]
    fn test_guide_url() {
        let (_, client) = client();
        assert_eq!(client.guide_url("harbor").unwrap().as_str(), GUIDE_URL);
        assert!(matches!(client.guide_url("a/b"), Err(ApiError::InvalidSlug(_))));
    }

    #[test]
    fn test_resolve_relative_and_absolute_images() {
        let (_, client) = client();
        assert_eq!(
            client.resolve("/img/kettle.jpg").unwrap().as_str(),
            "https://guide.example/img/kettle.jpg"
        );
        assert_eq!(
            client.resolve("https://images.pexels.com/1.jpeg").unwrap().as_str(),
            "https://images.pexels.com/1.jpeg"
        );
    }

    #[tokio::test]
    async fn test_fetch_guide_success() {
        let (network, client) = client();
        network.respond(GUIDE_URL, 200, MINIMAL);
        let fetched = client.fetch_guide("harbor").await.unwrap();
        assert_eq!(fetched.guide.apartment_id, "harbor");
        assert_eq!(fetched.source, ResponseSource::Network);
    }

    #[tokio::test]
    async fn test_fetch_guide_error_status() {
        let (network, client) = client();
        network.respond(GUIDE_URL, 404, "nope");
        assert!(matches!(client.fetch_guide("harbor").await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_guide_missing_sections_is_parse_error() {
        let (network, client) = client();
        network.respond(GUIDE_URL, 200, r#"{"apartmentId": "harbor", "name": "x", "categories": []}"#);
        assert!(matches!(client.fetch_guide("harbor").await, Err(ApiError::Parse(_))));
    }

    #[tokio::test]
    async fn test_fetch_guide_rejects_invalid_documents() {
        let (network, client) = client();
        network.respond(
            GUIDE_URL,
            200,
            r#"{"apartmentId": "h", "name": "x",
                "emergency": {"contacts": [], "items": []},
                "categories": [{"id": "c", "name": "A", "items": []}, {"id": "c", "name": "B", "items": []}]}"#,
        );
        assert!(matches!(client.fetch_guide("harbor").await, Err(ApiError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_invalid_slug_issues_no_request() {
        let (network, client) = client();
        assert!(client.fetch_guide("bad slug").await.is_err());
        assert_eq!(network.calls("https://guide.example/guides/bad%20slug/guide.json"), 0);
    }

    #[tokio::test]
    async fn test_fetch_image_requires_success() {
        let (network, client) = client();
        network.respond("https://guide.example/img/a.jpg", 200, "jpg");
        network.respond("https://guide.example/img/b.jpg", 500, "");
        assert_eq!(client.fetch_image("/img/a.jpg").await.unwrap().body, b"jpg");
        assert!(client.fetch_image("/img/b.jpg").await.is_err());
    }
}
