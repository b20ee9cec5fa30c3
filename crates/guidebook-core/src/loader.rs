//! Guide loading with stale-result protection.
//!
//! Every load is started with `GuideLoader::begin`, which hands out a ticket
//! stamped with a generation number. Starting another load bumps the
//! generation, so a result that arrives for an older ticket can be
//! recognised and dropped before it overwrites the newer view.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::i18n::Lang;
use crate::models::Guide;
use crate::offline::{Fetch, ResponseSource};

/// Identifies one requested load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub slug: String,
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
pub struct LoadedGuide {
    pub slug: String,
    pub guide: Arc<Guide>,
    /// Chosen once per load, before first render.
    pub lang: Lang,
    pub source: ResponseSource,
}

impl LoadedGuide {
    pub fn from_cache(&self) -> bool {
        self.source == ResponseSource::Cache
    }
}

/// What the view layer sees. Every failure reads as `NotFound`.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Loaded(LoadedGuide),
    NotFound { slug: String },
}

/// Loads guides through an `ApiClient`.
/// Clones share the generation counter.
#[derive(Clone)]
pub struct GuideLoader {
    api: ApiClient,
    generation: Arc<AtomicU64>,
}

impl GuideLoader {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Route subsequent loads through `fetcher`. In-flight loads keep the
    /// fetcher they started with.
    pub fn set_fetcher(&mut self, fetcher: Arc<dyn Fetch>) {
        self.api = self.api.with_fetcher(fetcher);
    }

    /// Start a new load, superseding any earlier ticket.
    pub fn begin(&self, slug: &str) -> LoadTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        LoadTicket {
            slug: slug.to_string(),
            generation,
        }
    }

    /// Whether `ticket` is still the most recent load.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    pub async fn load(&self, ticket: &LoadTicket) -> LoadOutcome {
        let slug = ticket.slug.clone();
        match self.api.fetch_guide(&slug).await {
            Ok(fetched) => {
                let lang = fetched.guide.initial_lang();
                info!(slug = %slug, lang = %lang, source = ?fetched.source, "Guide loaded");
                LoadOutcome::Loaded(LoadedGuide {
                    slug,
                    guide: Arc::new(fetched.guide),
                    lang,
                    source: fetched.source,
                })
            }
            Err(e) => {
                if e.is_connectivity() {
                    debug!(slug = %slug, error = %e, "Guide unavailable");
                } else {
                    warn!(slug = %slug, error = %e, "Guide rejected");
                }
                LoadOutcome::NotFound { slug }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::testing::ScriptedFetch;
    use reqwest::Url;
    use std::time::Duration;

    fn guide_json(id: &str, language: &str) -> String {
        format!(
            r#"{{"apartmentId": "{}", "name": "Guide {}", {}
                "emergency": {{"contacts": [], "items": []}},
                "categories": [{{"id": "c1", "name": "Kitchen", "items": [
                    {{"id": "i1", "title": "Kettle", "locationText": "Counter"}}]}}]}}"#,
            id, id, language
        )
    }

    fn url(slug: &str) -> String {
        format!("https://guide.example/guides/{}/guide.json", slug)
    }

    fn loader() -> (Arc<ScriptedFetch>, GuideLoader) {
        let network = Arc::new(ScriptedFetch::new());
        let api = ApiClient::new(Url::parse("https://guide.example").unwrap(), network.clone());
        (network, GuideLoader::new(api))
    }

    #[tokio::test]
    async fn test_load_selects_language_once() {
        let (network, loader) = loader();
        network.respond(
            &url("harbor"),
            200,
            &guide_json("harbor", r#""language": {"primary": "no", "available": ["en", "no"]},"#),
        );

        let ticket = loader.begin("harbor");
        match loader.load(&ticket).await {
            LoadOutcome::Loaded(loaded) => {
                assert_eq!(loaded.lang, Lang::No);
                assert_eq!(loaded.guide.apartment_id, "harbor");
                assert!(!loaded.from_cache());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_primary_outside_available_uses_first_available() {
        let (network, loader) = loader();
        network.respond(
            &url("harbor"),
            200,
            &guide_json("harbor", r#""language": {"primary": "no", "available": ["en"]},"#),
        );
        let ticket = loader.begin("harbor");
        match loader.load(&ticket).await {
            LoadOutcome::Loaded(loaded) => assert_eq!(loaded.lang, Lang::En),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_every_failure_is_not_found() {
        let (network, loader) = loader();
        network.respond(&url("missing"), 404, "");
        network.respond(&url("broken"), 500, "boom");
        network.respond(&url("garbage"), 200, "<html>");
        network.respond(&url("partial"), 200, r#"{"apartmentId": "p", "name": "P", "categories": []}"#);
        network.respond(
            &url("nolangs"),
            200,
            &guide_json("nolangs", r#""language": {"available": []},"#),
        );
        network.respond(
            &url("blank"),
            200,
            &guide_json("blank", "").replace(r#""title": "Kettle""#, r#""title": {"en": "", "no": ""}"#),
        );
        network.fail(&url("offline"));

        for slug in ["missing", "broken", "garbage", "partial", "nolangs", "blank", "offline", "bad slug"] {
            let ticket = loader.begin(slug);
            let outcome = loader.load(&ticket).await;
            assert!(
                matches!(&outcome, LoadOutcome::NotFound { slug: s } if s == slug),
                "{} should be not found",
                slug
            );
        }
    }

    #[tokio::test]
    async fn test_begin_supersedes_earlier_tickets() {
        let (_, loader) = loader();
        let first = loader.begin("a");
        assert!(loader.is_current(&first));
        let second = loader.clone().begin("b");
        assert!(!loader.is_current(&first));
        assert!(loader.is_current(&second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_result_is_stale_once_superseded() {
        let (network, loader) = loader();
        network.respond_after(&url("slow"), Duration::from_secs(2), 200, &guide_json("slow", ""));
        network.respond(&url("fast"), 200, &guide_json("fast", ""));

        let slow_ticket = loader.begin("slow");
        let slow_loader = loader.clone();
        let slow = tokio::spawn(async move {
            let outcome = slow_loader.load(&slow_ticket).await;
            (slow_ticket, outcome)
        });

        tokio::task::yield_now().await;
        let fast_ticket = loader.begin("fast");
        let fast = loader.load(&fast_ticket).await;
        assert!(loader.is_current(&fast_ticket));
        assert!(matches!(fast, LoadOutcome::Loaded(ref g) if g.slug == "fast"));

        let (slow_ticket, slow_outcome) = slow.await.unwrap();
        assert!(matches!(slow_outcome, LoadOutcome::Loaded(_)));
        assert!(!loader.is_current(&slow_ticket));
    }

    #[tokio::test]
    async fn test_reload_yields_identical_guide() {
        let (network, loader) = loader();
        network.respond(&url("harbor"), 200, &guide_json("harbor", ""));

        let first = loader.load(&loader.begin("harbor")).await;
        let second = loader.load(&loader.begin("harbor")).await;
        match (first, second) {
            (LoadOutcome::Loaded(a), LoadOutcome::Loaded(b)) => {
                assert_eq!(a.guide, b.guide);
                assert_eq!(
                    crate::SearchIndex::build(&a.guide, a.lang),
                    crate::SearchIndex::build(&b.guide, b.lang)
                );
            }
            _ => panic!("both loads should succeed"),
        }
    }
}
