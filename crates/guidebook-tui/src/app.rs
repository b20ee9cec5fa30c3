//! Application state management for the guide viewer.
//!
//! This module contains the `App` struct that owns the loaded guide, the
//! view state and its history, the search index, image load tracking and
//! the coordination of background work (guide loads and image loads).
//!
//! The offline controller is installed when the app starts, over the cache
//! left by earlier runs, so even the first load of a session can be served
//! from a saved copy.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use guidebook_core::api::{ApiClient, MAX_SLUG_LENGTH};
use guidebook_core::i18n::Localizer;
use guidebook_core::image::{fetch_images, ImageTicket};
use guidebook_core::offline::{NetworkFetcher, ResponseSource};
use guidebook_core::view::reduce;
use guidebook_core::{
    Action, Config, GuideLoader, History, ImageTracker, Lang, LoadOutcome, LoadTicket, LoadedGuide,
    OfflineController, SearchEntry, SearchIndex, View, ViewState,
};

use crate::clipboard;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// Image loads report one message each; 32 leaves headroom for a guide load.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Menu tiles on the home view, in display order.
pub const MENU: [View; 5] = [View::Emergency, View::Find, View::Wifi, View::Rules, View::Checkout];

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    EnteringSlug,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Where the current guide is in its lifecycle.
#[derive(Debug, Clone)]
pub enum GuideStatus {
    /// No guide requested yet.
    Empty,
    Loading { slug: String },
    Loaded(LoadedGuide),
    NotFound { slug: String },
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Messages sent from background tasks back to the main loop.
enum BackgroundResult {
    Guide {
        ticket: LoadTicket,
        outcome: LoadOutcome,
    },
    Image {
        ticket: ImageTicket,
        source: Option<ResponseSource>,
        connectivity_failure: bool,
    },
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    loader: GuideLoader,
    controller: Option<OfflineController>,
    /// Where `last_slug` is persisted; `None` keeps the config in memory.
    config_path: Option<PathBuf>,

    pub state: AppState,
    pub guide: GuideStatus,
    pub view: ViewState,
    pub history: History,
    pub search: SearchIndex,
    pub images: ImageTracker,
    pub online: bool,
    pub selection: usize,
    pub slug_input: String,
    pub status_message: Option<String>,

    /// Fragment to apply once the requested guide arrives.
    pending_fragment: Option<String>,

    result_rx: mpsc::Receiver<BackgroundResult>,
    result_tx: mpsc::Sender<BackgroundResult>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let cache_dir = match config.cache_dir() {
            Ok(dir) => Some(dir),
            Err(e) => {
                debug!(error = %e, "No cache directory, running network-only");
                None
            }
        };
        let config_path = Config::config_path().ok();
        Self::with_paths(config, cache_dir, config_path)
    }

    /// An app with no controller and no config file.
    #[cfg(test)]
    pub(crate) fn detached(config: Config) -> Result<Self> {
        Self::with_paths(config, None, None)
    }

    fn with_paths(
        config: Config,
        cache_dir: Option<PathBuf>,
        config_path: Option<PathBuf>,
    ) -> Result<Self> {
        let origin = config.origin()?;
        let network = Arc::new(NetworkFetcher::new()?.offline(config.offline_mode));
        let mut loader = GuideLoader::new(ApiClient::new(origin, network.clone()));
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let online = !config.offline_mode;

        // Registration failure leaves the viewer on the plain network path
        let controller = cache_dir.and_then(|dir| {
            match OfflineController::register(&config, dir, network.clone()) {
                Ok(controller) => {
                    info!("Offline controller claimed the viewer");
                    loader.set_fetcher(Arc::new(controller.clone()));
                    Some(controller)
                }
                Err(e) => {
                    debug!(error = %e, "Offline controller registration failed");
                    None
                }
            }
        });

        Ok(Self {
            config,
            loader,
            controller,
            config_path,

            state: AppState::Normal,
            guide: GuideStatus::Empty,
            view: ViewState::default(),
            history: History::default(),
            search: SearchIndex::empty(Lang::default()),
            images: ImageTracker::new(),
            online,
            selection: 0,
            slug_input: String::new(),
            status_message: None,
            pending_fragment: None,

            result_rx: rx,
            result_tx: tx,
        })
    }

    // =========================================================================
    // Guide loading
    // =========================================================================

    /// Open `slug` or `slug#fragment`.
    pub fn open(&mut self, target: &str) {
        let (slug, fragment) = parse_target(target);
        self.load_guide(slug, fragment);
    }

    fn load_guide(&mut self, slug: String, fragment: Option<String>) {
        let ticket = self.loader.begin(&slug);
        debug!(slug = %slug, generation = ticket.generation(), "Loading guide");

        self.guide = GuideStatus::Loading { slug };
        self.images.reset();
        self.pending_fragment = fragment;
        self.status_message = None;

        let loader = self.loader.clone();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let outcome = loader.load(&ticket).await;
            Self::send_result(&tx, BackgroundResult::Guide { ticket, outcome }).await;
        });
    }

    /// Load the current slug again, keeping the current view.
    pub fn retry(&mut self) {
        if let Some(slug) = self.current_slug().map(str::to_string) {
            let fragment = self.view.fragment();
            self.load_guide(slug, Some(fragment));
        }
    }

    /// Open the guide picker (the landing equivalent).
    pub fn start_slug_prompt(&mut self) {
        self.slug_input.clear();
        self.state = AppState::EnteringSlug;
    }

    pub fn submit_slug(&mut self) {
        let target = self.slug_input.trim().to_string();
        if target.is_empty() {
            return;
        }
        self.state = AppState::Normal;
        self.open(&target);
    }

    pub fn current_slug(&self) -> Option<&str> {
        match &self.guide {
            GuideStatus::Empty => None,
            GuideStatus::Loading { slug } | GuideStatus::NotFound { slug } => Some(slug),
            GuideStatus::Loaded(loaded) => Some(&loaded.slug),
        }
    }

    pub fn loaded(&self) -> Option<&LoadedGuide> {
        match &self.guide {
            GuideStatus::Loaded(loaded) => Some(loaded),
            _ => None,
        }
    }

    pub fn localizer(&self) -> Option<Localizer> {
        self.loaded().map(|l| l.guide.localizer(self.view.lang))
    }

    /// Install a freshly loaded guide. Pure state change; no I/O.
    fn apply_loaded(&mut self, loaded: LoadedGuide) {
        let mut view = ViewState::new(loaded.lang);
        if let Some(fragment) = self.pending_fragment.take() {
            view = reduce(&view, Action::FragmentChanged(fragment));
        }
        self.history = History::new(view.fragment());
        self.search = SearchIndex::build(&loaded.guide, view.lang);
        self.view = view;
        self.selection = 0;
        self.mark_reachable(loaded.source == ResponseSource::Network);
        self.guide = GuideStatus::Loaded(loaded);
    }

    /// Side effects that follow a successful load.
    fn after_load(&mut self) {
        if let Some(slug) = self.current_slug().map(str::to_string) {
            if self.config.last_slug.as_deref() != Some(slug.as_str()) {
                self.config.last_slug = Some(slug);
                if let Some(path) = &self.config_path {
                    if let Err(e) = self.config.save_to(path) {
                        warn!(error = %e, "Failed to save config");
                    }
                }
            }
        }
        self.load_images();
    }

    // =========================================================================
    // Background work
    // =========================================================================

    async fn send_result(tx: &mpsc::Sender<BackgroundResult>, result: BackgroundResult) {
        if tx.send(result).await.is_err() {
            debug!("Result channel closed, dropping background result");
        }
    }

    pub fn controller(&self) -> Option<&OfflineController> {
        self.controller.as_ref()
    }

    fn load_images(&mut self) {
        let Some(loaded) = self.loaded() else {
            return;
        };
        let guide = Arc::clone(&loaded.guide);

        let urls = guide
            .emergency
            .items
            .iter()
            .filter_map(|item| item.image_url.as_deref())
            .chain(
                guide
                    .categories
                    .iter()
                    .flat_map(|c| c.items.iter())
                    .filter_map(|item| item.image_url.as_deref()),
            );
        let tickets: Vec<ImageTicket> = urls.filter_map(|url| self.images.request(url)).collect();
        if tickets.is_empty() {
            return;
        }
        debug!(count = tickets.len(), "Loading images");

        let api = self.loader.api().clone();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let results = fetch_images(api, tickets);
            futures::pin_mut!(results);
            while let Some((ticket, result)) = results.next().await {
                let (source, connectivity_failure) = match &result {
                    Ok(response) => (Some(response.source), false),
                    Err(e) => (None, e.is_connectivity()),
                };
                Self::send_result(
                    &tx,
                    BackgroundResult::Image {
                        ticket,
                        source,
                        connectivity_failure,
                    },
                )
                .await;
            }
        });
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            self.process_result(result);
        }
    }

    fn process_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Guide { ticket, outcome } => {
                if !self.loader.is_current(&ticket) {
                    debug!(slug = %ticket.slug, "Discarding result for superseded load");
                    return;
                }
                match outcome {
                    LoadOutcome::Loaded(loaded) => {
                        self.apply_loaded(loaded);
                        self.after_load();
                    }
                    LoadOutcome::NotFound { slug } => {
                        self.pending_fragment = None;
                        self.guide = GuideStatus::NotFound { slug };
                    }
                }
            }
            BackgroundResult::Image {
                ticket,
                source,
                connectivity_failure,
            } => {
                if !self.images.resolve(&ticket, source.is_some()) {
                    return;
                }
                if source == Some(ResponseSource::Network) {
                    self.mark_reachable(true);
                } else if connectivity_failure {
                    self.mark_reachable(false);
                }
            }
        }
    }

    fn mark_reachable(&mut self, reachable: bool) {
        self.online = reachable && !self.config.offline_mode;
    }

    /// Wait for the controller's detached work before exit.
    pub async fn shutdown(&self) {
        if let Some(controller) = &self.controller {
            controller.settle().await;
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Apply a view action, mirroring view changes into history.
    pub fn dispatch(&mut self, action: Action) {
        let next = reduce(&self.view, action);
        if next.view != self.view.view {
            self.history.push(next.fragment());
            self.selection = 0;
        }
        if next.query != self.view.query {
            self.selection = 0;
        }
        if next.lang != self.view.lang {
            if let Some(loaded) = self.loaded() {
                self.search = SearchIndex::build(&loaded.guide, next.lang);
            }
        }
        self.view = next;
    }

    pub fn navigate(&mut self, view: View) {
        self.dispatch(Action::Navigate(view));
    }

    pub fn back(&mut self) {
        if let Some(fragment) = self.history.back().map(str::to_string) {
            self.follow_fragment(fragment);
        }
    }

    pub fn forward(&mut self) {
        if let Some(fragment) = self.history.forward().map(str::to_string) {
            self.follow_fragment(fragment);
        }
    }

    /// Move to a fragment already recorded in history.
    fn follow_fragment(&mut self, fragment: String) {
        let next = reduce(&self.view, Action::FragmentChanged(fragment));
        if next.view != self.view.view {
            self.selection = 0;
        }
        self.view = next;
    }

    /// Languages offered by the switcher; empty when there is nothing to switch.
    pub fn switchable_langs(&self) -> Vec<Lang> {
        match self.loaded() {
            Some(loaded) if loaded.guide.is_multilingual() => loaded.guide.available_langs(),
            _ => Vec::new(),
        }
    }

    pub fn cycle_language(&mut self) {
        let langs = self.switchable_langs();
        if langs.is_empty() {
            return;
        }
        let current = langs.iter().position(|l| *l == self.view.lang).unwrap_or(0);
        let next = langs[(current + 1) % langs.len()];
        self.dispatch(Action::SetLanguage(next));
    }

    pub fn search_results(&self) -> Vec<&SearchEntry> {
        self.search.query(&self.view.query)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Number of selectable rows in the current view.
    pub fn selectable_len(&self) -> usize {
        let Some(loaded) = self.loaded() else {
            return 0;
        };
        match self.view.view {
            View::Home => MENU.len(),
            View::Emergency => loaded.guide.emergency.contacts.len(),
            View::Find => self.search_results().len(),
            View::Wifi => {
                if loaded.guide.wifi.is_some() {
                    2
                } else {
                    0
                }
            }
            View::Rules | View::Checkout => 0,
        }
    }

    pub fn select_next(&mut self) {
        let len = self.selectable_len();
        if len > 0 && self.selection + 1 < len {
            self.selection += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selection = self.selection.saturating_sub(1);
    }

    /// Act on the selected row.
    pub fn activate_selection(&mut self) {
        let lang = self.view.lang;
        match self.view.view {
            View::Home => {
                if let Some(view) = MENU.get(self.selection) {
                    self.navigate(*view);
                }
            }
            View::Emergency => {
                let href = self
                    .loaded()
                    .and_then(|l| l.guide.emergency.contacts.get(self.selection))
                    .map(|c| c.href());
                if let Some(href) = href {
                    self.status_message = Some(format!("{} {}", lang.pick("Open:", "Åpne:"), href));
                }
            }
            View::Wifi => {
                let value = self.loaded().and_then(|l| l.guide.wifi.as_ref()).map(|wifi| {
                    if self.selection == 0 {
                        wifi.name.clone()
                    } else {
                        wifi.password.clone()
                    }
                });
                if let Some(value) = value {
                    self.copy_to_clipboard(&value);
                }
            }
            View::Find | View::Rules | View::Checkout => {}
        }
    }

    /// Best effort: a failed copy is silently ignored.
    pub fn copy_to_clipboard(&mut self, text: &str) {
        match clipboard::copy(text) {
            Ok(()) => {
                self.status_message = Some(self.view.lang.pick("Copied", "Kopiert").to_string());
            }
            Err(e) => debug!(error = %e, "Clipboard copy failed"),
        }
    }
}

// ============================================================================
// Input helpers (exported for use in input.rs)
// ============================================================================

/// Split `slug#fragment` into its parts.
pub fn parse_target(target: &str) -> (String, Option<String>) {
    match target.split_once('#') {
        Some((slug, fragment)) => (slug.trim().to_string(), Some(format!("#{}", fragment.trim()))),
        None => (target.trim().to_string(), None),
    }
}

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a slug prompt character should be accepted
pub fn can_add_slug_char(current_len: usize, c: char) -> bool {
    current_len < MAX_SLUG_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use guidebook_core::cache::CacheManager;
    use guidebook_core::offline::{ResourceClass, Response};
    use guidebook_core::Guide;
    use tempfile::TempDir;

    const GUIDE_JSON: &str = r#"{
        "apartmentId": "harbor",
        "name": {"en": "Harbor Loft", "no": "Havneloftet"},
        "language": {"primary": "no", "available": ["en", "no"]},
        "emergency": {
            "contacts": [
                {"label": "Host", "type": "whatsapp", "value": "+47 400 00 000"},
                {"label": "Emergency", "type": "phone", "value": "112"}
            ],
            "items": []
        },
        "categories": [
            {"id": "c1", "name": {"en": "Kitchen", "no": "Kjøkken"}, "items": [
                {"id": "i1", "title": {"en": "Kettle", "no": "Vannkoker"}, "locationText": "Counter"},
                {"id": "i2", "title": "Oven mitts", "locationText": "Drawer"}
            ]}
        ],
        "wifi": {"name": "HarborNet", "password": "secret"}
    }"#;

    fn guide() -> Guide {
        serde_json::from_str(GUIDE_JSON).unwrap()
    }

    fn loaded(lang: Lang) -> LoadedGuide {
        LoadedGuide {
            slug: "harbor".to_string(),
            guide: Arc::new(guide()),
            lang,
            source: ResponseSource::Network,
        }
    }

    fn app_with_guide(fragment: Option<&str>) -> App {
        let mut app = App::detached(Config::default()).unwrap();
        app.pending_fragment = fragment.map(str::to_string);
        app.apply_loaded(loaded(Lang::No));
        app
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("harbor"), ("harbor".to_string(), None));
        assert_eq!(
            parse_target(" harbor#wifi"),
            ("harbor".to_string(), Some("#wifi".to_string()))
        );
        assert_eq!(parse_target("harbor#"), ("harbor".to_string(), Some("#".to_string())));
    }

    #[test]
    fn test_can_add_slug_char() {
        assert!(can_add_slug_char(0, 'a'));
        assert!(!can_add_slug_char(0, '\n'));
        assert!(!can_add_slug_char(MAX_SLUG_LENGTH, 'a'));
    }

    #[test]
    fn test_loaded_guide_uses_selected_language_and_fragment() {
        let app = app_with_guide(Some("#find"));
        assert_eq!(app.view.lang, Lang::No);
        assert_eq!(app.view.view, View::Find);
        assert_eq!(app.history.current(), "#find");
        assert_eq!(app.search.lang(), Lang::No);
    }

    #[test]
    fn test_unknown_fragment_stays_home() {
        let app = app_with_guide(Some("#pool"));
        assert_eq!(app.view.view, View::Home);
    }

    #[test]
    fn test_navigation_records_history() {
        let mut app = app_with_guide(None);
        app.navigate(View::Emergency);
        app.navigate(View::Wifi);
        app.navigate(View::Wifi);

        app.back();
        assert_eq!(app.view.view, View::Emergency);
        app.back();
        assert_eq!(app.view.view, View::Home);
        app.back();
        assert_eq!(app.view.view, View::Home);

        app.forward();
        assert_eq!(app.view.view, View::Emergency);
        app.navigate(View::Rules);
        app.forward();
        assert_eq!(app.view.view, View::Rules);
    }

    #[test]
    fn test_language_switch_rebuilds_search() {
        let mut app = app_with_guide(None);
        app.dispatch(Action::SetQuery("kettle".to_string()));
        assert!(app.search_results().is_empty());

        app.cycle_language();
        assert_eq!(app.view.lang, Lang::En);
        assert_eq!(app.search_results().len(), 1);

        app.cycle_language();
        assert_eq!(app.view.lang, Lang::No);
    }

    #[test]
    fn test_single_language_guide_has_no_switcher() {
        let mut app = App::detached(Config::default()).unwrap();
        let mut g = guide();
        g.language = Some(guidebook_core::models::LanguageSettings {
            primary: Some("en".to_string()),
            available: Some(vec!["en".to_string()]),
        });
        app.apply_loaded(LoadedGuide {
            slug: "harbor".to_string(),
            guide: Arc::new(g),
            lang: Lang::En,
            source: ResponseSource::Cache,
        });
        assert!(app.switchable_langs().is_empty());
        app.cycle_language();
        assert_eq!(app.view.lang, Lang::En);
        assert!(!app.online);
    }

    #[test]
    fn test_selection_bounds_and_menu_activation() {
        let mut app = app_with_guide(None);
        for _ in 0..10 {
            app.select_next();
        }
        assert_eq!(app.selection, MENU.len() - 1);
        app.select_prev();
        app.activate_selection();
        assert_eq!(app.view.view, View::Rules);
        assert_eq!(app.selection, 0);
    }

    #[test]
    fn test_emergency_contact_activation_shows_href() {
        let mut app = app_with_guide(Some("#emergency"));
        app.activate_selection();
        assert_eq!(app.status_message.as_deref(), Some("Åpne: https://wa.me/4740000000"));
    }

    #[test]
    fn test_stale_guide_results_are_ignored() {
        let mut app = App::detached(Config::default()).unwrap();
        let stale = app.loader.begin("old");
        let _current = app.loader.begin("harbor");
        app.guide = GuideStatus::Loading {
            slug: "harbor".to_string(),
        };
        app.process_result(BackgroundResult::Guide {
            ticket: stale,
            outcome: LoadOutcome::NotFound {
                slug: "old".to_string(),
            },
        });
        assert!(matches!(app.guide, GuideStatus::Loading { .. }));
    }

    #[test]
    fn test_offline_mode_is_never_online() {
        let config = Config {
            offline_mode: true,
            ..Config::default()
        };
        let mut app = App::detached(config).unwrap();
        assert!(!app.online);
        app.mark_reachable(true);
        assert!(!app.online);
    }

    async fn wait_for_guide(app: &mut App) {
        while matches!(app.guide, GuideStatus::Loading { .. }) {
            let result = app.result_rx.recv().await.unwrap();
            app.process_result(result);
        }
    }

    fn seed_guide(cache_dir: &std::path::Path) {
        let cache = CacheManager::new(cache_dir.to_path_buf()).unwrap();
        let response = Response {
            url: "http://localhost:3000/guides/harbor/guide.json".to_string(),
            status: 200,
            content_type: Some("application/json".to_string()),
            body: GUIDE_JSON.as_bytes().to_vec(),
            source: ResponseSource::Network,
        };
        cache.put(ResourceClass::GuideDocument.cache_name(), &response).unwrap();
    }

    #[tokio::test]
    async fn test_offline_cold_start_serves_saved_guide() {
        let dir = TempDir::new().unwrap();
        let cache_dir = dir.path().join("cache");
        let config_path = dir.path().join("config.json");
        seed_guide(&cache_dir);

        let config = Config {
            offline_mode: true,
            ..Config::default()
        };
        let mut app = App::with_paths(config, Some(cache_dir), Some(config_path.clone())).unwrap();
        assert!(app.controller().is_some());

        app.open("harbor#wifi");
        wait_for_guide(&mut app).await;

        let loaded = app.loaded().expect("saved guide should load");
        assert!(loaded.from_cache());
        assert_eq!(app.view.view, View::Wifi);
        assert!(!app.online);
        assert_eq!(Config::load_from(&config_path).unwrap().last_slug.as_deref(), Some("harbor"));
    }

    #[tokio::test]
    async fn test_retry_after_not_found_uses_saved_guide() {
        let dir = TempDir::new().unwrap();
        let cache_dir = dir.path().join("cache");
        let config = Config {
            offline_mode: true,
            ..Config::default()
        };
        let mut app = App::with_paths(config, Some(cache_dir.clone()), None).unwrap();

        app.open("harbor");
        wait_for_guide(&mut app).await;
        assert!(matches!(&app.guide, GuideStatus::NotFound { slug } if slug == "harbor"));

        seed_guide(&cache_dir);
        app.retry();
        wait_for_guide(&mut app).await;
        assert!(app.loaded().is_some_and(|l| l.from_cache()));
    }
}
