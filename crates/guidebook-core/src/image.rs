//! Per-image load tracking.
//!
//! Each image referenced by the current guide moves through
//! `Loading -> Loaded | Failed` independently, so a slow or failed image
//! never holds up the rest of the view. A guide change starts a new
//! generation; results for an older generation are dropped on arrival.

use std::collections::HashMap;

use futures::stream::{self, Stream, StreamExt};

use crate::api::ApiClient;
use crate::i18n::Lang;
use crate::offline::{FetchError, Response};

/// Upper bound on image fetches in flight at once.
pub const MAX_CONCURRENT_LOADS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    Loading,
    Loaded,
    Failed,
}

/// What to show instead of an image that is not (yet) available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePlaceholder {
    Loading,
    /// Expected while offline.
    Offline,
    /// Unexpected; the host may be blocked.
    Failed,
}

impl ImagePlaceholder {
    pub fn message(&self, lang: Lang) -> &'static str {
        match self {
            ImagePlaceholder::Loading => lang.pick("Loading photo…", "Laster bilde…"),
            ImagePlaceholder::Offline => lang.pick("Photo unavailable offline", "Bilde utilgjengelig uten nett"),
            ImagePlaceholder::Failed => lang.pick(
                "Photo couldn't load – might be blocked",
                "Bildet kunne ikke lastes – kan være blokkert",
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTicket {
    pub url: String,
    generation: u64,
}

#[derive(Debug, Default)]
pub struct ImageTracker {
    generation: u64,
    statuses: HashMap<String, ImageStatus>,
}

impl ImageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything; results for earlier tickets will be ignored.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.statuses.clear();
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start tracking `url`. Returns a ticket unless it is already known.
    pub fn request(&mut self, url: &str) -> Option<ImageTicket> {
        if self.statuses.contains_key(url) {
            return None;
        }
        self.statuses.insert(url.to_string(), ImageStatus::Loading);
        Some(ImageTicket {
            url: url.to_string(),
            generation: self.generation,
        })
    }

    /// Record a finished load. Returns false if the ticket is stale.
    pub fn resolve(&mut self, ticket: &ImageTicket, loaded: bool) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        let status = if loaded {
            ImageStatus::Loaded
        } else {
            ImageStatus::Failed
        };
        self.statuses.insert(ticket.url.clone(), status);
        true
    }

    pub fn status(&self, url: &str) -> Option<ImageStatus> {
        self.statuses.get(url).copied()
    }

    /// Number of images still loading.
    pub fn pending(&self) -> usize {
        self.statuses.values().filter(|s| **s == ImageStatus::Loading).count()
    }

    /// Placeholder for `url`, or `None` once the image has loaded.
    pub fn placeholder(&self, url: &str, online: bool) -> Option<ImagePlaceholder> {
        match self.status(url) {
            Some(ImageStatus::Loaded) => None,
            _ if !online => Some(ImagePlaceholder::Offline),
            Some(ImageStatus::Failed) => Some(ImagePlaceholder::Failed),
            Some(ImageStatus::Loading) | None => Some(ImagePlaceholder::Loading),
        }
    }
}

/// Fetch every ticket's image, at most `MAX_CONCURRENT_LOADS` at a time.
/// Results arrive in completion order.
pub fn fetch_images(
    api: ApiClient,
    tickets: Vec<ImageTicket>,
) -> impl Stream<Item = (ImageTicket, Result<Response, FetchError>)> {
    stream::iter(tickets)
        .map(move |ticket| {
            let api = api.clone();
            async move {
                let result = api.fetch_image(&ticket.url).await;
                (ticket, result)
            }
        })
        .buffer_unordered(MAX_CONCURRENT_LOADS)
}
