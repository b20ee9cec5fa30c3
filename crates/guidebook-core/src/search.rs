//! Free-text lookup across category items.
//!
//! The index is a flat, ordered list of every category item annotated with
//! its category's localized name. It is rebuilt whenever the guide or the
//! active language changes and is never mutated by queries.

use serde::Serialize;

use crate::i18n::Lang;
use crate::models::Guide;
use crate::utils::fold_case;

/// One category item, resolved for the index's language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntry {
    pub id: String,
    pub title: String,
    pub location_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub category_id: String,
    pub category_name: String,
}

/// Case-folded copies of the three searchable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Haystack {
    title: String,
    location: String,
    category: String,
}

impl Haystack {
    fn of(entry: &SearchEntry) -> Self {
        Self {
            title: fold_case(&entry.title),
            location: fold_case(&entry.location_text),
            category: fold_case(&entry.category_name),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.title.contains(needle) || self.location.contains(needle) || self.category.contains(needle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchIndex {
    lang: Lang,
    entries: Vec<SearchEntry>,
    haystacks: Vec<Haystack>,
}

impl SearchIndex {
    /// Flatten every category's items in document order.
    pub fn build(guide: &Guide, lang: Lang) -> Self {
        let l = guide.localizer(lang);
        let entries: Vec<SearchEntry> = guide
            .categories
            .iter()
            .flat_map(|category| {
                let category_name = l.text(&category.name).to_string();
                category.items.iter().map(move |item| SearchEntry {
                    id: item.id.clone(),
                    title: l.text(&item.title).to_string(),
                    location_text: l.text(&item.location_text).to_string(),
                    image_url: item.image_url.clone(),
                    category_id: category.id.clone(),
                    category_name: category_name.clone(),
                })
            })
            .collect();
        let haystacks = entries.iter().map(Haystack::of).collect();

        Self {
            lang,
            entries,
            haystacks,
        }
    }

    pub fn empty(lang: Lang) -> Self {
        Self {
            lang,
            entries: Vec::new(),
            haystacks: Vec::new(),
        }
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    /// Entries whose title, location or category name contains `query`.
    ///
    /// Case-insensitive substring match on the trimmed query; an empty query
    /// returns everything. Results keep index order.
    pub fn query(&self, query: &str) -> Vec<&SearchEntry> {
        let needle = fold_case(query.trim());
        if needle.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .zip(&self.haystacks)
            .filter(|(_, hay)| hay.matches(&needle))
            .map(|(entry, _)| entry)
            .collect()
    }
}
