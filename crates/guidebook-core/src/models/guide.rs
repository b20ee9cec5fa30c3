use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::LocalizedText;
use crate::i18n::{Lang, Localizer, DEFAULT_LANGS};

/// Structural problems that make a parsed guide unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuideError {
    #[error("Duplicate id '{id}' in {list}")]
    DuplicateId { list: String, id: String },

    #[error("language.available is empty")]
    NoLanguages,

    #[error("language.available has no supported codes: {0:?}")]
    UnsupportedLanguages(Vec<String>),

    #[error("{0} has no text in any language")]
    UnresolvableText(String),
}

/// The root document for one establishment.
///
/// Immutable once loaded; a re-fetch replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Guide {
    #[serde(rename = "apartmentId")]
    pub apartment_id: String,
    pub name: LocalizedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<LanguageSettings>,
    pub emergency: Emergency,
    pub categories: Vec<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wifi: Option<Wifi>,
    #[serde(default)]
    pub rules: Vec<LocalizedText>,
    #[serde(default)]
    pub checkout: Vec<LocalizedText>,
}

/// Raw language declaration. Codes are kept as strings so an unknown code
/// does not fail the whole document; they are filtered on use.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct LanguageSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Emergency {
    pub contacts: Vec<EmergencyContact>,
    #[serde(default)]
    pub safety_notes: Vec<LocalizedText>,
    #[serde(default)]
    pub do_not: Vec<LocalizedText>,
    pub items: Vec<EmergencyItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum ContactKind {
    Phone,
    Whatsapp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct EmergencyContact {
    pub label: LocalizedText,
    #[serde(rename = "type")]
    pub kind: ContactKind,
    /// Raw phone string as written by the host.
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct EmergencyItem {
    pub id: String,
    pub title: LocalizedText,
    pub location_text: LocalizedText,
    pub steps: Vec<LocalizedText>,
    #[serde(default)]
    pub stop_and_call: Vec<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Category {
    pub id: String,
    pub name: LocalizedText,
    pub items: Vec<CategoryItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct CategoryItem {
    pub id: String,
    pub title: LocalizedText,
    pub location_text: LocalizedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Wifi {
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub troubleshooting: Vec<LocalizedText>,
}

impl Guide {
    /// Languages this guide can be shown in, in declared order.
    ///
    /// Unsupported codes are dropped; an absent declaration means the
    /// default pair.
    pub fn available_langs(&self) -> Vec<Lang> {
        match self.language.as_ref().and_then(|l| l.available.as_ref()) {
            Some(codes) => {
                let mut langs = Vec::new();
                for lang in codes.iter().filter_map(|c| Lang::from_code(c)) {
                    if !langs.contains(&lang) {
                        langs.push(lang);
                    }
                }
                langs
            }
            None => DEFAULT_LANGS.to_vec(),
        }
    }

    /// The declared primary language, if it is a supported code.
    pub fn primary_lang(&self) -> Option<Lang> {
        self.language
            .as_ref()
            .and_then(|l| l.primary.as_deref())
            .and_then(Lang::from_code)
    }

    /// Language selected once per load, before first render.
    ///
    /// The primary language wins when it is available; otherwise the first
    /// available language, and English if nothing usable was declared.
    pub fn initial_lang(&self) -> Lang {
        let available = self.available_langs();
        match self.primary_lang() {
            Some(primary) if available.contains(&primary) => primary,
            _ => available.first().copied().unwrap_or_default(),
        }
    }

    /// A resolver for `lang` that falls back to this guide's primary language.
    pub fn localizer(&self, lang: Lang) -> Localizer {
        Localizer::new(lang, self.primary_lang().unwrap_or(lang))
    }

    /// Check the invariants the viewer relies on.
    pub fn validate(&self) -> Result<(), GuideError> {
        if let Some(codes) = self.language.as_ref().and_then(|l| l.available.as_ref()) {
            if codes.is_empty() {
                return Err(GuideError::NoLanguages);
            }
            if self.available_langs().is_empty() {
                return Err(GuideError::UnsupportedLanguages(codes.clone()));
            }
        }

        check_unique("emergency.items", self.emergency.items.iter().map(|i| i.id.as_str()))?;
        check_unique("categories", self.categories.iter().map(|c| c.id.as_str()))?;
        for category in &self.categories {
            check_unique(
                &format!("categories[{}].items", category.id),
                category.items.iter().map(|i| i.id.as_str()),
            )?;
        }

        check_resolvable("name", &self.name)?;
        for item in &self.emergency.items {
            check_resolvable(&format!("emergency.items[{}].title", item.id), &item.title)?;
            check_resolvable(&format!("emergency.items[{}].locationText", item.id), &item.location_text)?;
        }
        for category in &self.categories {
            check_resolvable(&format!("categories[{}].name", category.id), &category.name)?;
            for item in &category.items {
                check_resolvable(&format!("categories[{}].items[{}].title", category.id, item.id), &item.title)?;
                check_resolvable(
                    &format!("categories[{}].items[{}].locationText", category.id, item.id),
                    &item.location_text,
                )?;
            }
        }

        Ok(())
    }

    /// Whether the language switcher should be offered.
    pub fn is_multilingual(&self) -> bool {
        self.available_langs().len() > 1
    }
}

fn check_unique<'a>(list: &str, ids: impl Iterator<Item = &'a str>) -> Result<(), GuideError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(GuideError::DuplicateId {
                list: list.to_string(),
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

fn check_resolvable(field: &str, text: &LocalizedText) -> Result<(), GuideError> {
    if text.is_resolvable() {
        Ok(())
    } else {
        Err(GuideError::UnresolvableText(field.to_string()))
    }
}
