use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::i18n::Lang;

/// A value that is either a plain string or a mapping from language code to
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum LocalizedText {
    Plain(String),
    Localized(BTreeMap<String, String>),
}

impl LocalizedText {
    /// Resolve to a display string.
    ///
    /// Empty variants are skipped. Returns `""` only when no variant has text.
    pub fn resolve(&self, lang: Lang, fallback: Lang) -> &str {
        match self {
            LocalizedText::Plain(s) => s,
            LocalizedText::Localized(map) => {
                let lookup = |l: Lang| map.get(l.code()).filter(|s| !s.is_empty());
                lookup(lang)
                    .or_else(|| lookup(fallback))
                    .or_else(|| map.values().find(|s| !s.is_empty()))
                    .map(String::as_str)
                    .unwrap_or("")
            }
        }
    }

    /// True when at least one variant carries text.
    pub fn is_resolvable(&self) -> bool {
        match self {
            LocalizedText::Plain(_) => true,
            LocalizedText::Localized(map) => map.values().any(|s| !s.is_empty()),
        }
    }
}

impl From<&str> for LocalizedText {
    fn from(value: &str) -> Self {
        LocalizedText::Plain(value.to_string())
    }
}

impl Default for LocalizedText {
    fn default() -> Self {
        LocalizedText::Plain(String::new())
    }
}
