//! Supported languages and resolution of localizable text.

use serde::{Deserialize, Serialize};

use crate::models::LocalizedText;

/// A language the guide viewer knows how to present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum Lang {
    #[default]
    En,
    No,
}

/// Languages assumed when a guide does not declare `language.available`.
pub const DEFAULT_LANGS: [Lang; 2] = [Lang::En, Lang::No];

impl Lang {
    pub fn code(&self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::No => "no",
        }
    }

    /// Parse a language code. Unsupported codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Lang::En),
            "no" => Some(Lang::No),
            _ => None,
        }
    }

    /// Short uppercase label for the language switcher.
    pub fn label(&self) -> &'static str {
        match self {
            Lang::En => "EN",
            Lang::No => "NO",
        }
    }

    /// Pick between an English and a Norwegian UI string.
    pub fn pick(&self, en: &'static str, no: &'static str) -> &'static str {
        match self {
            Lang::En => en,
            Lang::No => no,
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Resolves localizable fields for one active language.
///
/// Resolution order for a mapped value: the active language, then the
/// guide's primary language, then any non-empty variant. Plain strings are
/// returned as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Localizer {
    pub lang: Lang,
    pub fallback: Lang,
}

impl Localizer {
    pub fn new(lang: Lang, fallback: Lang) -> Self {
        Self { lang, fallback }
    }

    pub fn text<'a>(&self, value: &'a LocalizedText) -> &'a str {
        value.resolve(self.lang, self.fallback)
    }

    /// Resolve an optional field, yielding `""` when it is absent.
    pub fn opt_text<'a>(&self, value: Option<&'a LocalizedText>) -> &'a str {
        value.map(|v| self.text(v)).unwrap_or("")
    }

    /// Resolve every entry of an ordered list of localizable strings.
    pub fn list<'a>(&self, values: &'a [LocalizedText]) -> Vec<&'a str> {
        values.iter().map(|v| self.text(v)).collect()
    }
}
