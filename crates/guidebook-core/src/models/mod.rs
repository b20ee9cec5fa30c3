//! Data models for guide documents.
//!
//! This module contains the structures deserialized from
//! `/guides/{slug}/guide.json`:
//!
//! - `Guide`: the root document for one establishment
//! - `LocalizedText`: a plain string or a language-code → string map
//! - `Emergency`, `EmergencyContact`, `EmergencyItem`: emergency section
//! - `Category`, `CategoryItem`: the "find items" catalogue
//! - `Wifi`, `LanguageSettings`

pub mod guide;
pub mod text;

pub use guide::{
    Category, CategoryItem, ContactKind, Emergency, EmergencyContact, EmergencyItem, Guide,
    GuideError, LanguageSettings, Wifi,
};
pub use text::LocalizedText;
