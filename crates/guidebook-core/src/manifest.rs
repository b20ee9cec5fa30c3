//! Installable application manifest.
//!
//! A static descriptor served as `manifest.webmanifest`; nothing here is
//! computed from guide data.

use serde::Serialize;

pub const APP_NAME: &str = "Apartment Guide";
pub const APP_SHORT_NAME: &str = "Guide";
pub const BRAND_COLOR: &str = "#070A10";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebManifest {
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub start_url: String,
    pub display: String,
    pub background_color: String,
    pub theme_color: String,
    pub icons: Vec<ManifestIcon>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl ManifestIcon {
    fn png(size: u32, maskable: bool) -> Self {
        let suffix = if maskable { "-maskable" } else { "" };
        Self {
            src: format!("/icons/icon-{}{}.png", size, suffix),
            sizes: format!("{}x{}", size, size),
            mime_type: "image/png".to_string(),
            purpose: maskable.then(|| "maskable".to_string()),
        }
    }
}

impl WebManifest {
    /// The manifest shipped with the site.
    pub fn standard() -> Self {
        Self {
            name: APP_NAME.to_string(),
            short_name: APP_SHORT_NAME.to_string(),
            description: "Offline-ready apartment guide".to_string(),
            start_url: "/".to_string(),
            display: "standalone".to_string(),
            background_color: BRAND_COLOR.to_string(),
            theme_color: BRAND_COLOR.to_string(),
            icons: vec![
                ManifestIcon::png(192, false),
                ManifestIcon::png(192, true),
                ManifestIcon::png(512, false),
                ManifestIcon::png(512, true),
            ],
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_icons() {
        let manifest = WebManifest::standard();
        let sizes: Vec<(&str, Option<&str>)> = manifest
            .icons
            .iter()
            .map(|i| (i.sizes.as_str(), i.purpose.as_deref()))
            .collect();
        assert_eq!(
            sizes,
            vec![
                ("192x192", None),
                ("192x192", Some("maskable")),
                ("512x512", None),
                ("512x512", Some("maskable")),
            ]
        );
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(WebManifest::standard()).unwrap();
        assert_eq!(value["short_name"], "Guide");
        assert_eq!(value["start_url"], "/");
        assert_eq!(value["display"], "standalone");
        assert_eq!(value["icons"][0]["type"], "image/png");
        assert!(value["icons"][0].get("purpose").is_none());
    }
}
