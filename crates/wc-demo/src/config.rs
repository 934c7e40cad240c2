//! Demo configuration

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use wc_i18n::TranslatorConfig;

/// What the demo page shows and how it is translated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Preferred languages, most preferred first
    pub languages: Vec<String>,
    pub translator: TranslatorConfig,
    /// Data assigned to the image component, keys as an API returns them
    pub image: Map<String, Value>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        let image = json!({
            "title": "The Moon",
            "copyright": "Example Observatory",
            "created_at": "2021-01-01",
            "explanation": "A full moon over the hills.",
            "tags": ["moon", "night"],
            "url": "moon.jpg",
            "base": "https://images.example/",
        });
        Self {
            languages: vec!["en-US".to_string()],
            translator: TranslatorConfig::default(),
            image: image.as_object().cloned().unwrap_or_default(),
        }
    }
}

impl DemoConfig {
    /// Read a JSON config file; missing fields keep their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: DemoConfig = serde_json::from_str(r#"{ "languages": ["ja-JP"] }"#).unwrap();
        assert_eq!(config.languages, vec!["ja-JP"]);
        assert_eq!(config.translator, TranslatorConfig::default());
        assert_eq!(config.image["title"], "The Moon");
    }

    #[test]
    fn test_translator_section() {
        let config: DemoConfig =
            serde_json::from_str(r#"{ "translator": { "prefix": "t" }, "image": {} }"#).unwrap();
        assert_eq!(config.translator.prefix, "t");
        assert_eq!(config.translator.default_locale, "en-us");
        assert!(config.image.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = DemoConfig::load(Path::new("/nonexistent/demo.json")).unwrap_err();
        assert!(err.to_string().contains("reading config"));
    }
}
