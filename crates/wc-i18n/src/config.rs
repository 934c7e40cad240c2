//! Translator configuration

use serde::{Deserialize, Serialize};

/// Translator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Locale every key must exist in; the last resort of negotiation
    pub default_locale: String,
    /// Marker attribute prefix
    pub prefix: String,
    /// Attribute on `<html>` receiving the active locale
    pub locale_attribute: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            default_locale: "en-us".to_string(),
            prefix: "i18n".to_string(),
            locale_attribute: "lang".to_string(),
        }
    }
}

impl TranslatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into().to_lowercase();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_locale_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.locale_attribute = attribute.into();
        self
    }

    /// Name of the companion attribute filling `{{id}}`
    pub fn insert_attribute(&self, id: &str) -> String {
        format!("{}-insert-{}", self.prefix, id)
    }
}
