//! Locale phrase tables and where they come from

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;

use crate::TranslatorError;

/// Locale -> key -> phrase. Locale identifiers are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhraseTable {
    locales: BTreeMap<String, BTreeMap<String, String>>,
}

impl PhraseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `{ "<locale>": { "<key>": "<phrase>" } }`
    pub fn from_json(text: &str) -> Result<Self, TranslatorError> {
        let raw: BTreeMap<String, BTreeMap<String, String>> = serde_json::from_str(text)?;
        Ok(raw.into())
    }

    pub fn insert(&mut self, locale: &str, key: &str, phrase: &str) {
        self.locales
            .entry(locale.to_lowercase())
            .or_default()
            .insert(key.to_string(), phrase.to_string());
    }

    /// Locales in table order
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }

    pub fn contains_locale(&self, locale: &str) -> bool {
        self.locales.contains_key(locale)
    }

    /// Phrase stored for `key` in `locale`. Empty phrases count as missing.
    pub fn get(&self, locale: &str, key: &str) -> Option<&str> {
        self.locales
            .get(locale)?
            .get(key)
            .map(String::as_str)
            .filter(|phrase| !phrase.is_empty())
    }

    /// `key` in `locale`, then in `default`
    pub fn resolve(&self, locale: &str, default: &str, key: &str) -> Option<&str> {
        self.get(locale, key).or_else(|| self.get(default, key))
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    pub fn clear(&mut self) {
        self.locales.clear();
    }

    /// Check the table against its default locale. Keys the default locale
    /// lacks are only logged.
    pub fn validate(&self, default: &str) -> Result<(), TranslatorError> {
        let Some(defaults) = self.locales.get(default) else {
            return Err(TranslatorError::MissingDefaultLocale(default.to_string()));
        };
        for (locale, phrases) in &self.locales {
            for key in phrases.keys().filter(|key| !defaults.contains_key(*key)) {
                tracing::warn!(%locale, %key, default, "phrase missing from default locale");
            }
        }
        Ok(())
    }
}

impl From<BTreeMap<String, BTreeMap<String, String>>> for PhraseTable {
    fn from(raw: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        let mut table = PhraseTable::new();
        for (locale, phrases) in raw {
            table
                .locales
                .entry(locale.to_lowercase())
                .or_default()
                .extend(phrases);
        }
        table
    }
}

/// Something that can produce a phrase table
pub trait PhraseSource {
    fn load(&self) -> impl Future<Output = Result<PhraseTable, TranslatorError>>;
}

/// The built-in demo phrases
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPhrases;

impl StaticPhrases {
    pub fn table() -> PhraseTable {
        const PHRASES: &[(&str, &[(&str, &str)])] = &[
            (
                "en-us",
                &[
                    ("dog.pictures", "Dog pictures"),
                    ("cat.pictures", "Cat pictures"),
                    ("source.api", "Source API: "),
                ],
            ),
            (
                "es-es",
                &[
                    ("dog.pictures", "Fotos de perros"),
                    ("cat.pictures", "Fotos de gatos"),
                    ("source.api", "API de origen: "),
                ],
            ),
            (
                "ja-jp",
                &[
                    ("dog.pictures", "犬の写真"),
                    ("cat.pictures", "猫の写真"),
                    ("source.api", "ソースAPI："),
                ],
            ),
        ];

        let mut table = PhraseTable::new();
        for (locale, phrases) in PHRASES {
            for (key, phrase) in *phrases {
                table.insert(locale, key, phrase);
            }
        }
        table
    }
}

impl PhraseSource for StaticPhrases {
    fn load(&self) -> impl Future<Output = Result<PhraseTable, TranslatorError>> {
        async { Ok(Self::table()) }
    }
}

/// Phrases from JSON text
#[derive(Debug, Clone)]
pub struct JsonPhrases {
    text: String,
}

impl JsonPhrases {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl PhraseSource for JsonPhrases {
    fn load(&self) -> impl Future<Output = Result<PhraseTable, TranslatorError>> {
        async move { PhraseTable::from_json(&self.text) }
    }
}

/// Phrases from a JSON file
#[derive(Debug, Clone)]
pub struct FilePhrases {
    path: PathBuf,
}

impl FilePhrases {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PhraseSource for FilePhrases {
    fn load(&self) -> impl Future<Output = Result<PhraseTable, TranslatorError>> {
        async move {
            tracing::debug!(path = %self.path.display(), "loading phrases");
            let text = smol::fs::read_to_string(&self.path)
                .await
                .map_err(|source| TranslatorError::Io {
                    path: self.path.clone(),
                    source,
                })?;
            PhraseTable::from_json(&text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locales_are_lowercased() {
        let table = PhraseTable::from_json(r#"{ "es-ES": { "greet": "Hola" } }"#).unwrap();
        assert!(table.contains_locale("es-es"));
        assert_eq!(table.get("es-es", "greet"), Some("Hola"));
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let mut table = PhraseTable::new();
        table.insert("en-us", "greet", "Hello");
        table.insert("en-us", "bye", "Bye");
        table.insert("es-es", "greet", "Hola");
        table.insert("es-es", "bye", "");

        assert_eq!(table.resolve("es-es", "en-us", "greet"), Some("Hola"));
        assert_eq!(table.resolve("es-es", "en-us", "bye"), Some("Bye"));
        assert_eq!(table.resolve("fr-fr", "en-us", "greet"), Some("Hello"));
        assert_eq!(table.resolve("es-es", "en-us", "nope"), None);
    }

    #[test]
    fn test_validate_requires_default_locale() {
        let table = PhraseTable::from_json(r#"{ "es-es": { "greet": "Hola" } }"#).unwrap();
        assert!(matches!(
            table.validate("en-us"),
            Err(TranslatorError::MissingDefaultLocale(locale)) if locale == "en-us"
        ));
        assert!(StaticPhrases::table().validate("en-us").is_ok());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            PhraseTable::from_json("[1, 2]"),
            Err(TranslatorError::Json(_))
        ));
    }

    #[test]
    fn test_sources_load() {
        let table = smol::block_on(StaticPhrases.load()).unwrap();
        assert_eq!(table.locales().collect::<Vec<_>>(), vec!["en-us", "es-es", "ja-jp"]);

        let json = JsonPhrases::new(r#"{ "en-us": { "greet": "Hello" } }"#);
        let table = smol::block_on(json.load()).unwrap();
        assert_eq!(table.get("en-us", "greet"), Some("Hello"));

        let missing = FilePhrases::new("/nonexistent/phrases.json");
        assert!(matches!(
            smol::block_on(missing.load()),
            Err(TranslatorError::Io { .. })
        ));
    }
}
