//! Translator errors

use std::path::PathBuf;

use wc_dom::DomError;

/// Translator errors
#[derive(Debug, thiserror::Error)]
pub enum TranslatorError {
    #[error("Phrase table has no entry for the default locale `{0}`")]
    MissingDefaultLocale(String),

    #[error("Invalid phrase table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read phrases from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Dom(#[from] DomError),
}
