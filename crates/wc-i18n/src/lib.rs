//! wc i18n - Translator
//!
//! Keeps elements carrying `i18n` markers in sync with a locale phrase
//! table. The translator walks the document once on initialization, then
//! reacts to mutation records and `languagechange` notifications. Open
//! shadow roots it discovers are observed separately, since a document
//! observer never sees inside them.

mod config;
mod error;
mod locale;
mod phrases;
mod substitute;
mod translator;

pub use config::TranslatorConfig;
pub use error::TranslatorError;
pub use locale::negotiate;
pub use phrases::{FilePhrases, JsonPhrases, PhraseSource, PhraseTable, StaticPhrases};
pub use substitute::{Marker, fill_placeholders};
pub use translator::{PendingLoad, Translator, TranslatorState};
