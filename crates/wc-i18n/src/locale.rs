//! Locale negotiation

use crate::PhraseTable;

/// Pick the table locale that best serves `preferred` (most preferred
/// first). Each preference tries an exact match, then any table locale
/// with the same primary subtag, in table order. Falls back to `default`.
pub fn negotiate<S: AsRef<str>>(preferred: &[S], table: &PhraseTable, default: &str) -> String {
    for locale in preferred.iter().map(|l| l.as_ref().to_lowercase()) {
        if table.contains_locale(&locale) {
            return locale;
        }
        let primary = primary_subtag(&locale);
        if let Some(found) = table.locales().find(|candidate| primary_subtag(candidate) == primary) {
            return found.to_string();
        }
    }
    default.to_string()
}

fn primary_subtag(locale: &str) -> &str {
    locale.split(['-', '_']).next().unwrap_or(locale)
}
