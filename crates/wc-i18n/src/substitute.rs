//! Marker classification and placeholder filling

/// What a marker attribute asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// `<prefix>`: the phrase becomes the text content
    Text,
    /// `<prefix>-<attr>`: the phrase is written to `<attr>`
    Attribute(String),
    /// `<prefix>-insert-<id>`: input for a `{{id}}` placeholder
    Insert(String),
}

impl Marker {
    /// Classify an attribute name. Names that start with the prefix but
    /// are not one of the marker forms yield `None`, like unrelated names.
    pub fn classify(name: &str, prefix: &str) -> Option<Marker> {
        let rest = name.strip_prefix(prefix)?;
        if rest.is_empty() {
            return Some(Marker::Text);
        }
        let rest = rest.strip_prefix('-')?;
        if let Some(id) = rest.strip_prefix("insert-") {
            return Some(Marker::Insert(id.to_string()));
        }
        (!rest.is_empty() && rest != "insert").then(|| Marker::Attribute(rest.to_string()))
    }
}

/// Replace every `{{id}}` in `phrase` with `resolve(id)`. An unterminated
/// `{{` is kept as written.
pub fn fill_placeholders(phrase: &str, mut resolve: impl FnMut(&str) -> String) -> String {
    let mut output = String::with_capacity(phrase.len());
    let mut rest = phrase;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        output.push_str(&rest[..start]);
        output.push_str(&resolve(rest[start + 2..start + 2 + len].trim()));
        rest = &rest[start + 2 + len + 2..];
    }
    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(Marker::classify("i18n", "i18n"), Some(Marker::Text));
        assert_eq!(Marker::classify("i18n-title", "i18n"), Some(Marker::Attribute("title".into())));
        assert_eq!(Marker::classify("i18n-insert-name", "i18n"), Some(Marker::Insert("name".into())));
        assert_eq!(Marker::classify("i18n-insert", "i18n"), None);
        assert_eq!(Marker::classify("i18nfoo", "i18n"), None);
        assert_eq!(Marker::classify("title", "i18n"), None);
    }

    #[test]
    fn test_fill_placeholders() {
        let filled = fill_placeholders("Hi {{name}}, {{ greeting }}!", |id| match id {
            "name" => "Bob".to_string(),
            "greeting" => "welcome".to_string(),
            _ => String::new(),
        });
        assert_eq!(filled, "Hi Bob, welcome!");
    }

    #[test]
    fn test_unterminated_placeholder_is_literal() {
        assert_eq!(fill_placeholders("Hi {{name", |_| "X".into()), "Hi {{name");
        assert_eq!(fill_placeholders("{{a}} and {{b", |_| "X".into()), "X and {{b");
        assert_eq!(fill_placeholders("no tokens", |_| "X".into()), "no tokens");
    }
}
