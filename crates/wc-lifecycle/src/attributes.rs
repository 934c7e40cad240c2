//! Attribute propagation between elements and from component data

use serde_json::{Map, Value};
use wc_dom::{Document, DomError, NodeId};

use crate::case::{to_camel_case, to_kebab_case};
use crate::CustomElement;

/// Copy attribute values from `source` to `destination`.
///
/// `names` defaults to the observed attributes of the source's definition.
/// Names are kebab-cased first, so `KIWI_LIME` and `kiwiLime` both mean
/// `kiwi-lime`. Missing and empty values are skipped. Returns the number
/// of attributes copied.
pub fn copy_observed_attributes(
    document: &mut Document,
    source: NodeId,
    destination: NodeId,
    names: Option<&[&str]>,
) -> Result<usize, DomError> {
    let names: Vec<String> = match names {
        Some(names) => names.iter().map(|n| to_kebab_case(n)).collect(),
        None => {
            let tag = document.tag_name(source).ok_or(DomError::NotAnElement(source))?;
            document
                .custom_elements()
                .observed_attributes(tag)
                .iter()
                .map(|n| to_kebab_case(n))
                .collect()
        }
    };

    let values: Vec<(String, String)> = names
        .into_iter()
        .filter_map(|name| {
            let value = document.get_attribute(source, &name)?;
            (!value.is_empty()).then(|| (name.clone(), value.to_string()))
        })
        .collect();

    for (name, value) in &values {
        document.set_attribute(destination, name, value)?;
    }
    Ok(values.len())
}

/// Assign component data onto an element's observed attributes.
///
/// Field names go through `E::ALIASES` and are kebab-cased; fields that do
/// not name an observed attribute are ignored. `null` removes the
/// attribute, arrays are joined with `,`. Returns the number of attributes
/// written or removed.
pub fn apply_fields<E: CustomElement>(
    document: &mut Document,
    element: NodeId,
    fields: &Map<String, Value>,
) -> Result<usize, DomError> {
    let mut applied = 0;
    for (field, value) in fields {
        let property = to_camel_case(field);
        let property = E::ALIASES
            .iter()
            .find(|(alias, _)| to_camel_case(alias) == property)
            .map_or(property.as_str(), |&(_, target)| target);
        let name = to_kebab_case(property);

        if !E::OBSERVED_ATTRIBUTES.contains(&name.as_str()) {
            tracing::trace!(%element, %field, "ignoring unobserved field");
            continue;
        }

        match value {
            Value::Null => {
                document.remove_attribute(element, &name)?;
            }
            other => {
                document.set_attribute(element, &name, &attribute_value(other))?;
            }
        }
        applied += 1;
    }
    Ok(applied)
}

fn attribute_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(attribute_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Reaction, Reactive};
    use serde_json::json;

    struct ImageInfo;

    impl Reactive for ImageInfo {
        fn reaction(_property: &str) -> Option<Reaction<Self>> {
            None
        }
    }

    impl CustomElement for ImageInfo {
        const OBSERVED_ATTRIBUTES: &'static [&'static str] = &["title", "date", "tags", "media-type"];
        const ALIASES: &'static [(&'static str, &'static str)] = &[("created_at", "date")];

        fn create() -> Self {
            ImageInfo
        }
    }

    #[test]
    fn test_apply_fields() {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        doc.set_attribute(el, "title", "old").unwrap();

        let fields = json!({
            "created_at": "2021-03-04",
            "mediaType": "image",
            "tags": ["dog", "cute"],
            "title": null,
            "unused": 5
        });
        let applied = apply_fields::<ImageInfo>(&mut doc, el, fields.as_object().unwrap()).unwrap();

        assert_eq!(applied, 4);
        assert_eq!(doc.get_attribute(el, "date"), Some("2021-03-04"));
        assert_eq!(doc.get_attribute(el, "media-type"), Some("image"));
        assert_eq!(doc.get_attribute(el, "tags"), Some("dog,cute"));
        assert!(!doc.has_attribute(el, "title"));
        assert!(!doc.has_attribute(el, "unused"));
    }

    #[test]
    fn test_numbers_and_booleans_are_stringified() {
        assert_eq!(attribute_value(&json!(3)), "3");
        assert_eq!(attribute_value(&json!(true)), "true");
        assert_eq!(attribute_value(&json!([1, "a"])), "1,a");
    }

    #[test]
    fn test_copy_with_no_names_and_undefined_source() {
        let mut doc = Document::new();
        let one = doc.create_element("div");
        let two = doc.create_element("div");
        assert_eq!(copy_observed_attributes(&mut doc, one, two, None).unwrap(), 0);
    }
}
