//! Attribute name <-> property name conversion

use heck::{ToKebabCase, ToLowerCamelCase};

/// `strawberry-banana`, `STRAWBERRY_BANANA` -> `strawberryBanana`
pub fn to_camel_case(name: &str) -> String {
    name.to_lower_camel_case()
}

/// `otherAttr`, `KIWI_LIME`, `Chocolate` -> `other-attr`, `kiwi-lime`, `chocolate`
pub fn to_kebab_case(name: &str) -> String {
    name.to_kebab_case()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(to_camel_case("foo-bar"), "fooBar");
        assert_eq!(to_camel_case("foo_bar"), "fooBar");
        assert_eq!(to_camel_case("KIWI_LIME"), "kiwiLime");
        assert_eq!(to_camel_case("chocolate"), "chocolate");
        assert_eq!(to_camel_case("error-message-key"), "errorMessageKey");
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(to_kebab_case("Chocolate"), "chocolate");
        assert_eq!(to_kebab_case("KIWI_LIME"), "kiwi-lime");
        assert_eq!(to_kebab_case("otherAttr"), "other-attr");
        assert_eq!(to_kebab_case("media-type"), "media-type");
        assert_eq!(to_kebab_case("createdAt"), "created-at");
    }
}
