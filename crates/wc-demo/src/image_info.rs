//! `demo-image-info`: an image with its caption, rendered in a shadow root

use wc_dom::{Document, DomError, NodeId, NodeIterator, ShadowRootInit, WhatToShow};
use wc_lifecycle::{BoxError, CustomElement, ElementScope, LifecycleError, Reaction, Reactive};

pub const TAG: &str = "demo-image-info";

const TEMPLATE: &str = r#"<h2 i18n="dog.pictures"></h2><figure><img><figcaption><label></label><cite></cite><time></time><blockquote></blockquote><ul></ul><small i18n="source.api"></small></figcaption></figure>"#;

/// Nodes of the rendered template
#[derive(Debug, Clone, Copy)]
struct Parts {
    heading: NodeId,
    img: NodeId,
    label: NodeId,
    cite: NodeId,
    time: NodeId,
    blockquote: NodeId,
    list: NodeId,
}

/// Shows an image and its information
#[derive(Debug, Default)]
pub struct ImageInfo {
    parts: Option<Parts>,
}

impl ImageInfo {
    /// Template nodes, rendering the shadow root on first use
    fn parts(&mut self, scope: &mut ElementScope<'_>) -> Result<Parts, DomError> {
        if let Some(parts) = self.parts {
            return Ok(parts);
        }
        let shadow = scope.document.attach_shadow(scope.element(), ShadowRootInit::open())?;
        scope.document.insert_html(shadow, TEMPLATE)?;

        let doc = &*scope.document;
        let find = |tag: &str| first_by_tag(doc, shadow, tag).ok_or(DomError::NotAnElement(shadow));
        let parts = Parts {
            heading: find("h2")?,
            img: find("img")?,
            label: find("label")?,
            cite: find("cite")?,
            time: find("time")?,
            blockquote: find("blockquote")?,
            list: find("ul")?,
        };
        tracing::debug!(element = %scope.element(), "image info rendered");
        self.parts = Some(parts);
        Ok(parts)
    }

    fn set_text(
        &mut self,
        scope: &mut ElementScope<'_>,
        part: impl Fn(&Parts) -> NodeId,
        text: Option<&str>,
    ) -> Result<(), BoxError> {
        let node = part(&self.parts(scope)?);
        scope.document.set_text_content(node, text.unwrap_or_default())?;
        Ok(())
    }

    fn title_changed(
        &mut self,
        scope: &mut ElementScope<'_>,
        current: Option<&str>,
        _previous: Option<&str>,
    ) -> Result<(), BoxError> {
        self.set_text(scope, |p| p.label, current)
    }

    fn copyright_changed(
        &mut self,
        scope: &mut ElementScope<'_>,
        current: Option<&str>,
        _previous: Option<&str>,
    ) -> Result<(), BoxError> {
        self.set_text(scope, |p| p.cite, current)
    }

    fn explanation_changed(
        &mut self,
        scope: &mut ElementScope<'_>,
        current: Option<&str>,
        _previous: Option<&str>,
    ) -> Result<(), BoxError> {
        self.set_text(scope, |p| p.blockquote, current)
    }

    fn date_changed(
        &mut self,
        scope: &mut ElementScope<'_>,
        current: Option<&str>,
        _previous: Option<&str>,
    ) -> Result<(), BoxError> {
        let time = self.parts(scope)?.time;
        let date = current.unwrap_or_default();
        scope.document.set_attribute(time, "datetime", date)?;
        scope.document.set_text_content(time, date)?;
        Ok(())
    }

    fn tags_changed(
        &mut self,
        scope: &mut ElementScope<'_>,
        current: Option<&str>,
        _previous: Option<&str>,
    ) -> Result<(), BoxError> {
        let list = self.parts(scope)?.list;
        scope.document.set_text_content(list, "")?;
        for tag in current.unwrap_or_default().split(',').filter(|t| !t.is_empty()) {
            let item = scope.document.create_element("li");
            scope.document.set_text_content(item, tag)?;
            scope.document.append_child(list, item)?;
        }
        Ok(())
    }

    /// `base`, `url` and `media-type` all feed the image source
    fn source_changed(
        &mut self,
        scope: &mut ElementScope<'_>,
        _current: Option<&str>,
        _previous: Option<&str>,
    ) -> Result<(), BoxError> {
        let img = self.parts(scope)?.img;
        let Some(url) = scope.get_attribute("url") else {
            return Ok(());
        };
        let src = format!("{}{}", scope.get_attribute("base").unwrap_or_default(), url);
        scope.document.set_attribute(img, "src", &src)?;
        Ok(())
    }

    /// `kind` switches the heading between dog and cat pictures
    fn kind_changed(
        &mut self,
        scope: &mut ElementScope<'_>,
        current: Option<&str>,
        _previous: Option<&str>,
    ) -> Result<(), BoxError> {
        let heading = self.parts(scope)?.heading;
        let key = format!("{}.pictures", current.unwrap_or("dog"));
        scope.document.set_attribute(heading, "i18n", &key)?;
        Ok(())
    }
}

impl Reactive for ImageInfo {
    fn reaction(property: &str) -> Option<Reaction<Self>> {
        let reaction: Reaction<Self> = match property {
            "title" => Self::title_changed,
            "copyright" => Self::copyright_changed,
            "explanation" => Self::explanation_changed,
            "date" => Self::date_changed,
            "tags" => Self::tags_changed,
            "base" | "url" | "mediaType" => Self::source_changed,
            "kind" => Self::kind_changed,
            _ => return None,
        };
        Some(reaction)
    }
}

impl CustomElement for ImageInfo {
    const OBSERVED_ATTRIBUTES: &'static [&'static str] = &[
        "base",
        "media-type",
        "copyright",
        "title",
        "explanation",
        "tags",
        "date",
        "url",
        "kind",
    ];

    const ALIASES: &'static [(&'static str, &'static str)] = &[("created_at", "date")];

    fn create() -> Self {
        Self::default()
    }

    fn connected(&mut self, scope: &mut ElementScope<'_>) -> Result<(), LifecycleError> {
        self.parts(scope)?;
        scope.on_attach(self)
    }
}

/// First element named `tag` below `root`, in tree order
pub fn first_by_tag(document: &Document, root: NodeId, tag: &str) -> Option<NodeId> {
    let mut iter = NodeIterator::new(root, WhatToShow::ELEMENT);
    std::iter::from_fn(|| iter.next_node(document.tree())).find(|&n| document.tag_name(n) == Some(tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wc_runtime::Host;

    fn host_with_info() -> (Host, NodeId) {
        let mut host = Host::new();
        host.define::<ImageInfo>(TAG).unwrap();
        let el = host.create_element(TAG).unwrap();
        (host, el)
    }

    fn part(host: &Host, el: NodeId, tag: &str) -> NodeId {
        let shadow = host.document().shadow_root(el).unwrap();
        first_by_tag(host.document(), shadow, tag).unwrap()
    }

    #[test]
    fn test_renders_on_connect() {
        let (mut host, el) = host_with_info();
        host.set_attribute(el, "title", "Moon").unwrap();
        assert!(host.document().shadow_root(el).is_none());

        let body = host.body();
        host.append_child(body, el).unwrap();
        assert_eq!(host.document().text_content(part(&host, el, "label")), "Moon");
    }

    #[test]
    fn test_tags_become_list_items() {
        let (mut host, el) = host_with_info();
        let body = host.body();
        host.append_child(body, el).unwrap();

        host.set_attribute(el, "tags", "space,moon").unwrap();
        let list = part(&host, el, "ul");
        assert_eq!(host.document().inner_html(list), "<li>space</li><li>moon</li>");

        host.remove_attribute(el, "tags").unwrap();
        assert_eq!(host.document().inner_html(list), "");
    }

    #[test]
    fn test_image_source_joins_base_and_url() {
        let (mut host, el) = host_with_info();
        let body = host.body();
        host.append_child(body, el).unwrap();

        host.set_attribute(el, "base", "https://images.example/").unwrap();
        let img = part(&host, el, "img");
        assert!(!host.document().has_attribute(img, "src"));

        host.set_attribute(el, "url", "moon.jpg").unwrap();
        assert_eq!(
            host.document().get_attribute(img, "src"),
            Some("https://images.example/moon.jpg")
        );
    }

    #[test]
    fn test_date_sets_time_element() {
        let (mut host, el) = host_with_info();
        let body = host.body();
        host.append_child(body, el).unwrap();

        host.set_attribute(el, "date", "2021-01-01").unwrap();
        let time = part(&host, el, "time");
        assert_eq!(host.document().get_attribute(time, "datetime"), Some("2021-01-01"));
        assert_eq!(host.document().text_content(time), "2021-01-01");
    }
}
