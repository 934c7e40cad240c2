use wc_demo::image_info::first_by_tag;
use wc_demo::{DemoConfig, Page};
use wc_i18n::{JsonPhrases, StaticPhrases};

fn render(languages: &[&str]) -> Page {
    let config = DemoConfig {
        languages: languages.iter().map(|l| l.to_string()).collect(),
        ..DemoConfig::default()
    };
    smol::block_on(Page::render(&config, &StaticPhrases)).unwrap()
}

#[test]
fn test_page_in_spanish() {
    let page = render(&["es-ES"]);
    assert_eq!(page.locale(), Some("es-es"));

    let html = page.html();
    assert!(html.starts_with(r#"<html lang="es-es">"#));
    assert!(html.contains(r#"<h1 i18n="source.api">API de origen: </h1>"#));
    assert!(html.contains(r#"<template shadowrootmode="open">"#));
    assert!(html.contains(r#"<h2 i18n="dog.pictures">Fotos de perros</h2>"#));
}

#[test]
fn test_image_data_is_rendered() {
    let page = render(&["en-US"]);
    let doc = page.host.document();
    let shadow = doc.shadow_root(page.image).unwrap();

    assert_eq!(doc.get_attribute(page.image, "date"), Some("2021-01-01"));
    assert_eq!(doc.get_attribute(page.image, "tags"), Some("moon,night"));

    let label = first_by_tag(doc, shadow, "label").unwrap();
    assert_eq!(doc.text_content(label), "The Moon");
    let img = first_by_tag(doc, shadow, "img").unwrap();
    assert_eq!(doc.get_attribute(img, "src"), Some("https://images.example/moon.jpg"));
    let list = first_by_tag(doc, shadow, "ul").unwrap();
    assert_eq!(doc.inner_html(list), "<li>moon</li><li>night</li>");
}

#[test]
fn test_language_switch_retranslates_shadow_content() {
    let mut page = render(&["en-US"]);
    assert!(page.html().contains("Dog pictures"));

    page.set_languages(&["ja-JP".to_string()]).unwrap();
    assert_eq!(page.locale(), Some("ja-jp"));
    let html = page.html();
    assert!(html.contains("犬の写真"));
    assert!(html.contains("ソースAPI："));
    assert!(!html.contains("Dog pictures"));
}

#[test]
fn test_kind_attribute_changes_heading() {
    let mut page = render(&["en-US"]);
    page.host.set_attribute(page.image, "kind", "cat").unwrap();
    assert!(page.html().contains(r#"<h2 i18n="cat.pictures">Cat pictures</h2>"#));
}

#[test]
fn test_phrases_without_default_locale_fail() {
    let phrases = JsonPhrases::new(r#"{ "es-es": { "dog.pictures": "Perros" } }"#);
    let result = smol::block_on(Page::render(&DemoConfig::default(), &phrases));
    assert!(result.is_err());
}
