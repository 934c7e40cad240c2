//! wc demo
//!
//! Assembles a page around the `demo-image-info` component, translates it
//! and serializes the result with open shadow roots inlined.
//!
//! # Example
//! ```rust,ignore
//! use wc_demo::{DemoConfig, Page};
//! use wc_i18n::StaticPhrases;
//!
//! let page = smol::block_on(Page::render(&DemoConfig::default(), &StaticPhrases))?;
//! println!("{}", page.html());
//! ```

mod config;
pub mod image_info;

pub use config::DemoConfig;
pub use image_info::ImageInfo;

use wc_dom::NodeId;
use wc_i18n::PhraseSource;
use wc_runtime::{Host, HostError};

const PAGE: &str = r#"<main><h1 i18n="source.api"></h1><demo-image-info></demo-image-info></main>"#;

/// A rendered demo page
#[derive(Debug)]
pub struct Page {
    pub host: Host,
    /// The `demo-image-info` element
    pub image: NodeId,
}

impl Page {
    /// Build the page, assign the configured image data and translate
    pub async fn render<S: PhraseSource>(config: &DemoConfig, phrases: &S) -> Result<Self, HostError> {
        let mut host = Host::with_translator_config(config.translator.clone());
        host.define::<ImageInfo>(image_info::TAG)?;
        host.document_mut().set_languages(config.languages.iter().cloned());

        let body = host.body();
        let main = host.insert_html(body, PAGE)?;
        let image = main
            .iter()
            .find_map(|&root| image_info::first_by_tag(host.document(), root, image_info::TAG))
            .ok_or(wc_dom::DomError::NotAnElement(body))?;

        let applied = host.apply_fields::<ImageInfo>(image, &config.image)?;
        tracing::debug!(applied, "image data assigned");

        host.initialize_translator(phrases).await?;
        Ok(Self { host, image })
    }

    /// Switch the preferred languages; the page is re-translated
    pub fn set_languages(&mut self, languages: &[String]) -> Result<(), HostError> {
        self.host.set_languages(languages.iter().cloned())
    }

    /// Locale the page is currently shown in
    pub fn locale(&self) -> Option<&str> {
        self.host.translator().current_locale()
    }

    /// Markup of the whole document with open shadow roots inlined
    pub fn html(&self) -> String {
        let doc = self.host.document();
        doc.composed_html(doc.document_element())
    }
}
