//! Translator state machine
//!
//! `Uninitialized -> Ready -> (reset) -> Uninitialized`. Loading the phrase
//! table is the only asynchronous step; everything after runs against the
//! document synchronously.

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use wc_dom::{
    Document, EventHandler, EventTarget, ListenerOptions, MutationObserverInit, MutationType,
    NodeId, NodeIterator, ObserverId, WhatToShow,
};

use crate::substitute::{Marker, fill_placeholders};
use crate::{PhraseSource, PhraseTable, TranslatorConfig, TranslatorError, negotiate};

const LANGUAGE_CHANGE: &str = "languagechange";

/// Record batches handled per `process` call before giving up
const MAX_ROUNDS: usize = 16;

/// Translator lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranslatorState {
    #[default]
    Uninitialized,
    Ready,
}

/// Ticket for a phrase load in flight. Completing it after a reset is a
/// no-op.
#[derive(Debug)]
#[must_use]
pub struct PendingLoad {
    generation: u64,
}

/// Keeps `i18n` markers in a document translated
pub struct Translator {
    config: TranslatorConfig,
    state: TranslatorState,
    table: PhraseTable,
    current_locale: Option<String>,
    observer: Option<ObserverId>,
    /// Shadow roots already registered with the observer
    observed_roots: HashSet<NodeId>,
    listener: Option<EventHandler>,
    /// Set by the `languagechange` listener, consumed by `process`
    locale_dirty: Rc<Cell<bool>>,
    generation: u64,
    full_passes: u64,
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("state", &self.state)
            .field("current_locale", &self.current_locale)
            .field("observed_roots", &self.observed_roots.len())
            .field("full_passes", &self.full_passes)
            .finish()
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(TranslatorConfig::default())
    }
}

impl Translator {
    pub fn new(mut config: TranslatorConfig) -> Self {
        config.default_locale = config.default_locale.to_lowercase();
        // attribute names are stored lowercased
        config.prefix = config.prefix.to_lowercase();
        Self {
            config,
            state: TranslatorState::Uninitialized,
            table: PhraseTable::new(),
            current_locale: None,
            observer: None,
            observed_roots: HashSet::new(),
            listener: None,
            locale_dirty: Rc::new(Cell::new(false)),
            generation: 0,
            full_passes: 0,
        }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn state(&self) -> TranslatorState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == TranslatorState::Ready
    }

    /// Active locale, once initialized
    pub fn current_locale(&self) -> Option<&str> {
        self.current_locale.as_deref()
    }

    pub fn table(&self) -> &PhraseTable {
        &self.table
    }

    /// Whether a shadow root is registered with the observer
    pub fn is_observing_root(&self, root: NodeId) -> bool {
        self.observed_roots.contains(&root)
    }

    /// Number of whole-document translation passes so far
    pub fn full_passes(&self) -> u64 {
        self.full_passes
    }

    /// Load phrases from `source` and translate the document
    pub async fn initialize<S: PhraseSource>(
        &mut self,
        document: &mut Document,
        source: &S,
    ) -> Result<(), TranslatorError> {
        let pending = self.begin_initialize(document);
        let table = source.load().await?;
        self.complete_initialize(document, pending, table)?;
        Ok(())
    }

    /// Start initializing; resets first if already initialized
    pub fn begin_initialize(&mut self, document: &mut Document) -> PendingLoad {
        if self.state != TranslatorState::Uninitialized {
            self.reset(document);
        }
        PendingLoad {
            generation: self.generation,
        }
    }

    /// Finish initializing with a loaded table. Returns `Ok(false)` when the
    /// load was overtaken by a reset and nothing was applied.
    pub fn complete_initialize(
        &mut self,
        document: &mut Document,
        pending: PendingLoad,
        table: PhraseTable,
    ) -> Result<bool, TranslatorError> {
        if pending.generation != self.generation || self.state != TranslatorState::Uninitialized {
            tracing::debug!("discarding phrase table loaded before a reset");
            return Ok(false);
        }
        table.validate(&self.config.default_locale)?;
        self.table = table;

        let observer = document.create_observer();
        let root = document.root();
        document.observe(observer, root, observe_options())?;
        self.observer = Some(observer);

        let dirty = Rc::clone(&self.locale_dirty);
        let handler: EventHandler = Rc::new(move |_| dirty.set(true));
        document.add_event_listener(
            EventTarget::Window,
            LANGUAGE_CHANGE,
            Rc::clone(&handler),
            ListenerOptions::default(),
        );
        self.listener = Some(handler);

        self.state = TranslatorState::Ready;
        tracing::debug!(locales = ?self.table.locales().collect::<Vec<_>>(), "translator ready");
        self.set_locale(document)?;
        Ok(true)
    }

    /// Stop observing and forget phrases and locale. Translated text stays.
    pub fn reset(&mut self, document: &mut Document) {
        if let Some(observer) = self.observer.take() {
            document.remove_observer(observer);
        }
        if let Some(handler) = self.listener.take() {
            document.remove_event_listener(
                EventTarget::Window,
                LANGUAGE_CHANGE,
                &handler,
                ListenerOptions::default(),
            );
        }
        self.table.clear();
        self.current_locale = None;
        self.observed_roots.clear();
        self.locale_dirty.set(false);
        self.state = TranslatorState::Uninitialized;
        self.generation += 1;
        tracing::debug!("translator reset");
    }

    /// Resolve the locale from the document's preferred languages. When it
    /// changed, record it on `<html>` and translate the whole document.
    /// Returns whether the locale changed.
    pub fn set_locale(&mut self, document: &mut Document) -> Result<bool, TranslatorError> {
        if !self.is_ready() {
            return Ok(false);
        }
        let locale = negotiate(
            document.navigator().languages.as_slice(),
            &self.table,
            &self.config.default_locale,
        );
        if self.current_locale.as_deref() == Some(locale.as_str()) {
            return Ok(false);
        }

        tracing::debug!(%locale, previous = ?self.current_locale, "locale changed");
        let html = document.document_element();
        document.set_attribute(html, &self.config.locale_attribute, &locale)?;
        self.current_locale = Some(locale);

        let root = document.root();
        self.deep_translate(document, root)?;
        self.full_passes += 1;
        Ok(true)
    }

    /// Phrase for `key` in the active locale, then the default locale,
    /// else empty
    pub fn translate(&self, key: &str) -> &str {
        self.lookup(key).unwrap_or_default()
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        let default = self.config.default_locale.as_str();
        let active = self.current_locale.as_deref().unwrap_or(default);
        self.table.resolve(active, default, key)
    }

    /// Handle a pending `languagechange` and queued mutation records.
    /// Returns the number of records handled.
    pub fn process(&mut self, document: &mut Document) -> Result<usize, TranslatorError> {
        let Some(observer) = self.observer.filter(|_| self.is_ready()) else {
            return Ok(0);
        };
        if self.locale_dirty.replace(false) {
            self.set_locale(document)?;
        }

        let mut handled = 0;
        for _ in 0..MAX_ROUNDS {
            let records = document.take_records(observer);
            if records.is_empty() {
                return Ok(handled);
            }
            for record in records {
                handled += 1;
                match record.mutation_type {
                    MutationType::Attributes => {
                        let is_marker = record
                            .attribute_name
                            .as_deref()
                            .is_some_and(|name| name.starts_with(&self.config.prefix));
                        if is_marker {
                            self.translate_element(document, record.target)?;
                        }
                    }
                    MutationType::ChildList => {
                        for node in record.added_nodes {
                            let is_text = document.tree().get(node).is_some_and(|n| n.is_text());
                            if !is_text {
                                self.deep_translate(document, node)?;
                            }
                        }
                    }
                    MutationType::CharacterData => {}
                }
            }
        }
        tracing::warn!(handled, "mutation records still queued after {MAX_ROUNDS} rounds");
        Ok(handled)
    }

    /// Translate every element under `root` in document order, descending
    /// into open shadow roots and observing each one once
    fn deep_translate(&mut self, document: &mut Document, root: NodeId) -> Result<(), TranslatorError> {
        let mut iter = NodeIterator::new(root, WhatToShow::ELEMENT);
        while let Some(element) = iter.next_node(document.tree()) {
            self.translate_element(document, element)?;
            if let Some(shadow) = document.shadow_root(element) {
                self.observe_shadow_root(document, shadow)?;
                self.deep_translate(document, shadow)?;
            }
        }
        Ok(())
    }

    fn observe_shadow_root(&mut self, document: &mut Document, shadow: NodeId) -> Result<(), TranslatorError> {
        let Some(observer) = self.observer else {
            return Ok(());
        };
        if self.observed_roots.insert(shadow) {
            tracing::debug!(%shadow, "observing shadow root");
            document.observe(observer, shadow, observe_options())?;
        }
        Ok(())
    }

    /// Apply the markers of one element
    fn translate_element(&mut self, document: &mut Document, element: NodeId) -> Result<(), TranslatorError> {
        let markers: Vec<(Marker, String)> = document
            .attributes(element)
            .iter()
            .filter_map(|attr| {
                Marker::classify(&attr.name, &self.config.prefix).map(|m| (m, attr.value.clone()))
            })
            .collect();

        for (marker, key) in markers {
            match marker {
                Marker::Text => {
                    let text = self.render(document, element, &key);
                    if document.text_content(element) != text {
                        tracing::trace!(%element, %key, "translating text");
                        document.set_text_content(element, &text)?;
                    }
                }
                Marker::Attribute(target) => {
                    let text = self.render(document, element, &key);
                    if document.get_attribute(element, &target) != Some(text.as_str()) {
                        tracing::trace!(%element, %key, attribute = %target, "translating attribute");
                        document.set_attribute(element, &target, &text)?;
                    }
                }
                Marker::Insert(_) => {}
            }
        }
        Ok(())
    }

    /// Phrase for `key` with its placeholders filled from the element's
    /// companion attributes
    fn render(&self, document: &Document, element: NodeId, key: &str) -> String {
        let phrase = self.translate(key);
        fill_placeholders(phrase, |id| {
            let companion = self.config.insert_attribute(id);
            match document.get_attribute(element, &companion) {
                Some(value) => self.lookup(value).unwrap_or(value).to_string(),
                None => String::new(),
            }
        })
    }
}

fn observe_options() -> MutationObserverInit {
    MutationObserverInit {
        child_list: true,
        attributes: true,
        subtree: true,
        ..Default::default()
    }
}
