//! Host runtime

use std::collections::HashMap;

use serde_json::{Map, Value};
use wc_dom::{
    Document, Event, EventTarget, LifecycleCallback, LifecycleCallbackInfo, NodeId, ShadowRootInit,
};
use wc_i18n::{PhraseSource, Translator, TranslatorConfig};
use wc_lifecycle::{CustomElement, ElementScope, Lifecycle, apply_fields, copy_observed_attributes};

use crate::{ElementHooks, HostError};

type Constructor = fn() -> Box<dyn ElementHooks>;

fn construct<E: CustomElement>() -> Box<dyn ElementHooks> {
    Box::new(E::create())
}

/// Upgrade/callback/translation rounds per flush
const MAX_FLUSH_ROUNDS: usize = 64;

/// Document plus everything that reacts to it
pub struct Host {
    document: Document,
    lifecycle: Lifecycle,
    translator: Translator,
    constructors: HashMap<String, Constructor>,
    components: HashMap<NodeId, Box<dyn ElementHooks>>,
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("document", &self.document)
            .field("lifecycle", &self.lifecycle)
            .field("translator", &self.translator)
            .field("definitions", &self.constructors.keys().collect::<Vec<_>>())
            .field("components", &self.components.len())
            .finish()
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl Host {
    pub fn new() -> Self {
        Self::with_translator_config(TranslatorConfig::default())
    }

    pub fn with_translator_config(config: TranslatorConfig) -> Self {
        Self {
            document: Document::new(),
            lifecycle: Lifecycle::new(),
            translator: Translator::new(config),
            constructors: HashMap::new(),
            components: HashMap::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Direct document access. Changes made here are picked up by the
    /// next [`Host::flush`].
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn body(&self) -> NodeId {
        self.document.body()
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    /// Define `tag` as implemented by `E`
    pub fn define<E: CustomElement>(&mut self, tag: &str) -> Result<(), HostError> {
        self.document.define(tag, E::OBSERVED_ATTRIBUTES)?;
        self.constructors.insert(tag.to_string(), construct::<E> as Constructor);
        tracing::info!(tag, "custom element defined");
        self.flush()
    }

    /// Read access to the component instance of an element
    pub fn with_element<E: CustomElement, R>(&self, id: NodeId, f: impl FnOnce(&E) -> R) -> Option<R> {
        let component = self.components.get(&id)?;
        component.as_any().downcast_ref::<E>().map(f)
    }

    /// Mutable access to a component instance together with its scope.
    /// Pending work is flushed afterwards.
    pub fn with_element_mut<E: CustomElement, R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut E, &mut ElementScope<'_>) -> R,
    ) -> Result<Option<R>, HostError> {
        let Some(component) = self.components.get_mut(&id) else {
            return Ok(None);
        };
        let Some(component) = component.as_any_mut().downcast_mut::<E>() else {
            return Ok(None);
        };
        let mut scope = ElementScope::new(&mut self.document, &mut self.lifecycle, id);
        let result = f(component, &mut scope);
        self.flush()?;
        Ok(Some(result))
    }

    /// Whether an element has a component instance
    pub fn is_upgraded(&self, id: NodeId) -> bool {
        self.components.contains_key(&id)
    }

    // ------------------------------------------------------------------
    // DOM operations
    // ------------------------------------------------------------------

    pub fn create_element(&mut self, name: &str) -> Result<NodeId, HostError> {
        let id = self.document.create_element(name);
        self.flush()?;
        Ok(id)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, HostError> {
        self.document.append_child(parent, child)?;
        self.flush()?;
        Ok(child)
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<NodeId, HostError> {
        self.document.insert_before(parent, child, reference)?;
        self.flush()?;
        Ok(child)
    }

    pub fn remove(&mut self, node: NodeId) -> Result<(), HostError> {
        self.document.remove(node)?;
        self.flush()
    }

    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<(), HostError> {
        self.document.set_attribute(element, name, value)?;
        self.flush()
    }

    pub fn remove_attribute(&mut self, element: NodeId, name: &str) -> Result<Option<String>, HostError> {
        let old = self.document.remove_attribute(element, name)?;
        self.flush()?;
        Ok(old)
    }

    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), HostError> {
        self.document.set_text_content(node, text)?;
        self.flush()
    }

    /// Parse `html` and append it to `parent`
    pub fn insert_html(&mut self, parent: NodeId, html: &str) -> Result<Vec<NodeId>, HostError> {
        let nodes = self.document.insert_html(parent, html)?;
        self.flush()?;
        Ok(nodes)
    }

    pub fn attach_shadow(&mut self, host: NodeId, init: ShadowRootInit) -> Result<NodeId, HostError> {
        let shadow = self.document.attach_shadow(host, init)?;
        self.flush()?;
        Ok(shadow)
    }

    /// Dispatch an event, then flush what its listeners caused
    pub fn dispatch_event(&mut self, event: &Event) -> Result<usize, HostError> {
        let invoked = self.document.dispatch_event(event);
        self.flush()?;
        Ok(invoked)
    }

    /// Change the preferred languages and fire `languagechange`
    pub fn set_languages<I, S>(&mut self, languages: I) -> Result<(), HostError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.document.set_languages(languages);
        self.dispatch_event(&Event::new("languagechange", EventTarget::Window))?;
        Ok(())
    }

    /// See [`copy_observed_attributes`]
    pub fn copy_observed_attributes(
        &mut self,
        source: NodeId,
        destination: NodeId,
        names: Option<&[&str]>,
    ) -> Result<usize, HostError> {
        let copied = copy_observed_attributes(&mut self.document, source, destination, names)?;
        self.flush()?;
        Ok(copied)
    }

    /// See [`apply_fields`]
    pub fn apply_fields<E: CustomElement>(
        &mut self,
        element: NodeId,
        fields: &Map<String, Value>,
    ) -> Result<usize, HostError> {
        let applied = apply_fields::<E>(&mut self.document, element, fields)?;
        self.flush()?;
        Ok(applied)
    }

    // ------------------------------------------------------------------
    // Translator
    // ------------------------------------------------------------------

    /// Load phrases and translate the document
    pub async fn initialize_translator<S: PhraseSource>(&mut self, source: &S) -> Result<(), HostError> {
        self.translator.initialize(&mut self.document, source).await?;
        self.flush()
    }

    pub fn reset_translator(&mut self) {
        self.translator.reset(&mut self.document);
    }

    // ------------------------------------------------------------------
    // Flush
    // ------------------------------------------------------------------

    /// Upgrade new elements, deliver lifecycle callbacks and let the
    /// translator handle mutations until nothing is left. A failing hook
    /// aborts the flush with its error.
    pub fn flush(&mut self) -> Result<(), HostError> {
        for _ in 0..MAX_FLUSH_ROUNDS {
            let mut progressed = self.upgrade();

            let callbacks = self.document.take_lifecycle_callbacks();
            progressed |= !callbacks.is_empty();
            for info in callbacks {
                self.deliver(info)?;
            }

            progressed |= self.translator.process(&mut self.document)? > 0;
            if !progressed {
                return Ok(());
            }
        }
        tracing::warn!("flush still busy after {MAX_FLUSH_ROUNDS} rounds");
        Ok(())
    }

    fn upgrade(&mut self) -> bool {
        let candidates = self.document.take_upgrade_candidates();
        let upgraded = !candidates.is_empty();
        for candidate in candidates {
            if self.components.contains_key(&candidate.node_id) {
                continue;
            }
            let Some(constructor) = self.constructors.get(&candidate.name) else {
                continue;
            };
            tracing::debug!(element = %candidate.node_id, tag = %candidate.name, "upgrading element");
            self.components.insert(candidate.node_id, constructor());
        }
        upgraded
    }

    fn deliver(&mut self, info: LifecycleCallbackInfo) -> Result<(), HostError> {
        let Some(component) = self.components.get_mut(&info.element_id) else {
            tracing::trace!(element = %info.element_id, "callback for element without instance");
            return Ok(());
        };
        let mut scope = ElementScope::new(&mut self.document, &mut self.lifecycle, info.element_id);
        if info.callback == LifecycleCallback::AttributeChanged {
            scope = scope.with_connection_at_change(info.connected);
        }
        match info.callback {
            LifecycleCallback::Connected => component.connected(&mut scope)?,
            LifecycleCallback::Disconnected => component.disconnected(&mut scope)?,
            LifecycleCallback::AttributeChanged => {
                let name = info.attribute_name.as_deref().unwrap_or_default();
                component.attribute_changed(
                    &mut scope,
                    name,
                    info.old_value.as_deref(),
                    info.new_value.as_deref(),
                )?
            }
        }
        Ok(())
    }
}
