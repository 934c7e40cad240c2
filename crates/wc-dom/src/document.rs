//! Document - High-level document API
//!
//! Every structural or attribute change goes through here so that mutation
//! records reach observers and defined custom elements get their lifecycle
//! callbacks queued, mirroring what a browser does around each DOM call.

use crate::custom_elements::{CallbackQueue, LifecycleCallbackInfo, UpgradeCandidate};
use crate::events::{Event, EventHandler, EventListeners, EventTarget, ListenerOptions};
use crate::observer::{MutationObserverInit, MutationRecord, ObserverId, Observers};
use crate::shadow::{ShadowRootInit, can_host_shadow};
use crate::{
    Attribute, CustomElementError, CustomElementRegistry, DomError, DomTree, NodeData, NodeId,
};

/// Browser environment values the document exposes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    /// Preferred languages, most preferred first
    pub languages: Vec<String>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            languages: vec!["en-US".to_string()],
        }
    }
}

/// HTML Document
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
    observers: Observers,
    listeners: EventListeners,
    registry: CustomElementRegistry,
    callbacks: CallbackQueue,
    navigator: Navigator,
}

impl Document {
    /// Create a document holding `<html><head></head><body></body></html>`
    pub fn new() -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        tree.append_child(tree.root(), html);
        tree.append_child(html, head);
        tree.append_child(html, body);

        Self {
            tree,
            html_element: html,
            head_element: head,
            body_element: body,
            observers: Observers::default(),
            listeners: EventListeners::default(),
            registry: CustomElementRegistry::new(),
            callbacks: CallbackQueue::new(),
            navigator: Navigator::default(),
        }
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Replace the preferred language list. Dispatching `languagechange`
    /// is left to the caller.
    pub fn set_languages<I, S>(&mut self, languages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.navigator.languages = languages.into_iter().map(Into::into).collect();
    }

    // ------------------------------------------------------------------
    // Node creation
    // ------------------------------------------------------------------

    /// Create a detached element; defined names become upgrade candidates
    pub fn create_element(&mut self, name: &str) -> NodeId {
        let id = self.tree.create_element(name);
        let tag = name.to_ascii_lowercase();
        if self.registry.is_defined(&tag) {
            self.registry.add_upgrade_candidate(id, &tag);
        }
        id
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.create_text(content)
    }

    /// Create a detached comment
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.tree.create_comment(content)
    }

    // ------------------------------------------------------------------
    // Tree mutation
    // ------------------------------------------------------------------

    /// Append `child` to `parent`, moving it if it already has a parent
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference` (append if None)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<NodeId, DomError> {
        let parent_node = self.tree.get(parent).ok_or(DomError::NodeNotFound(parent))?;
        if !parent_node.is_container() {
            return Err(DomError::NotAContainer(parent));
        }
        let child_node = self.tree.get(child).ok_or(DomError::NodeNotFound(child))?;
        if matches!(child_node.data, NodeData::Document | NodeData::ShadowRoot(_))
            || self.tree.is_shadow_including_inclusive_ancestor(child, parent)
        {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        let mut reference = reference.unwrap_or(NodeId::NONE);
        if reference.is_valid() && self.tree.parent(reference) != parent {
            return Err(DomError::NotAChild {
                parent,
                child: reference,
            });
        }
        if reference == child {
            reference = self.tree.get(child).map_or(NodeId::NONE, |n| n.next_sibling);
        }

        if self.tree.parent(child).is_valid() {
            self.remove(child)?;
        }

        self.tree.insert_before(parent, child, reference);
        let (prev, next) = self.siblings(child);
        tracing::trace!(%parent, %child, "inserted node");
        self.record(MutationRecord::child_list(parent, vec![child], Vec::new()).with_siblings(prev, next));

        if self.tree.is_connected(child) {
            self.enqueue_for_subtree(child, LifecycleCallbackInfo::connected);
        }
        Ok(child)
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, DomError> {
        if self.tree.parent(child) != parent {
            return Err(DomError::NotAChild { parent, child });
        }
        self.remove(child)?;
        Ok(child)
    }

    /// Remove a node from its parent. Removing a detached node is a no-op.
    pub fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
        self.tree.get(node).ok_or(DomError::NodeNotFound(node))?;
        let parent = self.tree.parent(node);
        if !parent.is_valid() {
            return Ok(());
        }

        let was_connected = self.tree.is_connected(node);
        let (prev, next) = self.siblings(node);
        self.tree.detach(node);
        tracing::trace!(%parent, %node, "removed node");
        self.record(MutationRecord::child_list(parent, Vec::new(), vec![node]).with_siblings(prev, next));

        if was_connected {
            self.enqueue_for_subtree(node, LifecycleCallbackInfo::disconnected);
        }
        Ok(())
    }

    /// Concatenated descendant text
    pub fn text_content(&self, node: NodeId) -> String {
        self.tree.text_content(node)
    }

    /// Replace all children with a single text node (none if `text` is
    /// empty), or set the data of a text node.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        let target = self.tree.get_mut(node).ok_or(DomError::NodeNotFound(node))?;
        if let NodeData::Text(content) | NodeData::Comment(content) = &mut target.data {
            let old = std::mem::replace(content, text.to_string());
            self.record(MutationRecord::character_data(node, Some(old)));
            return Ok(());
        }
        if !target.is_container() {
            return Err(DomError::NotAContainer(node));
        }

        let connected = self.tree.is_connected(node);
        let removed: Vec<NodeId> = self.tree.children(node).collect();
        for &child in &removed {
            self.tree.detach(child);
            if connected {
                self.enqueue_for_subtree(child, LifecycleCallbackInfo::disconnected);
            }
        }

        let mut added = Vec::new();
        if !text.is_empty() {
            let text_node = self.tree.create_text(text);
            self.tree.append_child(node, text_node);
            added.push(text_node);
        }

        if !added.is_empty() || !removed.is_empty() {
            self.record(MutationRecord::child_list(node, added, removed));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    /// Set an attribute; the name is lowercased like HTML does
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let name = name.to_ascii_lowercase();
        let old = self.element_mut(element)?.set_attr(&name, value);
        tracing::trace!(%element, attribute = %name, value, "set attribute");
        self.record(MutationRecord::attributes(element, &name, old.clone()));
        self.enqueue_attribute_changed(element, &name, old, Some(value.to_string()));
        Ok(())
    }

    /// Remove an attribute, returning its previous value
    pub fn remove_attribute(&mut self, element: NodeId, name: &str) -> Result<Option<String>, DomError> {
        let name = name.to_ascii_lowercase();
        let old = self.element_mut(element)?.remove_attr(&name);
        if old.is_some() {
            self.record(MutationRecord::attributes(element, &name, old.clone()));
            self.enqueue_attribute_changed(element, &name, old.clone(), None);
        }
        Ok(old)
    }

    pub fn get_attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        self.tree.get_attribute(element, &name.to_ascii_lowercase())
    }

    pub fn has_attribute(&self, element: NodeId, name: &str) -> bool {
        self.get_attribute(element, name).is_some()
    }

    /// Attributes of an element in insertion order
    pub fn attributes(&self, element: NodeId) -> &[Attribute] {
        self.tree
            .get(element)
            .and_then(|n| n.as_element())
            .map(|e| e.attrs.as_slice())
            .unwrap_or_default()
    }

    pub fn tag_name(&self, element: NodeId) -> Option<&str> {
        self.tree.tag_name(element)
    }

    fn element_mut(&mut self, element: NodeId) -> Result<&mut crate::ElementData, DomError> {
        self.tree
            .get_mut(element)
            .ok_or(DomError::NodeNotFound(element))?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(element))
    }

    // ------------------------------------------------------------------
    // Shadow DOM
    // ------------------------------------------------------------------

    /// Attach a shadow root to `host`
    pub fn attach_shadow(&mut self, host: NodeId, init: ShadowRootInit) -> Result<NodeId, DomError> {
        let elem = self
            .tree
            .get(host)
            .ok_or(DomError::NodeNotFound(host))?
            .as_element()
            .ok_or(DomError::NotAnElement(host))?;
        if !can_host_shadow(&elem.name) {
            return Err(DomError::ShadowNotSupported(elem.name.clone()));
        }
        if elem.shadow_root.is_some() {
            return Err(DomError::ShadowRootExists(host));
        }
        let shadow = self.tree.create_shadow_root(host, init.mode);
        tracing::debug!(%host, %shadow, mode = ?init.mode, "attached shadow root");
        Ok(shadow)
    }

    /// Open shadow root of an element
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.tree.shadow_root(host)
    }

    /// Host element of a shadow root
    pub fn host(&self, shadow: NodeId) -> Option<NodeId> {
        self.tree.host(shadow)
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.tree.is_connected(node)
    }

    // ------------------------------------------------------------------
    // Custom elements
    // ------------------------------------------------------------------

    pub fn custom_elements(&self) -> &CustomElementRegistry {
        &self.registry
    }

    /// Define a custom element. Elements that already exist with this name
    /// become upgrade candidates and get the callbacks an upgrade implies.
    pub fn define(&mut self, name: &str, observed_attributes: &[&str]) -> Result<(), CustomElementError> {
        self.registry.define(name, observed_attributes)?;

        let existing: Vec<NodeId> = (0..self.tree.len() as u32)
            .map(NodeId)
            .filter(|&id| self.tree.tag_name(id) == Some(name))
            .collect();
        for id in existing {
            self.registry.add_upgrade_candidate(id, name);
            let present: Vec<(String, String)> = self
                .attributes(id)
                .iter()
                .filter(|a| observed_attributes.contains(&a.name.as_str()))
                .map(|a| (a.name.clone(), a.value.clone()))
                .collect();
            let connected = self.tree.is_connected(id);
            for (attr, value) in present {
                self.callbacks.enqueue(LifecycleCallbackInfo::attribute_changed(
                    id,
                    &attr,
                    None,
                    Some(value),
                    connected,
                ));
            }
            if connected {
                self.callbacks.enqueue(LifecycleCallbackInfo::connected(id));
            }
        }
        Ok(())
    }

    /// Take the elements waiting for an instance
    pub fn take_upgrade_candidates(&mut self) -> Vec<UpgradeCandidate> {
        self.registry.take_upgrade_candidates()
    }

    /// Take queued lifecycle callbacks in the order they were queued
    pub fn take_lifecycle_callbacks(&mut self) -> Vec<LifecycleCallbackInfo> {
        self.callbacks.drain()
    }

    pub fn has_pending_callbacks(&self) -> bool {
        !self.callbacks.is_empty()
    }

    fn is_custom(&self, id: NodeId) -> bool {
        self.tree.tag_name(id).is_some_and(|name| self.registry.is_defined(name))
    }

    fn enqueue_for_subtree(&mut self, root: NodeId, make: fn(NodeId) -> LifecycleCallbackInfo) {
        for id in self.tree.shadow_including_subtree(root) {
            if self.is_custom(id) {
                self.callbacks.enqueue(make(id));
            }
        }
    }

    fn enqueue_attribute_changed(
        &mut self,
        element: NodeId,
        name: &str,
        old: Option<String>,
        new: Option<String>,
    ) {
        let observed = self
            .tree
            .tag_name(element)
            .and_then(|tag| self.registry.get(tag))
            .is_some_and(|def| def.observes(name));
        if observed {
            let connected = self.tree.is_connected(element);
            self.callbacks
                .enqueue(LifecycleCallbackInfo::attribute_changed(element, name, old, new, connected));
        }
    }

    // ------------------------------------------------------------------
    // Mutation observers
    // ------------------------------------------------------------------

    pub fn create_observer(&mut self) -> ObserverId {
        self.observers.create()
    }

    pub fn observe(
        &mut self,
        observer: ObserverId,
        target: NodeId,
        options: MutationObserverInit,
    ) -> Result<(), DomError> {
        self.tree.get(target).ok_or(DomError::NodeNotFound(target))?;
        self.observers
            .get_mut(observer)
            .ok_or(DomError::UnknownObserver(observer))?
            .observe(target, options);
        Ok(())
    }

    /// Stop observing everything and drop pending records
    pub fn disconnect_observer(&mut self, observer: ObserverId) {
        if let Some(obs) = self.observers.get_mut(observer) {
            obs.disconnect();
        }
    }

    /// Disconnect and forget an observer
    pub fn remove_observer(&mut self, observer: ObserverId) {
        self.observers.remove(observer);
    }

    pub fn is_observing(&self, observer: ObserverId, target: NodeId) -> bool {
        self.observers
            .get(observer)
            .is_some_and(|obs| obs.is_observing(target))
    }

    /// Take the batch of records queued for an observer
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .get_mut(observer)
            .map(|obs| obs.take_records())
            .unwrap_or_default()
    }

    fn record(&mut self, record: MutationRecord) {
        self.observers.notify(&self.tree, &record);
    }

    fn siblings(&self, node: NodeId) -> (NodeId, NodeId) {
        self.tree
            .get(node)
            .map_or((NodeId::NONE, NodeId::NONE), |n| (n.prev_sibling, n.next_sibling))
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn add_event_listener(
        &mut self,
        target: EventTarget,
        event_type: &str,
        handler: EventHandler,
        options: ListenerOptions,
    ) -> bool {
        self.listeners.add(target, event_type, handler, options)
    }

    pub fn remove_event_listener(
        &mut self,
        target: EventTarget,
        event_type: &str,
        handler: &EventHandler,
        options: ListenerOptions,
    ) -> bool {
        self.listeners.remove(target, event_type, handler, options)
    }

    /// Invoke the listeners of `event.target`; returns how many ran
    pub fn dispatch_event(&mut self, event: &Event) -> usize {
        let handlers = self.listeners.take_matching(event);
        tracing::trace!(event = %event.event_type, target = ?event.target, listeners = handlers.len(), "dispatching event");
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub fn listener_count(&self, target: EventTarget, event_type: &str) -> usize {
        self.listeners.count(target, event_type)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
