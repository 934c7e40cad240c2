//! Lifecycle context and element scope

use std::collections::BTreeMap;
use std::fmt;

use wc_dom::{Document, EventHandler, EventTarget, ListenerOptions, NodeId};

use crate::case::to_camel_case;
use crate::{LifecycleError, Reactive};

/// Callback run once when its owner is disconnected
pub type Teardown = Box<dyn FnOnce(&mut Document)>;

/// Handle of a listener or teardown registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(u64);

/// Attribute change recorded while the element was not connected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    pub element: NodeId,
    pub name: String,
    pub previous: Option<String>,
    pub current: Option<String>,
}

struct Registration {
    owner: NodeId,
    teardown: Teardown,
}

/// Pending attribute changes and teardown registrations of one document
#[derive(Default)]
pub struct Lifecycle {
    /// In the order the changes happened
    pending: Vec<PendingChange>,
    /// Ordered by id, which is registration order
    registrations: BTreeMap<RegistrationId, Registration>,
    next_id: u64,
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("pending", &self.pending)
            .field("registrations", &self.registrations.len())
            .finish()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a teardown callback for `owner`
    pub fn add_teardown(
        &mut self,
        owner: NodeId,
        teardown: impl FnOnce(&mut Document) + 'static,
    ) -> RegistrationId {
        let id = RegistrationId(self.next_id);
        self.next_id += 1;
        self.registrations.insert(
            id,
            Registration {
                owner,
                teardown: Box::new(teardown),
            },
        );
        id
    }

    /// Add an event listener whose removal is registered for `owner`. The
    /// teardown removes it with the arguments it was added with.
    pub fn add_listener(
        &mut self,
        document: &mut Document,
        owner: NodeId,
        target: EventTarget,
        event_type: &str,
        handler: EventHandler,
        options: ListenerOptions,
    ) -> RegistrationId {
        document.add_event_listener(target, event_type, handler.clone(), options);
        let event_type = event_type.to_string();
        tracing::trace!(%owner, ?target, event = %event_type, "safe listener added");
        self.add_teardown(owner, move |doc| {
            doc.remove_event_listener(target, &event_type, &handler, options);
        })
    }

    /// Run and forget a registration. Unknown or already removed ids are
    /// ignored; returns whether anything ran.
    pub fn remove(&mut self, document: &mut Document, id: RegistrationId) -> bool {
        match self.registrations.remove(&id) {
            Some(registration) => {
                (registration.teardown)(document);
                true
            }
            None => false,
        }
    }

    /// Run every registration owned by `element` or anything in its
    /// shadow-including subtree, then drop its pending changes. Returns the
    /// number of teardowns run.
    pub fn detach(&mut self, document: &mut Document, element: NodeId) -> usize {
        let owners = document.tree().shadow_including_subtree(element);
        let ids: Vec<RegistrationId> = self
            .registrations
            .iter()
            .filter(|(_, r)| owners.contains(&r.owner))
            .map(|(id, _)| *id)
            .collect();

        let mut ran = 0;
        for id in ids {
            if self.remove(document, id) {
                ran += 1;
            }
        }
        self.pending.retain(|change| change.element != element);
        if ran > 0 {
            tracing::debug!(%element, teardowns = ran, "element detached");
        }
        ran
    }

    /// Queue a change for delivery at the next attach
    pub fn defer(&mut self, change: PendingChange) {
        tracing::trace!(element = %change.element, attribute = %change.name, "deferred attribute change");
        self.pending.push(change);
    }

    /// Pending changes of an element, oldest first
    pub fn pending_for(&self, element: NodeId) -> impl Iterator<Item = &PendingChange> {
        self.pending.iter().filter(move |c| c.element == element)
    }

    /// Remove and return every pending change of `element`, oldest first
    fn take_pending(&mut self, element: NodeId) -> Vec<PendingChange> {
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|c| c.element == element);
        self.pending = kept;
        taken
    }

    /// Put changes back ahead of everything still queued
    fn requeue_front(&mut self, changes: impl IntoIterator<Item = PendingChange>) {
        self.pending.splice(0..0, changes);
    }

    /// Number of registrations owned by `owner`
    pub fn registrations_of(&self, owner: NodeId) -> usize {
        self.registrations.values().filter(|r| r.owner == owner).count()
    }

    /// Total number of live registrations
    pub fn registration_count(&self) -> usize {
        self.registrations.len()
    }
}

/// The document, the lifecycle context and the element a hook runs for
pub struct ElementScope<'a> {
    pub document: &'a mut Document,
    pub lifecycle: &'a mut Lifecycle,
    element: NodeId,
    /// Connection state captured when a queued change happened
    connected_at_change: Option<bool>,
}

impl<'a> ElementScope<'a> {
    pub fn new(document: &'a mut Document, lifecycle: &'a mut Lifecycle, element: NodeId) -> Self {
        Self {
            document,
            lifecycle,
            element,
            connected_at_change: None,
        }
    }

    /// Judge attribute changes by the connection state the element had
    /// when they happened instead of its current one. Used when delivering
    /// callbacks that were queued before later mutations.
    pub fn with_connection_at_change(mut self, connected: bool) -> Self {
        self.connected_at_change = Some(connected);
        self
    }

    pub fn element(&self) -> NodeId {
        self.element
    }

    pub fn is_connected(&self) -> bool {
        self.document.is_connected(self.element)
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.document.get_attribute(self.element, name)
    }

    /// Parent node, if any
    pub fn parent(&self) -> Option<NodeId> {
        let parent = self.document.tree().parent(self.element);
        parent.is_valid().then_some(parent)
    }

    /// Replay the changes deferred while the element was not connected,
    /// in the order they happened. Each change is replayed once, even if a
    /// reaction detaches the element again. Stops at the first failing
    /// reaction and leaves the changes after it queued.
    pub fn on_attach<E: Reactive>(&mut self, component: &mut E) -> Result<(), LifecycleError> {
        let mut changes = self.lifecycle.take_pending(self.element).into_iter();
        while let Some(change) = changes.next() {
            let replayed = self.react(
                component,
                &change.name,
                change.previous.as_deref(),
                change.current.as_deref(),
            );
            if let Err(err) = replayed {
                self.lifecycle.requeue_front(changes);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Tear down everything registered for this element and its subtree
    pub fn on_detach(&mut self) -> usize {
        self.lifecycle.detach(self.document, self.element)
    }

    /// React to an attribute change, or defer it while disconnected
    pub fn on_attribute_changed<E: Reactive>(
        &mut self,
        component: &mut E,
        name: &str,
        previous: Option<&str>,
        current: Option<&str>,
    ) -> Result<(), LifecycleError> {
        if previous == current {
            return Ok(());
        }
        let connected = self.connected_at_change.unwrap_or_else(|| self.is_connected());
        if !connected {
            self.lifecycle.defer(PendingChange {
                element: self.element,
                name: name.to_string(),
                previous: previous.map(str::to_string),
                current: current.map(str::to_string),
            });
            return Ok(());
        }
        self.react(component, name, previous, current)
    }

    /// Run the reaction registered for `name`, if any
    fn react<E: Reactive>(
        &mut self,
        component: &mut E,
        name: &str,
        previous: Option<&str>,
        current: Option<&str>,
    ) -> Result<(), LifecycleError> {
        if previous == current {
            return Ok(());
        }
        let property = to_camel_case(name);
        let Some(reaction) = E::reaction(&property) else {
            return Ok(());
        };
        tracing::trace!(element = %self.element, %property, "attribute reaction");
        reaction(component, self, current, previous).map_err(|source| LifecycleError::Reaction {
            element: self.element,
            attribute: name.to_string(),
            source,
        })
    }

    /// Add a listener that is removed when this element is disconnected
    pub fn safe_event_listener(
        &mut self,
        target: EventTarget,
        event_type: &str,
        handler: EventHandler,
        options: ListenerOptions,
    ) -> RegistrationId {
        self.lifecycle
            .add_listener(self.document, self.element, target, event_type, handler, options)
    }

    /// Run `teardown` when this element is disconnected
    pub fn add_teardown(&mut self, teardown: impl FnOnce(&mut Document) + 'static) -> RegistrationId {
        self.lifecycle.add_teardown(self.element, teardown)
    }

    /// Run a registration now instead of at disconnect
    pub fn remove(&mut self, id: RegistrationId) -> bool {
        self.lifecycle.remove(self.document, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use crate::{BoxError, Reaction};
    use wc_dom::Event;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(Option<String>, Option<String>)>,
    }

    impl Recorder {
        fn foo_bar_changed(
            &mut self,
            _scope: &mut ElementScope<'_>,
            current: Option<&str>,
            previous: Option<&str>,
        ) -> Result<(), BoxError> {
            self.calls.push((current.map(String::from), previous.map(String::from)));
            Ok(())
        }

        fn dismissed_changed(
            &mut self,
            scope: &mut ElementScope<'_>,
            _current: Option<&str>,
            _previous: Option<&str>,
        ) -> Result<(), BoxError> {
            let element = scope.element();
            scope.document.remove(element)?;
            Ok(())
        }

        fn fails(
            &mut self,
            _scope: &mut ElementScope<'_>,
            _current: Option<&str>,
            _previous: Option<&str>,
        ) -> Result<(), BoxError> {
            Err("broken".into())
        }
    }

    impl Reactive for Recorder {
        fn reaction(property: &str) -> Option<Reaction<Self>> {
            match property {
                "fooBar" => Some(Self::foo_bar_changed as Reaction<Self>),
                "dismissed" => Some(Self::dismissed_changed as Reaction<Self>),
                "broken" => Some(Self::fails as Reaction<Self>),
                _ => None,
            }
        }
    }

    #[test]
    fn test_change_before_attach_is_replayed_once() {
        let mut doc = Document::new();
        let mut lifecycle = Lifecycle::new();
        let el = doc.create_element("foo-element");
        let mut recorder = Recorder::default();

        ElementScope::new(&mut doc, &mut lifecycle, el)
            .on_attribute_changed(&mut recorder, "foo-bar", None, Some("x"))
            .unwrap();
        assert!(recorder.calls.is_empty());
        assert_eq!(lifecycle.pending_for(el).count(), 1);

        let body = doc.body();
        doc.append_child(body, el).unwrap();
        let mut scope = ElementScope::new(&mut doc, &mut lifecycle, el);
        scope.on_attach(&mut recorder).unwrap();
        scope.on_attach(&mut recorder).unwrap();
        assert_eq!(recorder.calls, vec![(Some("x".to_string()), None)]);
    }

    #[test]
    fn test_replay_keeps_recorded_order() {
        let mut doc = Document::new();
        let mut lifecycle = Lifecycle::new();
        let el = doc.create_element("foo-element");
        let mut recorder = Recorder::default();

        let mut scope = ElementScope::new(&mut doc, &mut lifecycle, el);
        scope.on_attribute_changed(&mut recorder, "foo-bar", None, Some("x")).unwrap();
        scope.on_attribute_changed(&mut recorder, "foo-bar", Some("x"), Some("y")).unwrap();

        let body = doc.body();
        doc.append_child(body, el).unwrap();
        ElementScope::new(&mut doc, &mut lifecycle, el)
            .on_attach(&mut recorder)
            .unwrap();
        assert_eq!(
            recorder.calls,
            vec![
                (Some("x".to_string()), None),
                (Some("y".to_string()), Some("x".to_string())),
            ]
        );
    }

    #[test]
    fn test_reaction_detaching_its_element_ends_replay() {
        let mut doc = Document::new();
        let mut lifecycle = Lifecycle::new();
        let el = doc.create_element("foo-element");
        let mut recorder = Recorder::default();

        let mut scope = ElementScope::new(&mut doc, &mut lifecycle, el);
        scope.on_attribute_changed(&mut recorder, "dismissed", None, Some("1")).unwrap();
        scope.on_attribute_changed(&mut recorder, "foo-bar", None, Some("x")).unwrap();

        let body = doc.body();
        doc.append_child(body, el).unwrap();
        ElementScope::new(&mut doc, &mut lifecycle, el)
            .on_attach(&mut recorder)
            .unwrap();

        assert!(!doc.is_connected(el));
        assert_eq!(recorder.calls, vec![(Some("x".to_string()), None)]);
        assert_eq!(lifecycle.pending_for(el).count(), 0);
    }

    #[test]
    fn test_connection_at_change_wins_over_current_state() {
        let mut doc = Document::new();
        let mut lifecycle = Lifecycle::new();
        let el = doc.create_element("foo-element");
        let mut recorder = Recorder::default();

        // Changed while connected, delivered after removal
        ElementScope::new(&mut doc, &mut lifecycle, el)
            .with_connection_at_change(true)
            .on_attribute_changed(&mut recorder, "foo-bar", None, Some("x"))
            .unwrap();
        assert_eq!(recorder.calls.len(), 1);
        assert_eq!(lifecycle.pending_for(el).count(), 0);

        // Changed while detached, delivered after attach
        let body = doc.body();
        doc.append_child(body, el).unwrap();
        ElementScope::new(&mut doc, &mut lifecycle, el)
            .with_connection_at_change(false)
            .on_attribute_changed(&mut recorder, "foo-bar", Some("x"), Some("y"))
            .unwrap();
        assert_eq!(recorder.calls.len(), 1);
        assert_eq!(lifecycle.pending_for(el).count(), 1);
    }

    #[test]
    fn test_equal_values_are_ignored() {
        let mut doc = Document::new();
        let mut lifecycle = Lifecycle::new();
        let el = doc.create_element("foo-element");
        let body = doc.body();
        doc.append_child(body, el).unwrap();
        let mut recorder = Recorder::default();

        let mut scope = ElementScope::new(&mut doc, &mut lifecycle, el);
        scope.on_attribute_changed(&mut recorder, "foo-bar", Some("a"), Some("a")).unwrap();
        scope.on_attribute_changed(&mut recorder, "foo_bar", Some("a"), Some("b")).unwrap();
        scope.on_attribute_changed(&mut recorder, "unknown", None, Some("b")).unwrap();
        assert_eq!(recorder.calls.len(), 1);
    }

    #[test]
    fn test_reaction_error_stops_replay() {
        let mut doc = Document::new();
        let mut lifecycle = Lifecycle::new();
        let el = doc.create_element("foo-element");
        let mut recorder = Recorder::default();

        let mut scope = ElementScope::new(&mut doc, &mut lifecycle, el);
        scope.on_attribute_changed(&mut recorder, "broken", None, Some("1")).unwrap();
        scope.on_attribute_changed(&mut recorder, "foo-bar", None, Some("x")).unwrap();

        let body = doc.body();
        doc.append_child(body, el).unwrap();
        let mut scope = ElementScope::new(&mut doc, &mut lifecycle, el);
        let err = scope.on_attach(&mut recorder).unwrap_err();
        assert!(matches!(err, LifecycleError::Reaction { ref attribute, .. } if attribute == "broken"));
        assert!(recorder.calls.is_empty());
        assert_eq!(lifecycle.pending_for(el).count(), 1);
    }

    #[test]
    fn test_teardown_runs_once() {
        let mut doc = Document::new();
        let mut lifecycle = Lifecycle::new();
        let el = doc.create_element("foo-element");
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);

        let mut scope = ElementScope::new(&mut doc, &mut lifecycle, el);
        scope.add_teardown(move |_| counter.set(counter.get() + 1));
        assert_eq!(scope.on_detach(), 1);
        assert_eq!(scope.on_detach(), 0);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut doc = Document::new();
        let mut lifecycle = Lifecycle::new();
        let el = doc.create_element("foo-element");
        let hits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&hits);
        let handler: EventHandler = Rc::new(move |_| seen.set(seen.get() + 1));

        let mut scope = ElementScope::new(&mut doc, &mut lifecycle, el);
        let id = scope.safe_event_listener(EventTarget::Window, "keyup", handler, ListenerOptions::default());
        scope.document.dispatch_event(&Event::new("keyup", EventTarget::Window));
        assert!(scope.remove(id));
        assert!(!scope.remove(id));
        scope.document.dispatch_event(&Event::new("keyup", EventTarget::Window));
        assert_eq!(hits.get(), 1);
        assert_eq!(lifecycle.registration_count(), 0);
    }

    #[test]
    fn test_detach_covers_descendant_owners() {
        let mut doc = Document::new();
        let mut lifecycle = Lifecycle::new();
        let host = doc.create_element("div");
        let child = doc.create_element("button");
        doc.append_child(host, child).unwrap();
        let unrelated = doc.create_element("span");

        let order = Rc::new(RefCell::new(Vec::new()));
        for (owner, label) in [(child, "child"), (unrelated, "unrelated"), (host, "host")] {
            let order = Rc::clone(&order);
            lifecycle.add_teardown(owner, move |_| order.borrow_mut().push(label));
        }

        assert_eq!(lifecycle.detach(&mut doc, host), 2);
        assert_eq!(*order.borrow(), vec!["child", "host"]);
        assert_eq!(lifecycle.registrations_of(unrelated), 1);
    }
}
