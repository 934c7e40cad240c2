//! DOM Events
//!
//! Listener bookkeeping and at-target dispatch. Handlers are shared
//! closures; removal matches on handler identity, event type and capture,
//! so a listener can only be removed with the arguments it was added with.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::NodeId;

/// Something listeners can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The global object (`languagechange`, `hashchange`, ...)
    Window,
    /// Any node, including the document node
    Node(NodeId),
}

impl From<NodeId> for EventTarget {
    fn from(id: NodeId) -> Self {
        EventTarget::Node(id)
    }
}

/// Event handler
pub type EventHandler = Rc<dyn Fn(&Event)>;

/// A dispatched event
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub event_type: String,
    pub target: EventTarget,
    /// Payload of custom events
    pub detail: Option<Value>,
}

impl Event {
    pub fn new(event_type: &str, target: EventTarget) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            detail: None,
        }
    }

    /// Custom event with a JSON payload
    pub fn custom(event_type: &str, target: EventTarget, detail: Value) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            detail: Some(detail),
        }
    }
}

/// Listener options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub once: bool,
}

impl ListenerOptions {
    pub fn once() -> Self {
        Self {
            capture: false,
            once: true,
        }
    }
}

struct Listener {
    event_type: String,
    handler: EventHandler,
    options: ListenerOptions,
}

impl Listener {
    fn matches(&self, event_type: &str, handler: &EventHandler, capture: bool) -> bool {
        self.event_type == event_type
            && Rc::ptr_eq(&self.handler, handler)
            && self.options.capture == capture
    }
}

/// Listener registry of one document
#[derive(Default)]
pub struct EventListeners {
    listeners: HashMap<EventTarget, Vec<Listener>>,
}

impl fmt::Debug for EventListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("targets", &self.listeners.len())
            .field("listeners", &self.len())
            .finish()
    }
}

impl EventListeners {
    /// Add a listener; returns false if an identical one already exists
    pub fn add(
        &mut self,
        target: EventTarget,
        event_type: &str,
        handler: EventHandler,
        options: ListenerOptions,
    ) -> bool {
        let list = self.listeners.entry(target).or_default();
        if list.iter().any(|l| l.matches(event_type, &handler, options.capture)) {
            return false;
        }
        list.push(Listener {
            event_type: event_type.to_string(),
            handler,
            options,
        });
        true
    }

    /// Remove a listener; returns false if none matched
    pub fn remove(
        &mut self,
        target: EventTarget,
        event_type: &str,
        handler: &EventHandler,
        options: ListenerOptions,
    ) -> bool {
        let Some(list) = self.listeners.get_mut(&target) else {
            return false;
        };
        let before = list.len();
        list.retain(|l| !l.matches(event_type, handler, options.capture));
        let removed = list.len() != before;
        if list.is_empty() {
            self.listeners.remove(&target);
        }
        removed
    }

    /// Handlers that should see `event`, in registration order. `once`
    /// listeners are removed as they are collected.
    pub fn take_matching(&mut self, event: &Event) -> Vec<EventHandler> {
        let Some(list) = self.listeners.get_mut(&event.target) else {
            return Vec::new();
        };
        let handlers = list
            .iter()
            .filter(|l| l.event_type == event.event_type)
            .map(|l| Rc::clone(&l.handler))
            .collect();
        list.retain(|l| !(l.options.once && l.event_type == event.event_type));
        if list.is_empty() {
            self.listeners.remove(&event.target);
        }
        handlers
    }

    /// Number of listeners on `target` for `event_type`
    pub fn count(&self, target: EventTarget, event_type: &str) -> usize {
        self.listeners
            .get(&target)
            .map_or(0, |list| list.iter().filter(|l| l.event_type == event_type).count())
    }

    /// Total number of listeners
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, EventHandler) {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let handler: EventHandler = Rc::new(move |_| seen.set(seen.get() + 1));
        (count, handler)
    }

    #[test]
    fn test_duplicate_listener_is_ignored() {
        let mut listeners = EventListeners::default();
        let (_, handler) = counter();
        let target = EventTarget::Node(NodeId(1));
        assert!(listeners.add(target, "click", Rc::clone(&handler), ListenerOptions::default()));
        assert!(!listeners.add(target, "click", Rc::clone(&handler), ListenerOptions::default()));
        assert_eq!(listeners.count(target, "click"), 1);
    }

    #[test]
    fn test_remove_needs_identical_arguments() {
        let mut listeners = EventListeners::default();
        let (_, handler) = counter();
        let (_, other) = counter();
        let target = EventTarget::Window;
        listeners.add(target, "keyup", Rc::clone(&handler), ListenerOptions::default());

        assert!(!listeners.remove(target, "keyup", &other, ListenerOptions::default()));
        assert!(!listeners.remove(target, "click", &handler, ListenerOptions::default()));
        let capture = ListenerOptions {
            capture: true,
            once: false,
        };
        assert!(!listeners.remove(target, "keyup", &handler, capture));
        assert!(listeners.remove(target, "keyup", &handler, ListenerOptions::default()));
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_once_listener_is_dropped_after_collection() {
        let mut listeners = EventListeners::default();
        let (_, handler) = counter();
        let target = EventTarget::Window;
        listeners.add(target, "load", handler, ListenerOptions::once());

        let event = Event::new("load", target);
        assert_eq!(listeners.take_matching(&event).len(), 1);
        assert_eq!(listeners.take_matching(&event).len(), 0);
    }
}
