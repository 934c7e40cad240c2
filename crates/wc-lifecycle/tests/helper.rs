//! Lifecycle helper tests driven straight from a document's callback queue

use std::cell::Cell;
use std::rc::Rc;

use wc_dom::{Document, Event, EventHandler, EventTarget, LifecycleCallback, ListenerOptions, NodeId};
use wc_lifecycle::{
    copy_observed_attributes, BoxError, CustomElement, ElementScope, Lifecycle, Reaction, Reactive,
};

/// Counts its reactions on the parent's `test-set` attribute
struct HelperTest;

impl HelperTest {
    fn strawberry_banana_changed(
        &mut self,
        scope: &mut ElementScope<'_>,
        _current: Option<&str>,
        _previous: Option<&str>,
    ) -> Result<(), BoxError> {
        let parent = scope.parent().ok_or("reaction ran without a parent")?;
        let calls: u32 = scope
            .document
            .get_attribute(parent, "test-set")
            .map_or(Ok(0), str::parse)?;
        scope.document.set_attribute(parent, "test-set", &(calls + 1).to_string())?;
        Ok(())
    }
}

impl Reactive for HelperTest {
    fn reaction(property: &str) -> Option<Reaction<Self>> {
        match property {
            "strawberryBanana" => Some(Self::strawberry_banana_changed as Reaction<Self>),
            _ => None,
        }
    }
}

impl CustomElement for HelperTest {
    const OBSERVED_ATTRIBUTES: &'static [&'static str] = &["chocolate", "strawberry-banana", "kiwi-lime"];

    fn create() -> Self {
        HelperTest
    }
}

/// Deliver queued callbacks to the single component instance
fn pump(doc: &mut Document, lifecycle: &mut Lifecycle, component: &mut HelperTest) {
    while doc.has_pending_callbacks() {
        for info in doc.take_lifecycle_callbacks() {
            let mut scope = ElementScope::new(doc, lifecycle, info.element_id)
                .with_connection_at_change(info.connected);
            match info.callback {
                LifecycleCallback::Connected => component.connected(&mut scope).unwrap(),
                LifecycleCallback::Disconnected => component.disconnected(&mut scope).unwrap(),
                LifecycleCallback::AttributeChanged => component
                    .attribute_changed(
                        &mut scope,
                        info.attribute_name.as_deref().unwrap_or_default(),
                        info.old_value.as_deref(),
                        info.new_value.as_deref(),
                    )
                    .unwrap(),
            }
        }
    }
}

fn setup() -> (Document, Lifecycle, HelperTest, NodeId, NodeId) {
    let mut doc = Document::new();
    doc.define("helper-test", HelperTest::OBSERVED_ATTRIBUTES).unwrap();
    let mut lifecycle = Lifecycle::new();
    let mut component = HelperTest::create();

    let container = doc.create_element("section");
    let body = doc.body();
    doc.append_child(body, container).unwrap();

    let test = doc.create_element("helper-test");
    doc.take_upgrade_candidates();
    doc.set_attribute(test, "chocolate", "yes").unwrap();
    doc.set_attribute(test, "strawberry-banana", "no").unwrap();
    doc.set_attribute(test, "other-attr", "yes").unwrap();
    doc.append_child(container, test).unwrap();
    pump(&mut doc, &mut lifecycle, &mut component);

    (doc, lifecycle, component, container, test)
}

#[test]
fn test_reaction_deferred_until_attached() {
    let (mut doc, mut lifecycle, mut component, container, test) = setup();
    assert_eq!(doc.get_attribute(container, "test-set"), Some("1"));

    doc.set_attribute(test, "strawberry-banana", "again").unwrap();
    pump(&mut doc, &mut lifecycle, &mut component);
    assert_eq!(doc.get_attribute(container, "test-set"), Some("2"));
}

#[test]
fn test_every_detached_change_replayed_on_reattach() {
    let (mut doc, mut lifecycle, mut component, container, test) = setup();
    doc.remove(test).unwrap();
    pump(&mut doc, &mut lifecycle, &mut component);

    doc.set_attribute(test, "strawberry-banana", "a").unwrap();
    doc.set_attribute(test, "strawberry-banana", "b").unwrap();
    pump(&mut doc, &mut lifecycle, &mut component);
    assert_eq!(doc.get_attribute(container, "test-set"), Some("1"));
    assert_eq!(lifecycle.pending_for(test).count(), 2);

    doc.append_child(container, test).unwrap();
    pump(&mut doc, &mut lifecycle, &mut component);
    assert_eq!(doc.get_attribute(container, "test-set"), Some("3"));
    assert_eq!(lifecycle.pending_for(test).count(), 0);
}

#[test]
fn test_no_reaction_for_non_change() {
    let (mut doc, mut lifecycle, mut component, container, test) = setup();
    doc.set_attribute(test, "strawberry-banana", "no").unwrap();
    pump(&mut doc, &mut lifecycle, &mut component);
    assert_eq!(doc.get_attribute(container, "test-set"), Some("1"));
}

#[test]
fn test_listeners_cleared_on_removal() {
    let (mut doc, mut lifecycle, mut component, _container, test) = setup();
    let button = doc.create_element("button");
    doc.append_child(test, button).unwrap();

    let hits = Rc::new(Cell::new(0));
    let seen = Rc::clone(&hits);
    let handler: EventHandler = Rc::new(move |_| seen.set(seen.get() + 1));
    lifecycle.add_listener(&mut doc, button, button.into(), "click", handler, ListenerOptions::default());

    doc.dispatch_event(&Event::new("click", button.into()));
    assert_eq!(hits.get(), 1);

    doc.remove(test).unwrap();
    pump(&mut doc, &mut lifecycle, &mut component);
    doc.dispatch_event(&Event::new("click", button.into()));
    assert_eq!(hits.get(), 1);
    assert_eq!(lifecycle.registration_count(), 0);
}

#[test]
fn test_copy_observed_attributes_by_default() {
    let (mut doc, _, _, _, test) = setup();
    let div = doc.create_element("div");

    assert_eq!(copy_observed_attributes(&mut doc, test, div, None).unwrap(), 2);
    assert_eq!(doc.get_attribute(div, "chocolate"), Some("yes"));
    assert_eq!(doc.get_attribute(div, "strawberry-banana"), Some("no"));
    assert!(!doc.has_attribute(div, "kiwi-lime"));
    assert!(!doc.has_attribute(div, "other-attr"));
}

#[test]
fn test_copy_named_attributes_regardless_of_case() {
    let (mut doc, _, _, _, test) = setup();
    let div = doc.create_element("div");

    copy_observed_attributes(&mut doc, test, div, Some(&["Chocolate", "KIWI_LIME", "otherAttr"])).unwrap();
    assert_eq!(doc.get_attribute(div, "chocolate"), Some("yes"));
    assert!(!doc.has_attribute(div, "strawberry-banana"));
    assert!(!doc.has_attribute(div, "kiwi-lime"));
    assert_eq!(doc.get_attribute(div, "other-attr"), Some("yes"));
}

#[test]
fn test_window_listener_owned_by_element() {
    let (mut doc, mut lifecycle, mut component, _container, test) = setup();
    let hits = Rc::new(Cell::new(0));
    let seen = Rc::clone(&hits);
    let handler: EventHandler = Rc::new(move |_| seen.set(seen.get() + 1));
    ElementScope::new(&mut doc, &mut lifecycle, test).safe_event_listener(
        EventTarget::Window,
        "hashchange",
        handler,
        ListenerOptions::default(),
    );

    doc.remove(test).unwrap();
    pump(&mut doc, &mut lifecycle, &mut component);
    doc.dispatch_event(&Event::new("hashchange", EventTarget::Window));
    assert_eq!(hits.get(), 0);
}
