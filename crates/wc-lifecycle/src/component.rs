//! Component traits
//!
//! A component declares which attributes it reacts to through
//! [`Reactive::reaction`], a lookup keyed by the camelCase property name.
//! Attributes without an entry are simply not interesting to the component.

use crate::{BoxError, ElementScope, LifecycleError};

/// Reaction to an attribute change: `(component, scope, current, previous)`
pub type Reaction<E> =
    fn(&mut E, &mut ElementScope<'_>, Option<&str>, Option<&str>) -> Result<(), BoxError>;

/// Typed reaction table of a component
///
/// ```ignore
/// impl Reactive for ImageInfo {
///     fn reaction(property: &str) -> Option<Reaction<Self>> {
///         match property {
///             "date" => Some(Self::date_changed as Reaction<Self>),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Reactive: Sized {
    /// Reaction registered for a camelCase property name
    fn reaction(property: &str) -> Option<Reaction<Self>>;
}

/// A custom element implementation
pub trait CustomElement: Reactive + 'static {
    /// Attributes the host reports changes for
    const OBSERVED_ATTRIBUTES: &'static [&'static str];

    /// Property aliases applied when assigning data fields, `(alias, property)`
    const ALIASES: &'static [(&'static str, &'static str)] = &[];

    /// Construct a fresh instance; runs on upgrade
    fn create() -> Self;

    /// Element was connected to the document
    fn connected(&mut self, scope: &mut ElementScope<'_>) -> Result<(), LifecycleError> {
        scope.on_attach(self)
    }

    /// Element was disconnected from the document
    fn disconnected(&mut self, scope: &mut ElementScope<'_>) -> Result<(), LifecycleError> {
        scope.on_detach();
        Ok(())
    }

    /// An observed attribute changed
    fn attribute_changed(
        &mut self,
        scope: &mut ElementScope<'_>,
        name: &str,
        previous: Option<&str>,
        current: Option<&str>,
    ) -> Result<(), LifecycleError> {
        scope.on_attribute_changed(self, name, previous, current)
    }
}
