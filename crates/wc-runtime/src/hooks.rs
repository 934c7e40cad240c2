//! Object-safe view of a component

use std::any::Any;

use wc_lifecycle::{CustomElement, ElementScope, LifecycleError};

/// Lifecycle hooks of a component instance, as the host stores it
pub trait ElementHooks: Any {
    fn connected(&mut self, scope: &mut ElementScope<'_>) -> Result<(), LifecycleError>;

    fn disconnected(&mut self, scope: &mut ElementScope<'_>) -> Result<(), LifecycleError>;

    fn attribute_changed(
        &mut self,
        scope: &mut ElementScope<'_>,
        name: &str,
        previous: Option<&str>,
        current: Option<&str>,
    ) -> Result<(), LifecycleError>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<E: CustomElement> ElementHooks for E {
    fn connected(&mut self, scope: &mut ElementScope<'_>) -> Result<(), LifecycleError> {
        CustomElement::connected(self, scope)
    }

    fn disconnected(&mut self, scope: &mut ElementScope<'_>) -> Result<(), LifecycleError> {
        CustomElement::disconnected(self, scope)
    }

    fn attribute_changed(
        &mut self,
        scope: &mut ElementScope<'_>,
        name: &str,
        previous: Option<&str>,
        current: Option<&str>,
    ) -> Result<(), LifecycleError> {
        CustomElement::attribute_changed(self, scope, name, previous, current)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
