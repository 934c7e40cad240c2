//! wc Lifecycle - custom element helper
//!
//! Components call into an [`ElementScope`] from their lifecycle hooks.
//! The scope defers attribute reactions until the element is connected,
//! dispatches them through a typed reaction table, and tears down listeners
//! and callbacks registered for the element when it is disconnected.

mod attributes;
pub mod case;
mod component;
mod error;
mod lifecycle;

pub use attributes::{apply_fields, copy_observed_attributes};
pub use component::{CustomElement, Reaction, Reactive};
pub use error::{BoxError, LifecycleError};
pub use lifecycle::{ElementScope, Lifecycle, PendingChange, RegistrationId, Teardown};
