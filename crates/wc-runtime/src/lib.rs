//! wc Runtime - host for custom elements
//!
//! [`Host`] owns the document, the lifecycle context and the translator.
//! Every DOM operation it exposes is followed by a flush that upgrades
//! new elements, delivers lifecycle callbacks to component instances and
//! lets the translator catch up, the way a browser would between tasks.

mod error;
mod hooks;
mod host;

pub use error::HostError;
pub use hooks::ElementHooks;
pub use host::Host;
