//! Lifecycle errors

use wc_dom::{DomError, NodeId};

/// Error type reactions may return
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Lifecycle helper errors
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// A reaction returned an error; it is passed through untouched
    #[error("Reaction to `{attribute}` on element {element} failed")]
    Reaction {
        element: NodeId,
        attribute: String,
        #[source]
        source: BoxError,
    },

    #[error(transparent)]
    Dom(#[from] DomError),
}
