//! wc DOM - Document Object Model
//!
//! Arena-backed DOM with the pieces web components lean on: shadow roots,
//! custom element definitions with a lifecycle callback queue, mutation
//! observers, event listeners and a node iterator.

mod custom_elements;
mod document;
mod events;
mod html;
mod node;
mod observer;
mod shadow;
mod tree;
mod tree_walker;

use std::fmt;

pub use custom_elements::{
    CallbackQueue, CustomElementDefinition, CustomElementError, CustomElementRegistry,
    LifecycleCallback, LifecycleCallbackInfo, UpgradeCandidate,
};
pub use document::{Document, Navigator};
pub use events::{Event, EventHandler, EventListeners, EventTarget, ListenerOptions};
pub use node::{Attribute, ElementData, Node, NodeData, ShadowRootData};
pub use observer::{
    MutationObserver, MutationObserverInit, MutationRecord, MutationType, ObserverId, Observers,
};
pub use shadow::{ShadowRootInit, ShadowRootMode, can_host_shadow};
pub use tree::{Children, DomTree};
pub use tree_walker::{NodeIterator, NodeType, WhatToShow};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Invalid/null node ID
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this is a valid node ID
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            f.write_str("#none")
        }
    }
}

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {0} cannot have children")]
    NotAContainer(NodeId),

    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Cannot insert {child} into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Element {0} already hosts a shadow root")]
    ShadowRootExists(NodeId),

    #[error("<{0}> cannot host a shadow root")]
    ShadowNotSupported(String),

    #[error("Unknown mutation observer {0:?}")]
    UnknownObserver(ObserverId),

    #[error(transparent)]
    CustomElement(#[from] CustomElementError),
}
