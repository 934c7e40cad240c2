//! NodeIterator
//!
//! Sequential pre-order traversal bounded by a root. The iterator keeps
//! only a reference node and borrows the tree per step, so callers may
//! mutate the tree between steps the way `document.createNodeIterator`
//! allows.

use crate::{DomTree, NodeData, NodeId};

/// What types of nodes to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhatToShow(u32);

impl WhatToShow {
    pub const ALL: WhatToShow = WhatToShow(0xFFFFFFFF);
    pub const ELEMENT: WhatToShow = WhatToShow(0x1);
    pub const TEXT: WhatToShow = WhatToShow(0x4);
    pub const COMMENT: WhatToShow = WhatToShow(0x80);
    pub const DOCUMENT: WhatToShow = WhatToShow(0x100);
    pub const DOCUMENT_FRAGMENT: WhatToShow = WhatToShow(0x400);

    /// Check if a node type is shown
    pub fn includes(self, node_type: NodeType) -> bool {
        let flag = match node_type {
            NodeType::Element => Self::ELEMENT.0,
            NodeType::Text => Self::TEXT.0,
            NodeType::Comment => Self::COMMENT.0,
            NodeType::Document => Self::DOCUMENT.0,
            NodeType::DocumentFragment => Self::DOCUMENT_FRAGMENT.0,
        };
        (self.0 & flag) != 0
    }

    /// Union of two WhatToShow filters
    pub fn or(self, other: WhatToShow) -> WhatToShow {
        WhatToShow(self.0 | other.0)
    }
}

impl Default for WhatToShow {
    fn default() -> Self {
        Self::ALL
    }
}

/// Node type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
    Comment,
    Document,
    /// Shadow roots report as document fragments
    DocumentFragment,
}

impl NodeType {
    pub fn of(data: &NodeData) -> Self {
        match data {
            NodeData::Document => NodeType::Document,
            NodeData::Element(_) => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
            NodeData::Comment(_) => NodeType::Comment,
            NodeData::ShadowRoot(_) => NodeType::DocumentFragment,
        }
    }
}

/// NodeIterator for sequential traversal
#[derive(Debug, Clone)]
pub struct NodeIterator {
    /// The root node of iteration
    pub root: NodeId,
    /// What types of nodes to show
    pub what_to_show: WhatToShow,
    /// Last node handed out, NONE before the first step
    reference_node: NodeId,
}

impl NodeIterator {
    /// Create a new NodeIterator
    pub fn new(root: NodeId, what_to_show: WhatToShow) -> Self {
        Self {
            root,
            what_to_show,
            reference_node: NodeId::NONE,
        }
    }

    /// Get reference node
    pub fn reference_node(&self) -> NodeId {
        self.reference_node
    }

    /// Next shown node in pre-order, staying inside `root`. Shadow trees
    /// are not entered.
    pub fn next_node(&mut self, tree: &DomTree) -> Option<NodeId> {
        loop {
            let candidate = if self.reference_node.is_valid() {
                self.following(tree, self.reference_node)?
            } else {
                tree.get(self.root)?;
                self.root
            };
            self.reference_node = candidate;

            let node = tree.get(candidate)?;
            if self.what_to_show.includes(NodeType::of(&node.data)) {
                return Some(candidate);
            }
        }
    }

    /// Pre-order successor of `id` within `root`
    fn following(&self, tree: &DomTree, id: NodeId) -> Option<NodeId> {
        let node = tree.get(id)?;
        if node.first_child.is_valid() {
            return Some(node.first_child);
        }
        let mut current = id;
        while current != self.root {
            let node = tree.get(current)?;
            if node.next_sibling.is_valid() {
                return Some(node.next_sibling);
            }
            current = node.parent;
            if !current.is_valid() {
                return None;
            }
        }
        None
    }
}
