//! HTML fragments (innerHTML / outerHTML)
//!
//! Parsing goes through html5ever's RcDom and is converted into the arena
//! with the regular `Document` calls, so inserted custom elements get the
//! same upgrade and lifecycle treatment as hand-built ones.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::{Document, DomError, DomTree, NodeData, NodeId, ShadowRootMode};

/// Void elements (no end tag)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
];

/// Raw text elements (no escaping for content)
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

impl Document {
    /// Parse `html` and append the resulting nodes to `parent`.
    /// Returns the top-level nodes that were inserted.
    pub fn insert_html(&mut self, parent: NodeId, html: &str) -> Result<Vec<NodeId>, DomError> {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);

        // The parser wraps fragments in html/head/body; keep what it put
        // in head (style, template, ...) followed by the body content.
        let mut sections = Vec::new();
        for child in dom.document.children.borrow().iter() {
            if let RcNodeData::Element { name, .. } = &child.data {
                if name.local.as_ref() == "html" {
                    sections.extend(child.children.borrow().iter().cloned());
                }
            }
        }

        let mut inserted = Vec::new();
        for section in sections {
            for child in section.children.borrow().iter() {
                if let Some(id) = self.convert_node(child)? {
                    self.append_child(parent, id)?;
                    inserted.push(id);
                }
            }
        }
        tracing::trace!(%parent, nodes = inserted.len(), "inserted html");
        Ok(inserted)
    }

    /// Replace the children of `parent` with parsed `html`
    pub fn set_inner_html(&mut self, parent: NodeId, html: &str) -> Result<Vec<NodeId>, DomError> {
        let old: Vec<NodeId> = self.tree().children(parent).collect();
        for child in old {
            self.remove(child)?;
        }
        self.insert_html(parent, html)
    }

    /// Serialize the children of a node
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut output = String::new();
        serialize_children(self.tree(), node, false, &mut output);
        output
    }

    /// Serialize a node and its descendants
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut output = String::new();
        serialize_node(self.tree(), node, false, &mut output);
        output
    }

    /// Like `outer_html`, but open shadow roots are written as declarative
    /// `<template shadowrootmode="open">` children of their host.
    pub fn composed_html(&self, node: NodeId) -> String {
        let mut output = String::new();
        serialize_node(self.tree(), node, true, &mut output);
        output
    }

    /// Build a detached copy of an RcDom node
    fn convert_node(&mut self, handle: &Handle) -> Result<Option<NodeId>, DomError> {
        let id = match &handle.data {
            RcNodeData::Text { contents } => self.create_text(&contents.borrow()),
            RcNodeData::Comment { contents } => self.create_comment(contents),
            RcNodeData::Element {
                name,
                attrs,
                template_contents,
                ..
            } => {
                let id = self.create_element(&name.local);
                for attr in attrs.borrow().iter() {
                    self.set_attribute(id, &attr.name.local, &attr.value)?;
                }
                // Template content lives in a separate fragment
                let content = template_contents.borrow();
                let children = match content.as_ref() {
                    Some(fragment) => fragment.children.borrow().clone(),
                    None => handle.children.borrow().clone(),
                };
                for child in &children {
                    if let Some(child_id) = self.convert_node(child)? {
                        self.append_child(id, child_id)?;
                    }
                }
                id
            }
            RcNodeData::Document | RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => {
                return Ok(None);
            }
        };
        Ok(Some(id))
    }
}

fn serialize_node(tree: &DomTree, node_id: NodeId, composed: bool, output: &mut String) {
    let Some(node) = tree.get(node_id) else {
        return;
    };

    match &node.data {
        NodeData::Document | NodeData::ShadowRoot(_) => {
            serialize_children(tree, node_id, composed, output);
        }
        NodeData::Element(elem) => {
            let tag = elem.name.as_str();

            output.push('<');
            output.push_str(tag);
            for attr in &elem.attrs {
                output.push(' ');
                output.push_str(&attr.name);
                output.push_str("=\"");
                escape_attribute(&attr.value, output);
                output.push('"');
            }
            output.push('>');

            if VOID_ELEMENTS.contains(&tag) {
                return;
            }

            if composed {
                if let Some(shadow) = elem.shadow_root {
                    if let Some(data) = tree.get(shadow).and_then(|n| n.as_shadow_root()) {
                        if data.mode == ShadowRootMode::Open {
                            output.push_str("<template shadowrootmode=\"open\">");
                            serialize_children(tree, shadow, composed, output);
                            output.push_str("</template>");
                        }
                    }
                }
            }

            if RAW_TEXT_ELEMENTS.contains(&tag) {
                output.push_str(&tree.text_content(node_id));
            } else {
                serialize_children(tree, node_id, composed, output);
            }

            output.push_str("</");
            output.push_str(tag);
            output.push('>');
        }
        NodeData::Text(text) => {
            escape_text(text, output);
        }
        NodeData::Comment(text) => {
            output.push_str("<!--");
            output.push_str(text);
            output.push_str("-->");
        }
    }
}

fn serialize_children(tree: &DomTree, node_id: NodeId, composed: bool, output: &mut String) {
    for child in tree.children(node_id) {
        serialize_node(tree, child, composed, output);
    }
}

/// Escape text content
fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{00A0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value
fn escape_attribute(value: &str, output: &mut String) {
    for c in value.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '\u{00A0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}
