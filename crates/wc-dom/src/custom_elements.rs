//! Custom Elements
//!
//! Custom element registry and the lifecycle callback queue the document
//! fills as defined elements are upgraded, connected, disconnected or have
//! an observed attribute changed.

use std::collections::HashMap;

use crate::NodeId;

/// Definitions by name plus elements waiting to be upgraded
#[derive(Debug, Default)]
pub struct CustomElementRegistry {
    definitions: HashMap<String, CustomElementDefinition>,
    /// Elements created with a defined name and not yet upgraded
    upgrade_candidates: Vec<UpgradeCandidate>,
}

/// A defined name and the attributes it observes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomElementDefinition {
    pub name: String,
    /// Observed attribute names, as declared
    pub observed_attributes: Vec<String>,
}

impl CustomElementDefinition {
    pub fn observes(&self, attribute: &str) -> bool {
        self.observed_attributes.iter().any(|a| a == attribute)
    }
}

/// Element waiting to be upgraded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeCandidate {
    pub node_id: NodeId,
    pub name: String,
}

/// Callback kinds the host delivers to components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCallback {
    Connected,
    Disconnected,
    AttributeChanged,
}

/// One queued callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleCallbackInfo {
    pub callback: LifecycleCallback,
    pub element_id: NodeId,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    /// Whether the element was connected when the callback was queued
    pub connected: bool,
}

impl LifecycleCallbackInfo {
    pub fn connected(element_id: NodeId) -> Self {
        Self {
            callback: LifecycleCallback::Connected,
            element_id,
            attribute_name: None,
            old_value: None,
            new_value: None,
            connected: true,
        }
    }

    pub fn disconnected(element_id: NodeId) -> Self {
        Self {
            callback: LifecycleCallback::Disconnected,
            element_id,
            attribute_name: None,
            old_value: None,
            new_value: None,
            connected: false,
        }
    }

    /// `connected` is the element's state at the time of the change
    pub fn attribute_changed(
        element_id: NodeId,
        name: &str,
        old_value: Option<String>,
        new_value: Option<String>,
        connected: bool,
    ) -> Self {
        Self {
            callback: LifecycleCallback::AttributeChanged,
            element_id,
            attribute_name: Some(name.to_string()),
            old_value,
            new_value,
            connected,
        }
    }
}

/// Pending callback queue for batch processing
#[derive(Debug, Default)]
pub struct CallbackQueue {
    callbacks: Vec<LifecycleCallbackInfo>,
}

impl CallbackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, info: LifecycleCallbackInfo) {
        self.callbacks.push(info);
    }

    pub fn drain(&mut self) -> Vec<LifecycleCallbackInfo> {
        std::mem::take(&mut self.callbacks)
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }
}

impl CustomElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`; fails on invalid or duplicate names
    pub fn define(
        &mut self,
        name: &str,
        observed_attributes: &[&str],
    ) -> Result<(), CustomElementError> {
        if !Self::is_valid_name(name) {
            return Err(CustomElementError::InvalidName(name.to_string()));
        }
        if self.definitions.contains_key(name) {
            return Err(CustomElementError::AlreadyDefined(name.to_string()));
        }

        let definition = CustomElementDefinition {
            name: name.to_string(),
            observed_attributes: observed_attributes.iter().map(|a| a.to_string()).collect(),
        };
        tracing::debug!(name, observed = ?definition.observed_attributes, "defined custom element");
        self.definitions.insert(name.to_string(), definition);
        Ok(())
    }

    /// Definition registered for `name`
    pub fn get(&self, name: &str) -> Option<&CustomElementDefinition> {
        self.definitions.get(name)
    }

    /// Whether `name` has a definition
    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Observed attributes of a definition; empty if undefined
    pub fn observed_attributes(&self, name: &str) -> &[String] {
        self.get(name)
            .map(|d| d.observed_attributes.as_slice())
            .unwrap_or_default()
    }

    /// Add an upgrade candidate
    pub fn add_upgrade_candidate(&mut self, node_id: NodeId, name: &str) {
        self.upgrade_candidates.push(UpgradeCandidate {
            node_id,
            name: name.to_string(),
        });
    }

    /// Take every pending upgrade candidate
    pub fn take_upgrade_candidates(&mut self) -> Vec<UpgradeCandidate> {
        std::mem::take(&mut self.upgrade_candidates)
    }

    /// Valid custom element name: lowercase start, a hyphen, not reserved
    pub fn is_valid_name(name: &str) -> bool {
        // Must contain hyphen
        if !name.contains('-') {
            return false;
        }

        // Must start with lowercase letter
        if !name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
            return false;
        }

        const RESERVED: &[&str] = &[
            "annotation-xml", "color-profile", "font-face",
            "font-face-src", "font-face-uri", "font-face-format",
            "font-face-name", "missing-glyph",
        ];
        if RESERVED.contains(&name) {
            return false;
        }

        name.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_' || c == '.')
    }
}

/// Custom element errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustomElementError {
    #[error("Invalid custom element name: {0}")]
    InvalidName(String),
    #[error("Custom element already defined: {0}")]
    AlreadyDefined(String),
}
