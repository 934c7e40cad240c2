//! Shadow DOM
//!
//! A shadow root is an ordinary container node whose `parent` is NONE and
//! which remembers its host. Anything that walks `parent` links therefore
//! stops at the shadow boundary, the same way platform mutation observers do.

/// Shadow root mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowRootMode {
    #[default]
    Open,
    Closed,
}

/// Shadow root initialization options
#[derive(Debug, Clone, Copy, Default)]
pub struct ShadowRootInit {
    pub mode: ShadowRootMode,
}

impl ShadowRootInit {
    pub fn open() -> Self {
        Self {
            mode: ShadowRootMode::Open,
        }
    }

    pub fn closed() -> Self {
        Self {
            mode: ShadowRootMode::Closed,
        }
    }
}

/// Elements allowed to host a shadow root
const SHADOW_HOSTS: &[&str] = &[
    "article", "aside", "blockquote", "body", "div", "footer", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "main", "nav", "p", "section", "span",
];

/// Whether an element with this (lowercased) name may attach a shadow root:
/// valid custom element names and the fixed list of built-ins.
pub fn can_host_shadow(name: &str) -> bool {
    SHADOW_HOSTS.contains(&name) || crate::CustomElementRegistry::is_valid_name(name)
}
