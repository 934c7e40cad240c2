//! Mutation Observers
//!
//! Observers hold (target, options) registrations and a batch of pending
//! records. `Document` feeds records in; the owner drains them with
//! `take_records`, which stands in for the platform's microtask delivery.

use std::collections::HashMap;

use crate::{DomTree, NodeId};

/// Handle to an observer owned by a `Document`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u32);

/// What an observer registration reports
#[derive(Debug, Clone, Default)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub character_data: bool,
    pub subtree: bool,
    pub attribute_old_value: bool,
    pub character_data_old_value: bool,
    pub attribute_filter: Option<Vec<String>>,
}

/// Mutation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub previous_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    CharacterData,
    ChildList,
}

impl MutationRecord {
    pub fn child_list(target: NodeId, added_nodes: Vec<NodeId>, removed_nodes: Vec<NodeId>) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes,
            removed_nodes,
            previous_sibling: None,
            next_sibling: None,
            attribute_name: None,
            old_value: None,
        }
    }

    pub fn attributes(target: NodeId, name: &str, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            previous_sibling: None,
            next_sibling: None,
            attribute_name: Some(name.to_string()),
            old_value,
        }
    }

    pub fn character_data(target: NodeId, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::CharacterData,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            previous_sibling: None,
            next_sibling: None,
            attribute_name: None,
            old_value,
        }
    }

    pub fn with_siblings(mut self, previous: NodeId, next: NodeId) -> Self {
        self.previous_sibling = previous.is_valid().then_some(previous);
        self.next_sibling = next.is_valid().then_some(next);
        self
    }
}

/// Mutation observer
#[derive(Debug, Default)]
pub struct MutationObserver {
    observed: Vec<(NodeId, MutationObserverInit)>,
    records: Vec<MutationRecord>,
}

impl MutationObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe `target`; observing the same node again replaces its options
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) {
        match self.observed.iter_mut().find(|(node, _)| *node == target) {
            Some(entry) => entry.1 = options,
            None => self.observed.push((target, options)),
        }
    }

    pub fn disconnect(&mut self) {
        self.observed.clear();
        self.records.clear();
    }

    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn push_record(&mut self, record: MutationRecord) {
        self.records.push(record);
    }

    pub fn is_observing(&self, target: NodeId) -> bool {
        self.observed.iter().any(|(node, _)| *node == target)
    }

    /// Options of the first registration that covers `record`
    fn interest(&self, tree: &DomTree, record: &MutationRecord) -> Option<&MutationObserverInit> {
        self.observed.iter().find_map(|(node, options)| {
            let in_scope = *node == record.target
                || (options.subtree && tree.is_inclusive_ancestor(*node, record.target));
            if !in_scope {
                return None;
            }
            let wanted = match record.mutation_type {
                MutationType::ChildList => options.child_list,
                MutationType::CharacterData => options.character_data,
                MutationType::Attributes => {
                    options.attributes
                        && match (&options.attribute_filter, &record.attribute_name) {
                            (Some(filter), Some(name)) => filter.iter().any(|f| f == name),
                            _ => true,
                        }
                }
            };
            wanted.then_some(options)
        })
    }
}

/// All observers of one document
#[derive(Debug, Default)]
pub struct Observers {
    observers: HashMap<ObserverId, MutationObserver>,
    next_id: u32,
}

impl Observers {
    pub fn create(&mut self) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.insert(id, MutationObserver::new());
        id
    }

    pub fn get(&self, id: ObserverId) -> Option<&MutationObserver> {
        self.observers.get(&id)
    }

    pub fn get_mut(&mut self, id: ObserverId) -> Option<&mut MutationObserver> {
        self.observers.get_mut(&id)
    }

    pub fn remove(&mut self, id: ObserverId) -> Option<MutationObserver> {
        self.observers.remove(&id)
    }

    /// Queue `record` on every observer whose registrations cover it
    pub fn notify(&mut self, tree: &DomTree, record: &MutationRecord) {
        for observer in self.observers.values_mut() {
            let Some(options) = observer.interest(tree, record) else {
                continue;
            };
            let keep_old = match record.mutation_type {
                MutationType::Attributes => options.attribute_old_value,
                MutationType::CharacterData => options.character_data_old_value,
                MutationType::ChildList => false,
            };
            let mut queued = record.clone();
            if !keep_old {
                queued.old_value = None;
            }
            observer.push_record(queued);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watch_all() -> MutationObserverInit {
        MutationObserverInit {
            child_list: true,
            attributes: true,
            subtree: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_observe_and_disconnect() {
        let mut observer = MutationObserver::new();
        observer.observe(NodeId(1), watch_all());
        observer.observe(NodeId(1), watch_all());
        assert_eq!(observer.observed.len(), 1);

        observer.disconnect();
        assert!(observer.observed.is_empty());
    }

    #[test]
    fn test_attribute_filter_and_old_value() {
        let tree = DomTree::new();
        let mut observers = Observers::default();
        let id = observers.create();
        observers.get_mut(id).unwrap().observe(
            tree.root(),
            MutationObserverInit {
                attributes: true,
                attribute_filter: Some(vec!["title".into()]),
                ..Default::default()
            },
        );

        observers.notify(&tree, &MutationRecord::attributes(tree.root(), "lang", None));
        observers.notify(
            &tree,
            &MutationRecord::attributes(tree.root(), "title", Some("old".into())),
        );

        let records = observers.get_mut(id).unwrap().take_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].attribute_name.as_deref(), Some("title"));
        assert_eq!(records[0].old_value, None);
    }

    #[test]
    fn test_without_subtree_only_target_is_seen() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        tree.append_child(tree.root(), div);

        let mut observers = Observers::default();
        let id = observers.create();
        observers.get_mut(id).unwrap().observe(
            tree.root(),
            MutationObserverInit {
                attributes: true,
                ..Default::default()
            },
        );

        observers.notify(&tree, &MutationRecord::attributes(div, "title", None));
        assert!(observers.get_mut(id).unwrap().take_records().is_empty());
    }
}
