//! # Annotation Index
//!
//! Secondary index from a text-bearing path to the set of annotations
//! anchored on it. Maintained by the document on create/delete and on
//! annotation path moves; supports range queries per path and per node.

use std::collections::{BTreeSet, HashMap};

/// `(nodeId, property) -> annotation ids`, ordered for determinism.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationIndex {
    by_path: HashMap<(String, String), BTreeSet<String>>,
}

impl AnnotationIndex {
    /// All annotation ids anchored on the given `[nodeId, property]` path.
    pub fn get(&self, path: &[String]) -> Vec<String> {
        if path.len() != 2 {
            return Vec::new();
        }
        self.by_path
            .get(&(path[0].clone(), path[1].clone()))
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// All annotation ids anchored anywhere on the given node.
    pub fn by_node(&self, node_id: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .by_path
            .iter()
            .filter(|((nid, _), _)| nid == node_id)
            .flat_map(|(_, set)| set.iter().cloned())
            .collect();
        ids.sort();
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.values().all(|set| set.is_empty())
    }

    pub(crate) fn insert(&mut self, path: &[String], anno_id: &str) {
        if path.len() != 2 {
            return;
        }
        self.by_path
            .entry((path[0].clone(), path[1].clone()))
            .or_default()
            .insert(anno_id.to_string());
    }

    pub(crate) fn remove(&mut self, path: &[String], anno_id: &str) {
        if path.len() != 2 {
            return;
        }
        let key = (path[0].clone(), path[1].clone());
        if let Some(set) = self.by_path.get_mut(&key) {
            set.remove(anno_id);
            if set.is_empty() {
                self.by_path.remove(&key);
            }
        }
    }
}
