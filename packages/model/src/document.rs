//! # Document
//!
//! The node store: an arena mapping node id to node data, plus the
//! annotation index derived from it. All cross-node relationships are
//! id- or path-based, so there are no object cycles to manage.
//!
//! Property mutation goes through [`Document::apply`], which executes a
//! [`PropertyOp`] and returns its exact inverse. Transactional logging
//! and atomicity live one layer up, in the editor crate; fragment
//! ("snippet") documents are built with these methods directly.

use crate::annotations::AnnotationIndex;
use crate::errors::ModelError;
use crate::node::Node;
use crate::schema::Schema;
use crate::text::{byte_offset, char_len};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Id of the one container a snippet document carries.
pub const SNIPPET_ID: &str = "snippet";

/// Id of the text node synthesized from single-line plain text.
pub const TEXT_SNIPPET_ID: &str = "text-snippet";

/// A structural edit on one property value.
///
/// `Insert`/`Delete` splice sequence-valued properties (text by char
/// offset, id-lists by element); `Set` rewrites a scalar, which is how
/// annotation offsets and paths are adjusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PropertyOp {
    #[serde(rename_all = "camelCase")]
    Insert { offset: usize, value: Value },
    #[serde(rename_all = "camelCase")]
    Delete { offset: usize, length: usize },
    #[serde(rename_all = "camelCase")]
    Set { value: Value },
}

/// Id-addressed node store with its annotation index.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    schema: Arc<Schema>,
    nodes: HashMap<String, Node>,
    annotations: AnnotationIndex,
    uid_count: u64,
}

impl Document {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            nodes: HashMap::new(),
            annotations: AnnotationIndex::default(),
            uid_count: 0,
        }
    }

    /// A disposable fragment document holding the one snippet container.
    /// Used to carry content being copied or pasted.
    pub fn snippet(schema: Arc<Schema>) -> Result<Self, ModelError> {
        let mut doc = Self::new(schema);
        doc.create(Node::new(SNIPPET_ID, "container").with_attr("nodes", Value::Array(vec![])))?;
        Ok(doc)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn schema_handle(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: &str) -> Result<&Node, ModelError> {
        self.nodes
            .get(id)
            .ok_or_else(|| ModelError::NodeNotFound(id.to_string()))
    }

    /// Resolve a `[nodeId, property]` path to its current value.
    pub fn get_value(&self, path: &[String]) -> Result<Value, ModelError> {
        let (node_id, property) = split_path(path)?;
        let node = self.get(node_id)?;
        node.attr(property)
            .cloned()
            .ok_or_else(|| ModelError::PropertyNotFound(path.join(".")))
    }

    /// Resolve a path that must hold text.
    pub fn get_text(&self, path: &[String]) -> Result<String, ModelError> {
        match self.get_value(path)? {
            Value::String(s) => Ok(s),
            _ => Err(ModelError::NotText(path.join("."))),
        }
    }

    pub fn annotation_index(&self) -> &AnnotationIndex {
        &self.annotations
    }

    /// Mint a type-prefixed id guaranteed not to collide with any node
    /// currently in this document.
    pub fn fresh_id(&mut self, node_type: &str) -> String {
        loop {
            self.uid_count += 1;
            let id = format!("{}-{}", node_type, self.uid_count);
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    /// Insert a node. Annotation-typed nodes are validated against their
    /// target path and indexed on the way in.
    pub fn create(&mut self, node: Node) -> Result<Node, ModelError> {
        if node.id.is_empty() {
            return Err(ModelError::InvalidStructure(
                "node id must not be empty".to_string(),
            ));
        }
        if !self.schema.contains(&node.node_type) {
            return Err(ModelError::UnknownType(node.node_type.clone()));
        }
        if self.nodes.contains_key(&node.id) {
            return Err(ModelError::DuplicateId(node.id.clone()));
        }
        if self.schema.is_annotation(&node.node_type) {
            let path = node.anno_path().ok_or_else(|| {
                ModelError::InvalidStructure(format!("annotation {} has no path", node.id))
            })?;
            let (start, end) = match (node.start_offset(), node.end_offset()) {
                (Some(s), Some(e)) => (s, e),
                _ => {
                    return Err(ModelError::InvalidStructure(format!(
                        "annotation {} has no offsets",
                        node.id
                    )))
                }
            };
            let len = char_len(&self.get_text(&path)?);
            if start > end || end > len {
                return Err(ModelError::OutOfRange { offset: end, len });
            }
            self.annotations.insert(&path, &node.id);
        }
        self.nodes.insert(node.id.clone(), node.clone());
        Ok(node)
    }

    /// Remove a node and cascade: every annotation anchored on it goes
    /// too. Returns the removed nodes, dependents first, so a logged
    /// inverse can re-create them in reverse order.
    pub fn delete(&mut self, id: &str) -> Result<Vec<Node>, ModelError> {
        if !self.nodes.contains_key(id) {
            return Err(ModelError::NodeNotFound(id.to_string()));
        }
        let mut removed = Vec::new();
        for anno_id in self.annotations.by_node(id) {
            if anno_id == id {
                continue;
            }
            if let Some(anno) = self.nodes.remove(&anno_id) {
                if let Some(path) = anno.anno_path() {
                    self.annotations.remove(&path, &anno_id);
                }
                removed.push(anno);
            }
        }
        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| ModelError::NodeNotFound(id.to_string()))?;
        if let Some(path) = node.anno_path() {
            if self.schema.is_annotation(&node.node_type) {
                self.annotations.remove(&path, id);
            }
        }
        removed.push(node);
        Ok(removed)
    }

    /// Execute a property op, returning the op that undoes it.
    pub fn apply(&mut self, path: &[String], op: &PropertyOp) -> Result<PropertyOp, ModelError> {
        let (node_id, property) = split_path(path)?;
        let is_anno_path_move = property == "path"
            && self
                .nodes
                .get(node_id)
                .map(|n| self.schema.is_annotation(&n.node_type))
                .unwrap_or(false);
        let old_anno_path = if is_anno_path_move {
            self.nodes.get(node_id).and_then(Node::anno_path)
        } else {
            None
        };

        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| ModelError::NodeNotFound(node_id.to_string()))?;
        let value = node
            .attrs
            .get_mut(property)
            .ok_or_else(|| ModelError::PropertyNotFound(path.join(".")))?;

        let inverse = apply_to_value(value, op)?;

        if let Some(old_path) = old_anno_path {
            let new_path = self
                .nodes
                .get(node_id)
                .and_then(Node::anno_path)
                .unwrap_or_default();
            self.annotations.remove(&old_path, node_id);
            self.annotations.insert(&new_path, node_id);
        }
        Ok(inverse)
    }

    // Container operations. A container is a node whose type declares a
    // children property holding the ordered id sequence.

    /// The children property of a container node, or `NotAContainer`.
    pub fn container_property(&self, container_id: &str) -> Result<String, ModelError> {
        let node = self.get(container_id)?;
        self.schema
            .children_property(&node.node_type)
            .map(str::to_string)
            .ok_or_else(|| ModelError::NotAContainer(container_id.to_string()))
    }

    /// Position of a node in a container's ordered sequence.
    pub fn position(&self, container_id: &str, node_id: &str) -> Result<Option<usize>, ModelError> {
        let property = self.container_property(container_id)?;
        let ids = self
            .get(container_id)?
            .child_ids(&property)
            .unwrap_or_default();
        Ok(ids.iter().position(|id| id == node_id))
    }

    /// Ordered node ids of a container.
    pub fn container_nodes(&self, container_id: &str) -> Result<Vec<String>, ModelError> {
        let property = self.container_property(container_id)?;
        Ok(self
            .get(container_id)?
            .child_ids(&property)
            .unwrap_or_default())
    }

    /// Insert a node id into a container's sequence. Out-of-range
    /// positions clamp to `[0, len]`; omitted position appends.
    pub fn show(
        &mut self,
        container_id: &str,
        node_id: &str,
        position: Option<usize>,
    ) -> Result<usize, ModelError> {
        if !self.contains(node_id) {
            return Err(ModelError::NodeNotFound(node_id.to_string()));
        }
        let property = self.container_property(container_id)?;
        let len = self
            .get(container_id)?
            .child_ids(&property)
            .unwrap_or_default()
            .len();
        let at = position.unwrap_or(len).min(len);
        let path = vec![container_id.to_string(), property];
        self.apply(
            &path,
            &PropertyOp::Insert {
                offset: at,
                value: Value::Array(vec![Value::String(node_id.to_string())]),
            },
        )?;
        Ok(at)
    }

    /// Remove a node id from a container's sequence. The node itself
    /// stays in the store.
    pub fn hide(&mut self, container_id: &str, node_id: &str) -> Result<(), ModelError> {
        let property = self.container_property(container_id)?;
        let ids = self
            .get(container_id)?
            .child_ids(&property)
            .unwrap_or_default();
        let at = ids
            .iter()
            .position(|id| id == node_id)
            .ok_or_else(|| ModelError::NodeNotFound(node_id.to_string()))?;
        let path = vec![container_id.to_string(), property];
        self.apply(&path, &PropertyOp::Delete { offset: at, length: 1 })?;
        Ok(())
    }
}

fn split_path(path: &[String]) -> Result<(&str, &str), ModelError> {
    match path {
        [node_id, property] => Ok((node_id, property)),
        _ => Err(ModelError::PropertyNotFound(path.join("."))),
    }
}

fn apply_to_value(value: &mut Value, op: &PropertyOp) -> Result<PropertyOp, ModelError> {
    match (value, op) {
        (Value::String(s), PropertyOp::Insert { offset, value }) => {
            let ins = value.as_str().ok_or_else(|| {
                ModelError::InvalidStructure("text insert requires a string value".to_string())
            })?;
            let at = byte_offset(s, *offset).ok_or(ModelError::OutOfRange {
                offset: *offset,
                len: char_len(s),
            })?;
            s.insert_str(at, ins);
            Ok(PropertyOp::Delete {
                offset: *offset,
                length: char_len(ins),
            })
        }
        (Value::String(s), PropertyOp::Delete { offset, length }) => {
            let len = char_len(s);
            if offset + length > len {
                return Err(ModelError::OutOfRange {
                    offset: offset + length,
                    len,
                });
            }
            // both offsets are in range, checked above
            let from = byte_offset(s, *offset).unwrap_or(s.len());
            let to = byte_offset(s, offset + length).unwrap_or(s.len());
            let removed = s[from..to].to_string();
            s.replace_range(from..to, "");
            Ok(PropertyOp::Insert {
                offset: *offset,
                value: Value::String(removed),
            })
        }
        (Value::Array(items), PropertyOp::Insert { offset, value }) => {
            if *offset > items.len() {
                return Err(ModelError::OutOfRange {
                    offset: *offset,
                    len: items.len(),
                });
            }
            let inserted = match value {
                Value::Array(vs) => vs.clone(),
                other => vec![other.clone()],
            };
            let count = inserted.len();
            for (i, v) in inserted.into_iter().enumerate() {
                items.insert(offset + i, v);
            }
            Ok(PropertyOp::Delete {
                offset: *offset,
                length: count,
            })
        }
        (Value::Array(items), PropertyOp::Delete { offset, length }) => {
            if offset + length > items.len() {
                return Err(ModelError::OutOfRange {
                    offset: offset + length,
                    len: items.len(),
                });
            }
            let removed: Vec<Value> = items.drain(*offset..offset + length).collect();
            Ok(PropertyOp::Insert {
                offset: *offset,
                value: Value::Array(removed),
            })
        }
        (value, PropertyOp::Set { value: new }) => {
            let prev = value.clone();
            *value = new.clone();
            Ok(PropertyOp::Set { value: prev })
        }
        _ => Err(ModelError::InvalidStructure(
            "sequence op on a scalar property".to_string(),
        )),
    }
}
