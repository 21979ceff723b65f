//! # Transaction
//!
//! A scoped, atomic batch of mutations against a document.
//!
//! [`Transact::transact`] clones the document into a working copy, runs
//! the closure against a [`Transaction`] wrapping that copy, and commits
//! the copy back only on success. A failed transform therefore leaves
//! the document exactly as it was; partial mutation is unrepresentable.
//!
//! Every mutation is recorded in the transaction's op log (see
//! [`crate::ops`]) so the committed [`Change`] can be undone and redone.

use crate::errors::EditorError;
use crate::ops::{Change, DocumentOp};
use inkstone_model::{
    AnnotationIndex, Document, ModelError, Node, PropertyOp, Schema, Selection,
};
use serde_json::Value;

/// Transaction-scoped view of a document: reads see uncommitted writes.
#[derive(Debug)]
pub struct Transaction {
    doc: Document,
    ops: Vec<DocumentOp>,
    before: Selection,
}

impl Transaction {
    fn new(doc: Document, before: Selection) -> Self {
        Self {
            doc,
            ops: Vec::new(),
            before,
        }
    }

    pub fn schema(&self) -> &Schema {
        self.doc.schema()
    }

    pub fn schema_handle(&self) -> std::sync::Arc<Schema> {
        self.doc.schema_handle()
    }

    /// Selection snapshot the transaction was opened with.
    pub fn before(&self) -> &Selection {
        &self.before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.doc.contains(id)
    }

    pub fn get(&self, id: &str) -> Result<&Node, ModelError> {
        self.doc.get(id)
    }

    pub fn get_value(&self, path: &[String]) -> Result<Value, ModelError> {
        self.doc.get_value(path)
    }

    pub fn get_text(&self, path: &[String]) -> Result<String, ModelError> {
        self.doc.get_text(path)
    }

    pub fn annotation_index(&self) -> &AnnotationIndex {
        self.doc.annotation_index()
    }

    pub fn fresh_id(&mut self, node_type: &str) -> String {
        self.doc.fresh_id(node_type)
    }

    /// An empty sibling document sharing this document's schema, for
    /// fragment construction.
    pub fn new_instance(&self) -> Document {
        Document::new(self.doc.schema_handle())
    }

    /// Selection factory bound to this transaction's document: checks
    /// that the referenced nodes resolve.
    pub fn create_selection(&self, selection: Selection) -> Result<Selection, ModelError> {
        match &selection {
            Selection::Null => {}
            Selection::Property { path, .. } => {
                self.require_node(path.first())?;
            }
            Selection::Container {
                container_id,
                start_path,
                end_path,
                ..
            } => {
                self.doc.get(container_id)?;
                self.require_node(start_path.first())?;
                self.require_node(end_path.first())?;
            }
            Selection::Node {
                container_id,
                node_id,
                ..
            } => {
                self.doc.get(container_id)?;
                self.doc.get(node_id)?;
            }
        }
        Ok(selection)
    }

    fn require_node(&self, id: Option<&String>) -> Result<(), ModelError> {
        match id {
            Some(id) => self.doc.get(id).map(|_| ()),
            None => Err(ModelError::InvalidStructure(
                "selection path is empty".to_string(),
            )),
        }
    }

    // Mutations. Each records an op with its inverse.

    pub fn create(&mut self, node: Node) -> Result<Node, ModelError> {
        let node = self.doc.create(node)?;
        self.ops.push(DocumentOp::Create { node: node.clone() });
        Ok(node)
    }

    pub fn update(&mut self, path: &[String], op: PropertyOp) -> Result<(), ModelError> {
        let inverse = self.doc.apply(path, &op)?;
        self.ops.push(DocumentOp::Update {
            path: path.to_vec(),
            op,
            inverse,
        });
        Ok(())
    }

    /// Delete a node; annotations anchored on it cascade, each logged as
    /// its own delete so undo re-creates them after the node.
    pub fn delete(&mut self, id: &str) -> Result<(), ModelError> {
        let removed = self.doc.delete(id)?;
        for node in removed {
            self.ops.push(DocumentOp::Delete { node });
        }
        Ok(())
    }

    /// Replay a recorded op, used by undo/redo to walk a [`Change`]'s
    /// op log forwards or backwards.
    pub fn apply_op(&mut self, op: &DocumentOp) -> Result<(), ModelError> {
        match op {
            DocumentOp::Create { node } => self.create(node.clone()).map(|_| ()),
            DocumentOp::Delete { node } => self.delete(&node.id),
            DocumentOp::Update { path, op, .. } => self.update(path, op.clone()),
        }
    }

    pub fn position(&self, container_id: &str, node_id: &str) -> Result<Option<usize>, ModelError> {
        self.doc.position(container_id, node_id)
    }

    pub fn container_nodes(&self, container_id: &str) -> Result<Vec<String>, ModelError> {
        self.doc.container_nodes(container_id)
    }

    /// Insert a node id into a container's ordered sequence, clamping
    /// out-of-range positions. Returns the actual index.
    pub fn show(
        &mut self,
        container_id: &str,
        node_id: &str,
        position: Option<usize>,
    ) -> Result<usize, ModelError> {
        let at = self.doc.show(container_id, node_id, position)?;
        // re-record through the op log: Document::show already applied
        // the splice, so recover its inverse from the current state
        let property = self.doc.container_property(container_id)?;
        self.ops.push(DocumentOp::Update {
            path: vec![container_id.to_string(), property],
            op: PropertyOp::Insert {
                offset: at,
                value: Value::Array(vec![Value::String(node_id.to_string())]),
            },
            inverse: PropertyOp::Delete { offset: at, length: 1 },
        });
        Ok(at)
    }

    pub fn hide(&mut self, container_id: &str, node_id: &str) -> Result<(), ModelError> {
        let at = self
            .doc
            .position(container_id, node_id)?
            .ok_or_else(|| ModelError::NodeNotFound(node_id.to_string()))?;
        let property = self.doc.container_property(container_id)?;
        self.update(
            &[container_id.to_string(), property],
            PropertyOp::Delete { offset: at, length: 1 },
        )
    }
}

/// Scoped-transaction entry point for documents.
pub trait Transact {
    /// Run `f` against a working copy; commit on `Ok`, discard on `Err`.
    /// The returned [`Change`] carries the op log and the before/after
    /// selections (`after` falls back to `before` when the transform
    /// reports "not handled").
    fn transact<F>(
        &mut self,
        before: Selection,
        f: F,
    ) -> Result<(Option<Selection>, Change), EditorError>
    where
        F: FnOnce(&mut Transaction) -> Result<Option<Selection>, EditorError>;
}

impl Transact for Document {
    fn transact<F>(
        &mut self,
        before: Selection,
        f: F,
    ) -> Result<(Option<Selection>, Change), EditorError>
    where
        F: FnOnce(&mut Transaction) -> Result<Option<Selection>, EditorError>,
    {
        let mut tx = Transaction::new(self.clone(), before.clone());
        let result = f(&mut tx)?;
        let Transaction { doc, ops, .. } = tx;
        *self = doc;
        let after = result.clone().unwrap_or_else(|| before.clone());
        Ok((result, Change { ops, before, after }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkstone_model::{text_path, Schema};
    use serde_json::json;
    use std::sync::Arc;

    fn doc() -> Document {
        let mut doc = Document::new(Arc::new(Schema::prose()));
        doc.create(Node::new("body", "container").with_attr("nodes", json!([])))
            .unwrap();
        doc.create(Node::text("p1", "paragraph", "Hello")).unwrap();
        doc.show("body", "p1", None).unwrap();
        doc
    }

    #[test]
    fn test_commit_on_ok() {
        let mut doc = doc();
        let (sel, change) = doc
            .transact(Selection::Null, |tx| {
                tx.update(
                    &text_path("p1"),
                    PropertyOp::Insert {
                        offset: 5,
                        value: json!(" world"),
                    },
                )?;
                Ok(Some(Selection::cursor(text_path("p1"), 11)))
            })
            .unwrap();

        assert_eq!(doc.get_text(&text_path("p1")).unwrap(), "Hello world");
        assert_eq!(sel, Some(Selection::cursor(text_path("p1"), 11)));
        assert_eq!(change.ops.len(), 1);
        assert_eq!(change.after, Selection::cursor(text_path("p1"), 11));
    }

    #[test]
    fn test_abort_leaves_document_untouched() {
        let mut doc = doc();
        let snapshot = doc.clone();

        let result = doc.transact(Selection::Null, |tx| {
            tx.create(Node::text("p2", "paragraph", "partial"))?;
            // out-of-range update aborts the whole transaction
            tx.update(
                &text_path("p1"),
                PropertyOp::Delete { offset: 0, length: 99 },
            )?;
            Ok(None)
        });

        assert!(result.is_err());
        assert_eq!(doc, snapshot);
        assert!(!doc.contains("p2"));
    }

    #[test]
    fn test_reads_see_uncommitted_writes() {
        let mut doc = doc();
        doc.transact(Selection::Null, |tx| {
            tx.create(Node::text("p2", "paragraph", "new"))?;
            assert!(tx.contains("p2"));
            assert_eq!(tx.get_text(&text_path("p2"))?, "new");
            Ok(None)
        })
        .unwrap();
    }

    #[test]
    fn test_delete_cascade_is_logged_per_node() {
        let mut doc = doc();
        doc.create(Node::annotation("s1", "strong", text_path("p1"), 0, 2))
            .unwrap();

        let (_, change) = doc
            .transact(Selection::Null, |tx| {
                tx.hide("body", "p1")?;
                tx.delete("p1")?;
                Ok(None)
            })
            .unwrap();

        let deletes: Vec<&str> = change
            .ops
            .iter()
            .filter_map(|op| match op {
                DocumentOp::Delete { node } => Some(node.id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(deletes, vec!["s1", "p1"]);
    }

    #[test]
    fn test_create_selection_validates_ids() {
        let mut doc = doc();
        doc.transact(Selection::Null, |tx| {
            assert!(tx
                .create_selection(Selection::cursor(text_path("p1"), 0))
                .is_ok());
            assert!(tx
                .create_selection(Selection::cursor(text_path("ghost"), 0))
                .is_err());
            Ok(None)
        })
        .unwrap();
    }
}
