//! # Undo Stack
//!
//! Bounded history of committed [`Change`]s. Undo replays a change's
//! inverted ops (reverse order) through a fresh transaction and moves
//! the change onto the redo stack; redo replays the original ops and
//! moves it back. Recording a new change clears the redo stack.
//!
//! Replays run inside [`Transact::transact`], so a change that no
//! longer applies cleanly leaves the document untouched and the change
//! on its stack.

use crate::errors::EditorError;
use crate::ops::Change;
use crate::transaction::Transact;
use inkstone_model::{Document, Selection};

const DEFAULT_MAX_LEVELS: usize = 1000;

#[derive(Debug, Default)]
pub struct UndoStack {
    done: Vec<Change>,
    undone: Vec<Change>,
    max_levels: usize,
}

impl UndoStack {
    pub fn new(max_levels: usize) -> Self {
        Self {
            done: Vec::new(),
            undone: Vec::new(),
            max_levels,
        }
    }

    pub fn with_default_limit() -> Self {
        Self::new(DEFAULT_MAX_LEVELS)
    }

    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// Record a committed change. Empty changes are dropped, anything on
    /// the redo stack is invalidated, and the oldest entry falls off once
    /// the level cap is reached.
    pub fn record(&mut self, change: Change) {
        if change.is_empty() {
            return;
        }
        self.undone.clear();
        if self.max_levels > 0 && self.done.len() >= self.max_levels {
            self.done.remove(0);
        }
        self.done.push(change);
    }

    /// Revert the most recent change. Returns the selection to restore,
    /// or `None` when there is nothing to undo.
    pub fn undo(&mut self, doc: &mut Document) -> Result<Option<Selection>, EditorError> {
        let Some(change) = self.done.pop() else {
            return Ok(None);
        };
        let replay = doc.transact(change.after.clone(), |tx| {
            for op in change.inverted_ops() {
                tx.apply_op(&op)?;
            }
            Ok(Some(change.before.clone()))
        });
        match replay {
            Ok((selection, _)) => {
                self.undone.push(change);
                Ok(selection)
            }
            Err(err) => {
                self.done.push(change);
                Err(err)
            }
        }
    }

    /// Re-apply the most recently undone change.
    pub fn redo(&mut self, doc: &mut Document) -> Result<Option<Selection>, EditorError> {
        let Some(change) = self.undone.pop() else {
            return Ok(None);
        };
        let replay = doc.transact(change.before.clone(), |tx| {
            for op in &change.ops {
                tx.apply_op(op)?;
            }
            Ok(Some(change.after.clone()))
        });
        match replay {
            Ok((selection, _)) => {
                self.done.push(change);
                Ok(selection)
            }
            Err(err) => {
                self.undone.push(change);
                Err(err)
            }
        }
    }

    pub fn clear(&mut self) {
        self.done.clear();
        self.undone.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkstone_model::{text_path, Node, PropertyOp, Schema};
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

    fn typed(doc: &mut Document, text: &str, at: usize) -> Change {
        let (_, change) = doc
            .transact(Selection::cursor(text_path("p1"), at), |tx| {
                tx.update(
                    &text_path("p1"),
                    PropertyOp::Insert {
                        offset: at,
                        value: json!(text),
                    },
                )?;
                Ok(Some(Selection::cursor(text_path("p1"), at + text.len())))
            })
            .unwrap();
        change
    }

    #[test]
    fn test_undo_redo_text_edit() {
        let mut doc = doc();
        let mut stack = UndoStack::with_default_limit();
        stack.record(typed(&mut doc, " world", 5));
        assert_eq!(doc.get_text(&text_path("p1")).unwrap(), "Hello world");

        let sel = stack.undo(&mut doc).unwrap();
        assert_eq!(doc.get_text(&text_path("p1")).unwrap(), "Hello");
        assert_eq!(sel, Some(Selection::cursor(text_path("p1"), 5)));
        assert!(stack.can_redo());

        let sel = stack.redo(&mut doc).unwrap();
        assert_eq!(doc.get_text(&text_path("p1")).unwrap(), "Hello world");
        assert_eq!(sel, Some(Selection::cursor(text_path("p1"), 11)));
    }

    #[test]
    fn test_undo_restores_deleted_node_and_annotations() {
        let mut doc = doc();
        doc.create(Node::annotation("s1", "strong", text_path("p1"), 0, 2))
            .unwrap();
        let mut stack = UndoStack::with_default_limit();

        let (_, change) = doc
            .transact(Selection::Null, |tx| {
                tx.hide("body", "p1")?;
                tx.delete("p1")?;
                Ok(None)
            })
            .unwrap();
        stack.record(change);
        assert!(!doc.contains("p1"));
        assert!(!doc.contains("s1"));

        stack.undo(&mut doc).unwrap();
        assert_eq!(doc.get_text(&text_path("p1")).unwrap(), "Hello");
        assert!(doc.contains("s1"));
        assert_eq!(doc.annotation_index().get(&text_path("p1")), vec!["s1"]);
        assert_eq!(doc.container_nodes("body").unwrap(), vec!["p1"]);
    }

    #[test]
    fn test_record_clears_redo() {
        let mut doc = doc();
        let mut stack = UndoStack::with_default_limit();
        stack.record(typed(&mut doc, " world", 5));
        stack.undo(&mut doc).unwrap();
        assert!(stack.can_redo());

        stack.record(typed(&mut doc, "!", 5));
        assert!(!stack.can_redo());
        assert_eq!(stack.redo(&mut doc).unwrap(), None);
    }

    #[test]
    fn test_level_cap_drops_oldest() {
        let mut doc = doc();
        let mut stack = UndoStack::new(2);
        stack.record(typed(&mut doc, "a", 5));
        stack.record(typed(&mut doc, "b", 6));
        stack.record(typed(&mut doc, "c", 7));
        assert_eq!(doc.get_text(&text_path("p1")).unwrap(), "Helloabc");

        stack.undo(&mut doc).unwrap();
        stack.undo(&mut doc).unwrap();
        // the first edit fell off the stack
        assert_eq!(stack.undo(&mut doc).unwrap(), None);
        assert_eq!(doc.get_text(&text_path("p1")).unwrap(), "Helloa");
    }

    #[test]
    fn test_undo_on_empty_stack() {
        let mut doc = doc();
        let mut stack = UndoStack::with_default_limit();
        assert!(!stack.can_undo());
        assert_eq!(stack.undo(&mut doc).unwrap(), None);
    }
}
