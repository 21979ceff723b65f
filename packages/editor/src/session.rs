//! # Edit Session
//!
//! Owns a document, the current selection, and the undo history, and
//! threads them through every edit: `apply` opens a transaction seeded
//! with the current selection, commits the transform's result, records
//! the change, and adopts the selection the transform returned.

use crate::errors::EditorError;
use crate::transaction::{Transact, Transaction};
use crate::undo_stack::UndoStack;
use inkstone_model::{Document, Selection};

#[derive(Debug)]
pub struct EditSession {
    document: Document,
    selection: Selection,
    history: UndoStack,
}

impl EditSession {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            selection: Selection::Null,
            history: UndoStack::with_default_limit(),
        }
    }

    pub fn with_history_limit(document: Document, max_levels: usize) -> Self {
        Self {
            document,
            selection: Selection::Null,
            history: UndoStack::new(max_levels),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// Run one edit against the session. The transform sees the current
    /// selection via [`Transaction::before`]; on commit the session
    /// adopts the returned selection (keeping the old one on "not
    /// handled") and records the change for undo.
    pub fn apply<F>(&mut self, f: F) -> Result<Selection, EditorError>
    where
        F: FnOnce(&mut Transaction) -> Result<Option<Selection>, EditorError>,
    {
        let before = self.selection.clone();
        let (selection, change) = self.document.transact(before, f)?;
        if let Some(selection) = selection {
            self.selection = selection;
        }
        tracing::debug!(ops = change.ops.len(), "committed change");
        self.history.record(change);
        Ok(self.selection.clone())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Revert the last recorded change. Returns false when the history
    /// is empty.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        match self.history.undo(&mut self.document)? {
            Some(selection) => {
                self.selection = selection;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        match self.history.redo(&mut self.document)? {
            Some(selection) => {
                self.selection = selection;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
