//! # Structural Op Log
//!
//! Every mutation a transaction issues is recorded as a [`DocumentOp`]
//! with enough data to undo it exactly:
//!
//! - `Create` stores the created node, inverted by deleting it
//! - `Delete` stores the removed node, inverted by re-creating it
//! - `Update` stores the applied property op and the inverse the
//!   document computed while applying it
//!
//! The inverse is captured at apply time, before any later op can move
//! the data it refers to. A [`Change`] bundles one transaction's ops
//! with its before/after selection snapshots.

use inkstone_model::{Node, Path, PropertyOp, Selection};
use serde::{Deserialize, Serialize};

/// One recorded mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DocumentOp {
    Create {
        node: Node,
    },
    Delete {
        node: Node,
    },
    #[serde(rename_all = "camelCase")]
    Update {
        path: Path,
        op: PropertyOp,
        inverse: PropertyOp,
    },
}

impl DocumentOp {
    /// The op that exactly undoes this one.
    pub fn inverted(&self) -> DocumentOp {
        match self {
            DocumentOp::Create { node } => DocumentOp::Delete { node: node.clone() },
            DocumentOp::Delete { node } => DocumentOp::Create { node: node.clone() },
            DocumentOp::Update { path, op, inverse } => DocumentOp::Update {
                path: path.clone(),
                op: inverse.clone(),
                inverse: op.clone(),
            },
        }
    }
}

/// One committed transaction: its op log plus the selection snapshots
/// taken before and after, for undo/redo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub ops: Vec<DocumentOp>,
    pub before: Selection,
    pub after: Selection,
}

impl Change {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Inverted ops in reverse application order.
    pub fn inverted_ops(&self) -> Vec<DocumentOp> {
        self.ops.iter().rev().map(DocumentOp::inverted).collect()
    }
}
