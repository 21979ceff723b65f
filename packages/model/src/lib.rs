//! # Inkstone Model
//!
//! Data model for the Inkstone rich-text document engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ schema: node-type registry                  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ document: id → node arena                   │
//! │  - create/delete with annotation cascade    │
//! │  - property ops with exact inverses         │
//! │  - container ordering (show/hide/position)  │
//! │  - annotation index by path                 │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ selection: addressing values for edits      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Path addressing**: relationships are `(nodeId, property)` paths
//!    or bare ids, never object references
//! 2. **Nodes are JSON data**: every node round-trips through serde
//! 3. **Annotations are nodes**: range-anchored markup lives in the same
//!    id space, indexed by path
//! 4. **Selections are values**: copied freely, never mutated in place

pub mod annotations;
pub mod document;
pub mod errors;
pub mod node;
pub mod schema;
pub mod selection;
pub mod text;

pub use annotations::AnnotationIndex;
pub use document::{Document, PropertyOp, SNIPPET_ID, TEXT_SNIPPET_ID};
pub use errors::ModelError;
pub use node::{text_path, Node, Path, CONTENT};
pub use schema::{NodeType, Schema, ANNOTATION_TYPE, TEXT_TYPE};
pub use selection::Selection;
