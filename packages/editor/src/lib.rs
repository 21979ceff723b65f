//! # Inkstone Editor
//!
//! Transactional editing on top of `inkstone-model`: transforms run
//! inside atomic transactions whose op logs feed an undo history.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ transforms: insert_text, delete_selection,  │
//! │   break_node, insert_node, switch_text_type,│
//! │   copy_selection, paste                     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ transaction: working-copy mutations,        │
//! │   committed on Ok, discarded on Err         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ ops + undo_stack: invertible change log     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ session: document + selection + history     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Transforms return `Ok(None)` for selections they do not handle, so
//! callers can chain fallbacks without inspecting errors.

pub mod annotations;
pub mod errors;
pub mod ops;
pub mod session;
pub mod transaction;
pub mod transforms;
pub mod undo_stack;

pub use annotations::{deleted_text, inserted_text, transfer_annotations};
pub use errors::EditorError;
pub use ops::{Change, DocumentOp};
pub use session::EditSession;
pub use transaction::{Transact, Transaction};
pub use transforms::{
    break_node, copy_selection, delete_selection, insert_node, insert_text, paste,
    switch_text_type, PasteArgs,
};
pub use undo_stack::UndoStack;
