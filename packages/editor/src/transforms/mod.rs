//! # Transform Functions
//!
//! Each editing command is a function `(tx, args) -> updated selection`
//! composed from transaction primitives. Transforms handle property and
//! container selections; a whole-node selection passed to a text
//! transform answers `Ok(None)`, "not handled", so callers can probe
//! applicability without errors.

mod break_node;
mod copy_selection;
mod delete_selection;
mod insert_node;
mod insert_text;
mod paste;
mod switch_text_type;

pub use break_node::break_node;
pub use copy_selection::copy_selection;
pub use delete_selection::delete_selection;
pub use insert_node::insert_node;
pub use insert_text::insert_text;
pub use paste::{paste, PasteArgs};
pub use switch_text_type::switch_text_type;

use crate::errors::EditorError;
use inkstone_model::{Path, Selection};

/// A collapsed or anchored point inside a text property: the property
/// variant directly, or a container selection whose start sits in one.
pub(crate) fn property_point(selection: &Selection) -> Option<(Path, usize, Option<String>)> {
    match selection {
        Selection::Property {
            path,
            start_offset,
            surface_id,
            ..
        } => Some((path.clone(), *start_offset, surface_id.clone())),
        Selection::Container {
            start_path,
            start_offset,
            surface_id,
            ..
        } if start_path.len() == 2 => {
            Some((start_path.clone(), *start_offset, surface_id.clone()))
        }
        _ => None,
    }
}

pub(crate) fn selection_error(message: impl Into<String>) -> EditorError {
    EditorError::InvalidSelection(message.into())
}
