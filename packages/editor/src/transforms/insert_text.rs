//! Inserts plain text at the selection, replacing any selected range.

use crate::annotations::inserted_text;
use crate::errors::EditorError;
use crate::transaction::Transaction;
use crate::transforms::{delete_selection, property_point};
use inkstone_model::text::char_len;
use inkstone_model::{PropertyOp, Selection};
use serde_json::Value;

pub fn insert_text(
    tx: &mut Transaction,
    selection: &Selection,
    text: &str,
) -> Result<Option<Selection>, EditorError> {
    let collapsed = if selection.is_collapsed() {
        selection.clone()
    } else {
        match delete_selection(tx, selection)? {
            Some(sel) => sel,
            None => return Ok(None),
        }
    };
    let Some((path, offset, surface_id)) = property_point(&collapsed) else {
        return Ok(None);
    };

    tx.update(
        &path,
        PropertyOp::Insert {
            offset,
            value: Value::String(text.to_string()),
        },
    )?;
    let length = char_len(text);
    inserted_text(tx, &path, offset, length)?;
    Ok(Some(
        Selection::cursor(path, offset + length).with_surface(surface_id),
    ))
}
