//! Splits a text node at the cursor. The text after the cursor moves
//! into a new node of the same type shown right after the original;
//! annotations at or after the cut move with it.

use crate::annotations::transfer_annotations;
use crate::errors::EditorError;
use crate::transaction::Transaction;
use crate::transforms::{delete_selection, property_point, selection_error};
use inkstone_model::text::{char_len, slice_chars};
use inkstone_model::{text_path, Node, PropertyOp, Selection};

pub fn break_node(
    tx: &mut Transaction,
    container_id: &str,
    selection: &Selection,
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

    let node_id = path[0].clone();
    let node_type = tx.get(&node_id)?.node_type.clone();
    if !tx.schema().is_text(&node_type) {
        return Ok(None);
    }

    let text = tx.get_text(&path)?;
    let len = char_len(&text);
    let tail = slice_chars(&text, offset, len);

    let new_id = tx.fresh_id(&node_type);
    tx.create(Node::text(&new_id, &node_type, &tail))?;
    if offset < len {
        tx.update(
            &path,
            PropertyOp::Delete {
                offset,
                length: len - offset,
            },
        )?;
    }
    let new_path = text_path(&new_id);
    transfer_annotations(tx, &path, offset, &new_path, 0)?;

    let pos = tx
        .position(container_id, &node_id)?
        .ok_or_else(|| selection_error(format!("node {} is not in container {}", node_id, container_id)))?;
    tx.show(container_id, &new_id, Some(pos + 1))?;

    let out = tx.create_selection(Selection::cursor(new_path, 0).with_surface(surface_id))?;
    Ok(Some(out))
}
