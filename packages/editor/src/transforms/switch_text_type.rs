//! Re-types a text node (e.g. paragraph → heading) by swapping in a
//! fresh node with the same content at the same container position.

use crate::annotations::transfer_annotations;
use crate::errors::EditorError;
use crate::transaction::Transaction;
use crate::transforms::selection_error;
use inkstone_model::{text_path, ModelError, Node, Selection};

pub fn switch_text_type(
    tx: &mut Transaction,
    container_id: &str,
    selection: &Selection,
    new_type: &str,
) -> Result<Option<Selection>, EditorError> {
    let Selection::Property {
        path,
        start_offset,
        end_offset,
        surface_id,
    } = selection
    else {
        return Ok(None);
    };

    let node_id = path[0].clone();
    let node = tx.get(&node_id)?.clone();
    if !tx.schema().is_text(&node.node_type) {
        return Ok(None);
    }
    if !tx.schema().contains(new_type) {
        return Err(ModelError::UnknownType(new_type.to_string()).into());
    }
    if !tx.schema().is_text(new_type) {
        return Err(ModelError::InvalidStructure(format!(
            "{} is not a text type",
            new_type
        ))
        .into());
    }

    let content = node.text_content().unwrap_or_default().to_string();
    let new_id = tx.fresh_id(new_type);
    tx.create(Node::text(&new_id, new_type, &content))?;
    let new_path = text_path(&new_id);
    transfer_annotations(tx, path, 0, &new_path, 0)?;

    let pos = tx
        .position(container_id, &node_id)?
        .ok_or_else(|| selection_error(format!("node {} is not in container {}", node_id, container_id)))?;
    tx.hide(container_id, &node_id)?;
    tx.show(container_id, &new_id, Some(pos))?;
    tx.delete(&node_id)?;

    Ok(Some(
        Selection::property(new_path, *start_offset, *end_offset)
            .with_surface(surface_id.clone()),
    ))
}
