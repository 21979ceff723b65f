//! Inserts a block node at the selection point inside a container.
//! A cursor at the end of a node inserts right after it; a mid-node
//! cursor splits the node first.

use crate::errors::EditorError;
use crate::transaction::Transaction;
use crate::transforms::{break_node, delete_selection, property_point, selection_error};
use inkstone_model::text::char_len;
use inkstone_model::{Node, Selection};

pub fn insert_node(
    tx: &mut Transaction,
    container_id: &str,
    selection: &Selection,
    node: Node,
) -> Result<Option<Selection>, EditorError> {
    let collapsed = if selection.is_collapsed() {
        selection.clone().normalized()
    } else {
        match delete_selection(tx, selection)? {
            Some(sel) => sel.normalized(),
            None => return Ok(None),
        }
    };

    let (surface_id, insert_pos) = match property_point(&collapsed) {
        Some((path, offset, surface_id)) => {
            let pos = anchor_position(tx, container_id, &path[0])?;
            let len = char_len(&tx.get_text(&path)?);
            if offset < len {
                // split and land between the head and the tail
                break_node(tx, container_id, &collapsed)?;
            }
            (surface_id, pos + 1)
        }
        None => match &collapsed {
            Selection::Container { start_path, surface_id, .. } if start_path.len() == 1 => {
                let pos = anchor_position(tx, container_id, &start_path[0])?;
                (surface_id.clone(), pos + 1)
            }
            _ => return Ok(None),
        },
    };

    let mut data = node;
    if data.id.is_empty() || tx.contains(&data.id) {
        data.id = tx.fresh_id(&data.node_type);
    }
    let created = tx.create(data)?;
    tx.show(container_id, &created.id, Some(insert_pos))?;

    let sel = Selection::container(
        container_id,
        vec![created.id.clone()],
        0,
        vec![created.id],
        1,
    )
    .with_surface(surface_id);
    Ok(Some(sel))
}

fn anchor_position(
    tx: &Transaction,
    container_id: &str,
    node_id: &str,
) -> Result<usize, EditorError> {
    tx.position(container_id, node_id)?
        .ok_or_else(|| selection_error(format!("node {} is not in container {}", node_id, container_id)))
}
