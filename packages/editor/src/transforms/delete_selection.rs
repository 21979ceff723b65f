//! Clears the selected range and collapses the selection to the
//! deletion point. The workhorse every content-replacing transform
//! (insert_text, paste) runs first.

use crate::annotations::{deleted_text, transfer_annotations};
use crate::errors::EditorError;
use crate::transaction::Transaction;
use crate::transforms::selection_error;
use inkstone_model::{text_path, Node, PropertyOp, Selection};
use inkstone_model::text::char_len;
use serde_json::Value;

pub fn delete_selection(
    tx: &mut Transaction,
    selection: &Selection,
) -> Result<Option<Selection>, EditorError> {
    if selection.is_collapsed() {
        return Ok(Some(selection.clone()));
    }
    match selection.clone().normalized() {
        Selection::Null | Selection::Node { .. } => Ok(None),
        Selection::Property {
            path,
            start_offset,
            end_offset,
            surface_id,
        } => {
            delete_range(tx, &path, start_offset, end_offset)?;
            Ok(Some(
                Selection::cursor(path, start_offset).with_surface(surface_id),
            ))
        }
        Selection::Container {
            container_id,
            start_path,
            start_offset,
            end_path,
            end_offset,
            surface_id,
        } => delete_container_range(
            tx,
            &container_id,
            &start_path,
            start_offset,
            &end_path,
            end_offset,
            surface_id,
        )
        .map(Some),
    }
}

fn delete_container_range(
    tx: &mut Transaction,
    container_id: &str,
    start_path: &[String],
    start_offset: usize,
    end_path: &[String],
    end_offset: usize,
    surface_id: Option<String>,
) -> Result<Selection, EditorError> {
    let start_node = start_path
        .first()
        .cloned()
        .ok_or_else(|| selection_error("selection start path is empty"))?;
    let end_node = end_path
        .first()
        .cloned()
        .ok_or_else(|| selection_error("selection end path is empty"))?;

    // single node: either a text range or a whole-node fragment
    if start_node == end_node {
        if start_path.len() == 2 {
            delete_range(tx, start_path, start_offset, end_offset)?;
            return Ok(
                Selection::cursor(start_path.to_vec(), start_offset).with_surface(surface_id)
            );
        }
        let pos = node_position(tx, container_id, &start_node)?;
        tx.hide(container_id, &start_node)?;
        tx.delete(&start_node)?;
        return collapse_after_removal(tx, container_id, pos, surface_id);
    }

    let start_pos = node_position(tx, container_id, &start_node)?;
    let end_pos = node_position(tx, container_id, &end_node)?;
    if end_pos < start_pos {
        return Err(selection_error("selection end precedes its start"));
    }

    // wholly covered nodes between the boundaries go away
    let ids = tx.container_nodes(container_id)?;
    for id in &ids[start_pos + 1..end_pos] {
        tx.hide(container_id, id)?;
        tx.delete(id)?;
    }

    let start_is_text = start_path.len() == 2;
    let end_is_text = end_path.len() == 2;

    if start_is_text {
        let len = char_len(&tx.get_text(start_path)?);
        delete_range(tx, start_path, start_offset, len)?;
    } else {
        tx.hide(container_id, &start_node)?;
        tx.delete(&start_node)?;
    }

    if end_is_text {
        delete_range(tx, end_path, 0, end_offset)?;
        if start_is_text {
            // merge the remainder of the last node into the first
            let tail = tx.get_text(end_path)?;
            if !tail.is_empty() {
                tx.update(
                    start_path,
                    PropertyOp::Insert {
                        offset: start_offset,
                        value: Value::String(tail),
                    },
                )?;
            }
            transfer_annotations(tx, end_path, 0, &start_path.to_vec(), start_offset)?;
            tx.hide(container_id, &end_node)?;
            tx.delete(&end_node)?;
            return Ok(
                Selection::cursor(start_path.to_vec(), start_offset).with_surface(surface_id)
            );
        }
        return Ok(Selection::cursor(end_path.to_vec(), 0).with_surface(surface_id));
    }

    tx.hide(container_id, &end_node)?;
    tx.delete(&end_node)?;
    if start_is_text {
        return Ok(Selection::cursor(start_path.to_vec(), start_offset).with_surface(surface_id));
    }
    collapse_after_removal(tx, container_id, start_pos, surface_id)
}

/// Remove `[start, end)` from a text property and maintain annotations.
pub(crate) fn delete_range(
    tx: &mut Transaction,
    path: &[String],
    start: usize,
    end: usize,
) -> Result<(), EditorError> {
    if end < start {
        return Err(selection_error("range end precedes its start"));
    }
    if end == start {
        return Ok(());
    }
    tx.update(
        path,
        PropertyOp::Delete {
            offset: start,
            length: end - start,
        },
    )?;
    deleted_text(tx, path, start, end - start)?;
    Ok(())
}

/// Collapsed selection after whole nodes were removed: the start of the
/// node now occupying the position, or a fresh empty default-text node
/// when the container emptied.
fn collapse_after_removal(
    tx: &mut Transaction,
    container_id: &str,
    pos: usize,
    surface_id: Option<String>,
) -> Result<Selection, EditorError> {
    let ids = tx.container_nodes(container_id)?;
    if ids.is_empty() {
        let text_type = tx.schema().default_text_type().to_string();
        let id = tx.fresh_id(&text_type);
        tx.create(Node::text(&id, &text_type, ""))?;
        tx.show(container_id, &id, None)?;
        return Ok(Selection::cursor(text_path(&id), 0).with_surface(surface_id));
    }
    let id = ids[pos.min(ids.len() - 1)].clone();
    let node = tx.get(&id)?;
    if tx.schema().is_text(&node.node_type) {
        Ok(Selection::cursor(text_path(&id), 0).with_surface(surface_id))
    } else {
        // collapsed fragment anchor before the node
        Ok(Selection::container(container_id, vec![id.clone()], 0, vec![id], 0)
            .with_surface(surface_id))
    }
}

fn node_position(
    tx: &Transaction,
    container_id: &str,
    node_id: &str,
) -> Result<usize, EditorError> {
    tx.position(container_id, node_id)?
        .ok_or_else(|| selection_error(format!("node {} is not in container {}", node_id, container_id)))
}
