//! Produces a standalone snippet document holding exactly the content a
//! selection covers, in the container convention paste consumes, so
//! copy output is always valid paste input.

use crate::errors::EditorError;
use crate::transforms::selection_error;
use inkstone_model::text::{char_len, slice_chars};
use inkstone_model::{
    text_path, Document, Node, Selection, CONTENT, SNIPPET_ID, TEXT_SNIPPET_ID,
};
use serde_json::{json, Value};

pub fn copy_selection(
    doc: &Document,
    selection: &Selection,
) -> Result<Option<Document>, EditorError> {
    match selection.clone().normalized() {
        Selection::Null | Selection::Node { .. } => Ok(None),
        Selection::Property {
            path,
            start_offset,
            end_offset,
            ..
        } => {
            if start_offset == end_offset {
                return Ok(None);
            }
            let node_type = doc.get(&path[0])?.node_type.clone();
            let text = doc.get_text(&path)?;
            let mut snippet = Document::snippet(doc.schema_handle())?;
            snippet.create(Node::text(
                TEXT_SNIPPET_ID,
                &node_type,
                &slice_chars(&text, start_offset, end_offset),
            ))?;
            snippet.show(SNIPPET_ID, TEXT_SNIPPET_ID, None)?;
            copy_windowed_annotations(
                doc,
                &mut snippet,
                &path,
                start_offset,
                end_offset,
                &text_path(TEXT_SNIPPET_ID),
            )?;
            Ok(Some(snippet))
        }
        Selection::Container {
            container_id,
            start_path,
            start_offset,
            end_path,
            end_offset,
            ..
        } => {
            let start_node = start_path
                .first()
                .ok_or_else(|| selection_error("selection start path is empty"))?;
            let end_node = end_path
                .first()
                .ok_or_else(|| selection_error("selection end path is empty"))?;
            let start_pos = position(doc, &container_id, start_node)?;
            let end_pos = position(doc, &container_id, end_node)?;
            if end_pos < start_pos {
                return Err(selection_error("selection end precedes its start"));
            }

            let ids = doc.container_nodes(&container_id)?;
            let mut snippet = Document::snippet(doc.schema_handle())?;
            for (i, id) in ids[start_pos..=end_pos].iter().enumerate() {
                let node = doc.get(id)?;
                let is_text = doc.schema().is_text(&node.node_type);
                // boundary text nodes copy only the covered window
                let lo = if i == 0 && start_path.len() == 2 && is_text {
                    start_offset
                } else {
                    0
                };
                let text_len = node.text_content().map(char_len);
                let hi = if start_pos + i == end_pos && end_path.len() == 2 && is_text {
                    end_offset
                } else {
                    text_len.unwrap_or(0)
                };
                if is_text && (lo > 0 || Some(hi) != text_len) {
                    copy_text_window(doc, &mut snippet, id, lo, hi)?;
                } else {
                    copy_subtree(doc, &mut snippet, id)?;
                }
                snippet.show(SNIPPET_ID, id, None)?;
            }
            Ok(Some(snippet))
        }
    }
}

/// Copy a text node truncated to `[lo, hi)` with its overlapping
/// annotations re-based to 0.
fn copy_text_window(
    doc: &Document,
    snippet: &mut Document,
    id: &str,
    lo: usize,
    hi: usize,
) -> Result<(), EditorError> {
    let node = doc.get(id)?;
    let text = node.text_content().unwrap_or_default();
    let copy = node
        .clone()
        .with_attr(CONTENT, slice_chars(text, lo, hi));
    snippet.create(copy)?;
    copy_windowed_annotations(doc, snippet, &text_path(id), lo, hi, &text_path(id))?;
    Ok(())
}

/// Copy a node, its annotations, and its whole child subtree. Ids are
/// preserved; paste remaps them on collision at the target.
fn copy_subtree(doc: &Document, snippet: &mut Document, id: &str) -> Result<(), EditorError> {
    let node = doc.get(id)?.clone();
    let children_property = doc.schema().children_property(&node.node_type);
    snippet.create(node.clone())?;
    for anno_id in doc.annotation_index().by_node(id) {
        snippet.create(doc.get(&anno_id)?.clone())?;
    }
    if let Some(property) = children_property {
        for child_id in node.child_ids(property).unwrap_or_default() {
            copy_subtree(doc, snippet, &child_id)?;
        }
    }
    Ok(())
}

fn copy_windowed_annotations(
    doc: &Document,
    snippet: &mut Document,
    path: &[String],
    lo: usize,
    hi: usize,
    target_path: &[String],
) -> Result<(), EditorError> {
    for anno_id in doc.annotation_index().get(path) {
        let anno = doc.get(&anno_id)?;
        let (start, end) = match (anno.start_offset(), anno.end_offset()) {
            (Some(s), Some(e)) => (s, e),
            _ => continue,
        };
        if end <= lo || start >= hi {
            continue;
        }
        let copy = anno
            .clone()
            .with_attr("path", Value::from(target_path.to_vec()))
            .with_attr("startOffset", json!(start.max(lo) - lo))
            .with_attr("endOffset", json!(end.min(hi) - lo));
        snippet.create(copy)?;
    }
    Ok(())
}

fn position(doc: &Document, container_id: &str, node_id: &str) -> Result<usize, EditorError> {
    doc.position(container_id, node_id)?
        .ok_or_else(|| selection_error(format!("node {} is not in container {}", node_id, container_id)))
}
