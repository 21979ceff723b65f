//! # Paste
//!
//! Merges externally-sourced content into a live document at the
//! current selection. The source is either a snippet document (the
//! carrier produced by copy_selection or an importer) or plain text,
//! which is converted into default-text-type nodes on blank-line
//! boundaries.
//!
//! The merge keeps three guarantees:
//! - id uniqueness: every transferred node and annotation is re-minted
//!   on collision, recursively through child subtrees
//! - annotation integrity: source annotations are re-anchored onto
//!   their target paths; target annotations at the insertion point are
//!   stretched, not duplicated
//! - a coherent resulting selection: collapsed after an inline merge,
//!   spanning first-through-last node after a block transfer

use crate::annotations::inserted_text;
use crate::errors::EditorError;
use crate::transaction::Transaction;
use crate::transforms::{break_node, delete_selection, insert_text, property_point, selection_error};
use inkstone_model::text::char_len;
use inkstone_model::{
    text_path, Document, Node, PropertyOp, Selection, SNIPPET_ID, TEXT_SNIPPET_ID,
};
use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Arguments to [`paste`]. `container_id` is set when the selection
/// lives inside a container; without it, plain text falls back to
/// [`insert_text`] and block content cannot be transferred.
#[derive(Debug)]
pub struct PasteArgs {
    pub selection: Selection,
    pub container_id: Option<String>,
    pub text: Option<String>,
    pub snippet: Option<Document>,
}

pub fn paste(tx: &mut Transaction, args: PasteArgs) -> Result<Selection, EditorError> {
    let PasteArgs {
        selection,
        container_id,
        text,
        snippet,
    } = args;

    if selection.is_null() {
        tracing::warn!("cannot paste without a selection");
        return Ok(selection);
    }
    let mut sel = selection.normalized();
    let in_container = container_id.is_some();

    let snippet = match snippet {
        Some(doc) => doc,
        None => {
            let text = text.unwrap_or_default();
            if !in_container {
                // bare property editor: no document-to-document merge
                let out = insert_text(tx, &sel, &text)?;
                return Ok(out.unwrap_or(sel));
            }
            plain_text_snippet(tx, &text)?
        }
    };

    if !sel.is_collapsed() {
        if let Some(collapsed) = delete_selection(tx, &sel)? {
            sel = collapsed;
        }
    }

    let mut node_ids = snippet.container_nodes(SNIPPET_ID)?;
    if node_ids.is_empty() {
        return Ok(sel);
    }

    // an inline-mergeable head: a text node pasted into a text property
    // splices in place instead of fragmenting the target paragraph
    let first_type = snippet.get(&node_ids[0])?.node_type.clone();
    if tx.schema().is_text(&first_type) && property_point(&sel).is_some() {
        sel = paste_annotated_text(tx, &snippet, &node_ids[0], &sel)?;
        node_ids.remove(0);
    }

    if !node_ids.is_empty() {
        let container_id = container_id
            .ok_or_else(|| selection_error("block paste requires a container selection"))?;
        if let Some(block_sel) = paste_document(tx, &snippet, &node_ids, &container_id, &sel)? {
            sel = block_sel;
        }
    }
    Ok(sel)
}

/// Split plain text on blank-line boundaries and wrap the lines into
/// default-text-type nodes on a fresh snippet document.
fn plain_text_snippet(tx: &mut Transaction, text: &str) -> Result<Document, EditorError> {
    static BLANK_LINES: OnceLock<Regex> = OnceLock::new();
    let splitter = BLANK_LINES.get_or_init(|| Regex::new(r"\s*\n\s*\n").expect("valid regex"));

    let text_type = tx.schema().default_text_type().to_string();
    let mut snippet = Document::snippet(tx.schema_handle())?;
    let lines: Vec<&str> = splitter.split(text).collect();
    if lines.len() == 1 {
        snippet.create(Node::text(TEXT_SNIPPET_ID, &text_type, lines[0]))?;
        snippet.show(SNIPPET_ID, TEXT_SNIPPET_ID, None)?;
    } else {
        for line in lines {
            let id = snippet.fresh_id(&text_type);
            snippet.create(Node::text(&id, &text_type, line))?;
            snippet.show(SNIPPET_ID, &id, None)?;
        }
    }
    Ok(snippet)
}

/// Inline merge of the snippet's first text node into the current text
/// property, so single-line pastes do not fragment the paragraph.
fn paste_annotated_text(
    tx: &mut Transaction,
    snippet: &Document,
    first_id: &str,
    sel: &Selection,
) -> Result<Selection, EditorError> {
    let (path, offset, surface_id) =
        property_point(sel).ok_or_else(|| selection_error("paste point is not a property"))?;

    let source_path = text_path(first_id);
    let text = snippet.get_text(&source_path)?;
    let length = char_len(&text);

    tx.update(
        &path,
        PropertyOp::Insert {
            offset,
            value: Value::String(text),
        },
    )?;
    // decorations touching the insertion point stretch over the new text
    inserted_text(tx, &path, offset, length)?;

    for anno_id in snippet.annotation_index().get(&source_path) {
        let anno = snippet.get(&anno_id)?;
        let mut data = anno
            .clone()
            .with_attr("path", Value::from(path.clone()))
            .with_attr(
                "startOffset",
                json!(anno.start_offset().unwrap_or(0) + offset),
            )
            .with_attr("endOffset", json!(anno.end_offset().unwrap_or(0) + offset));
        if tx.contains(&data.id) {
            data.id = tx.fresh_id(&data.node_type);
        }
        tx.create(data)?;
    }

    Ok(Selection::cursor(path, offset + length).with_surface(surface_id))
}

/// Transfer the remaining snippet nodes as siblings into the target
/// container, splitting the anchor node when the cursor is mid-text.
fn paste_document(
    tx: &mut Transaction,
    snippet: &Document,
    node_ids: &[String],
    container_id: &str,
    sel: &Selection,
) -> Result<Option<Selection>, EditorError> {
    let anchor_id = sel
        .start_node_id()
        .ok_or_else(|| selection_error("paste point has no anchor node"))?
        .to_string();
    let start_pos = tx
        .position(container_id, &anchor_id)?
        .ok_or_else(|| selection_error(format!("node {} is not in container {}", anchor_id, container_id)))?;

    let mut insert_pos = start_pos + 1;
    if let Some((path, offset, _)) = property_point(sel) {
        let len = char_len(&tx.get_text(&path)?);
        if offset < len {
            // break, unless the cursor sits after the last character
            break_node(tx, container_id, sel)?;
        }
    }

    let mut remapped: HashMap<String, String> = HashMap::new();
    let mut inserted: Vec<String> = Vec::new();
    for node_id in node_ids {
        let new_id = copy_node(tx, snippet, node_id, &mut remapped)?;
        tx.show(container_id, &new_id, Some(insert_pos))?;
        insert_pos += 1;
        inserted.push(new_id);
    }

    // re-anchor every annotation of the transferred subtrees onto the
    // (possibly remapped) copies
    for (old_id, new_id) in &remapped {
        for anno_id in snippet.annotation_index().by_node(old_id) {
            let anno = snippet.get(&anno_id)?;
            let mut data = anno.clone();
            if old_id != new_id {
                let mut path = anno.anno_path().unwrap_or_default();
                if let Some(head) = path.first_mut() {
                    *head = new_id.clone();
                }
                data = data.with_attr("path", Value::from(path));
            }
            if tx.contains(&data.id) {
                data.id = tx.fresh_id(&data.node_type);
            }
            tx.create(data)?;
        }
    }

    if inserted.is_empty() {
        return Ok(None);
    }
    let first = inserted[0].clone();
    let last = inserted[inserted.len() - 1].clone();
    let out = tx.create_selection(
        Selection::container(container_id, vec![first], 0, vec![last], 1)
            .with_surface(sel.surface_id().map(str::to_string)),
    )?;
    Ok(Some(out))
}

/// Deep copy with id remapping, memoized per paste so shared children
/// are copied once. Children are rewritten before the parent is
/// created, keeping the copy internally consistent even when only some
/// descendant ids collide.
fn copy_node(
    tx: &mut Transaction,
    snippet: &Document,
    node_id: &str,
    remapped: &mut HashMap<String, String>,
) -> Result<String, EditorError> {
    if let Some(done) = remapped.get(node_id) {
        return Ok(done.clone());
    }
    let mut data = snippet.get(node_id)?.clone();
    if let Some(property) = tx.schema().children_property(&data.node_type).map(str::to_string) {
        if let Some(child_ids) = data.child_ids(&property) {
            let mut copies = Vec::with_capacity(child_ids.len());
            for child_id in &child_ids {
                copies.push(copy_node(tx, snippet, child_id, remapped)?);
            }
            data.attrs.insert(property, json!(copies));
        }
    }
    if tx.contains(&data.id) {
        data.id = tx.fresh_id(&data.node_type);
    }
    let created = tx.create(data)?;
    remapped.insert(node_id.to_string(), created.id.clone());
    Ok(created.id)
}
