//! # Annotation Maintenance
//!
//! Offset bookkeeping shared by every text-mutating transform. Text
//! splices do not move annotations by themselves; the transform that
//! issued the splice calls the matching helper here.

use inkstone_model::{ModelError, Path, PropertyOp};
use serde_json::{json, Value};

use crate::transaction::Transaction;

/// Text of `length` chars was inserted at `offset` on `path`: shift
/// annotations starting at or after the offset, stretch annotations
/// whose range touches it.
pub fn inserted_text(
    tx: &mut Transaction,
    path: &[String],
    offset: usize,
    length: usize,
) -> Result<(), ModelError> {
    if length == 0 {
        return Ok(());
    }
    for anno_id in tx.annotation_index().get(path) {
        let anno = tx.get(&anno_id)?;
        let (start, end) = offsets(&anno_id, anno.start_offset(), anno.end_offset())?;
        if start >= offset {
            set_offset(tx, &anno_id, "startOffset", start + length)?;
        }
        if end >= offset {
            set_offset(tx, &anno_id, "endOffset", end + length)?;
        }
    }
    Ok(())
}

/// Text `[offset, offset+length)` was deleted on `path`: shift, shrink,
/// or drop annotations accordingly. Annotations fully inside the deleted
/// range are deleted.
pub fn deleted_text(
    tx: &mut Transaction,
    path: &[String],
    offset: usize,
    length: usize,
) -> Result<(), ModelError> {
    if length == 0 {
        return Ok(());
    }
    let del_end = offset + length;
    for anno_id in tx.annotation_index().get(path) {
        let anno = tx.get(&anno_id)?;
        let (start, end) = offsets(&anno_id, anno.start_offset(), anno.end_offset())?;

        if start >= offset && end <= del_end {
            tx.delete(&anno_id)?;
            continue;
        }
        let new_start = collapse(start, offset, del_end, length);
        let new_end = collapse(end, offset, del_end, length);
        if new_start != start {
            set_offset(tx, &anno_id, "startOffset", new_start)?;
        }
        if new_end != end {
            set_offset(tx, &anno_id, "endOffset", new_end)?;
        }
    }
    Ok(())
}

/// Content from `offset` onwards moved from `path` to
/// `(new_path, new_offset)`: re-anchor the annotations that moved with
/// it. An annotation straddling the cut keeps its head and is truncated
/// at the boundary.
pub fn transfer_annotations(
    tx: &mut Transaction,
    path: &[String],
    offset: usize,
    new_path: &Path,
    new_offset: usize,
) -> Result<(), ModelError> {
    for anno_id in tx.annotation_index().get(path) {
        let anno = tx.get(&anno_id)?;
        let (start, end) = offsets(&anno_id, anno.start_offset(), anno.end_offset())?;

        if start >= offset {
            tx.update(
                &[anno_id.clone(), "path".to_string()],
                PropertyOp::Set {
                    value: json!(new_path),
                },
            )?;
            set_offset(tx, &anno_id, "startOffset", start - offset + new_offset)?;
            set_offset(tx, &anno_id, "endOffset", end - offset + new_offset)?;
        } else if end > offset {
            set_offset(tx, &anno_id, "endOffset", offset)?;
        }
    }
    Ok(())
}

fn collapse(pos: usize, del_start: usize, del_end: usize, length: usize) -> usize {
    if pos <= del_start {
        pos
    } else if pos >= del_end {
        pos - length
    } else {
        del_start
    }
}

fn offsets(
    anno_id: &str,
    start: Option<usize>,
    end: Option<usize>,
) -> Result<(usize, usize), ModelError> {
    match (start, end) {
        (Some(s), Some(e)) => Ok((s, e)),
        _ => Err(ModelError::InvalidStructure(format!(
            "annotation {} has no offsets",
            anno_id
        ))),
    }
}

fn set_offset(
    tx: &mut Transaction,
    anno_id: &str,
    property: &str,
    value: usize,
) -> Result<(), ModelError> {
    tx.update(
        &[anno_id.to_string(), property.to_string()],
        PropertyOp::Set {
            value: Value::from(value),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transact;
    use inkstone_model::{text_path, Document, Node, Schema, Selection};
    use serde_json::json;
    use std::sync::Arc;

    fn doc_with_anno(start: usize, end: usize) -> Document {
        let mut doc = Document::new(Arc::new(Schema::prose()));
        doc.create(Node::text("p1", "paragraph", "Hello world"))
            .unwrap();
        doc.create(Node::annotation("s1", "strong", text_path("p1"), start, end))
            .unwrap();
        doc
    }

    fn anno_range(doc: &Document) -> (usize, usize) {
        let anno = doc.get("s1").unwrap();
        (anno.start_offset().unwrap(), anno.end_offset().unwrap())
    }

    #[test]
    fn test_inserted_text_shifts_and_stretches() {
        // anno [6, 11); insert before it shifts both ends
        let mut doc = doc_with_anno(6, 11);
        doc.transact(Selection::Null, |tx| {
            tx.update(
                &text_path("p1"),
                PropertyOp::Insert {
                    offset: 0,
                    value: json!(">> "),
                },
            )?;
            inserted_text(tx, &text_path("p1"), 0, 3)?;
            Ok(None)
        })
        .unwrap();
        assert_eq!(anno_range(&doc), (9, 14));

        // anno [0, 5); insert at its end stretches it
        let mut doc = doc_with_anno(0, 5);
        doc.transact(Selection::Null, |tx| {
            tx.update(
                &text_path("p1"),
                PropertyOp::Insert {
                    offset: 5,
                    value: json!("!!"),
                },
            )?;
            inserted_text(tx, &text_path("p1"), 5, 2)?;
            Ok(None)
        })
        .unwrap();
        assert_eq!(anno_range(&doc), (0, 7));
    }

    #[test]
    fn test_deleted_text_shrinks_and_drops() {
        // deletion overlapping the front shrinks the annotation
        let mut doc = doc_with_anno(6, 11);
        doc.transact(Selection::Null, |tx| {
            tx.update(
                &text_path("p1"),
                PropertyOp::Delete { offset: 4, length: 4 },
            )?;
            deleted_text(tx, &text_path("p1"), 4, 4)?;
            Ok(None)
        })
        .unwrap();
        assert_eq!(anno_range(&doc), (4, 7));

        // deletion covering the annotation removes it
        let mut doc = doc_with_anno(6, 9);
        doc.transact(Selection::Null, |tx| {
            tx.update(
                &text_path("p1"),
                PropertyOp::Delete { offset: 5, length: 6 },
            )?;
            deleted_text(tx, &text_path("p1"), 5, 6)?;
            Ok(None)
        })
        .unwrap();
        assert!(!doc.contains("s1"));
    }

    #[test]
    fn test_transfer_moves_and_truncates() {
        // anno entirely after the cut moves to the new path
        let mut doc = doc_with_anno(6, 11);
        doc.create(Node::text("p2", "paragraph", "world")).unwrap();
        doc.transact(Selection::Null, |tx| {
            transfer_annotations(tx, &text_path("p1"), 6, &text_path("p2"), 0)?;
            Ok(None)
        })
        .unwrap();
        let anno = doc.get("s1").unwrap();
        assert_eq!(anno.anno_path(), Some(text_path("p2")));
        assert_eq!(anno_range(&doc), (0, 5));
        assert_eq!(
            doc.annotation_index().get(&text_path("p2")),
            vec!["s1".to_string()]
        );

        // anno straddling the cut keeps its head
        let mut doc = doc_with_anno(3, 8);
        doc.create(Node::text("p2", "paragraph", " world")).unwrap();
        doc.transact(Selection::Null, |tx| {
            transfer_annotations(tx, &text_path("p1"), 5, &text_path("p2"), 0)?;
            Ok(None)
        })
        .unwrap();
        let anno = doc.get("s1").unwrap();
        assert_eq!(anno.anno_path(), Some(text_path("p1")));
        assert_eq!(anno_range(&doc), (3, 5));
    }
}
