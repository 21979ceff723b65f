use inkstone_editor::{copy_selection, paste, EditSession, PasteArgs, Transact};
use inkstone_model::{text_path, Document, Node, Schema, Selection, SNIPPET_ID};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

fn doc() -> Document {
    let mut doc = Document::new(Arc::new(Schema::prose()));
    doc.create(Node::new("body", "container").with_attr("nodes", json!([])))
        .unwrap();
    doc.create(Node::text("p1", "paragraph", "Hello world"))
        .unwrap();
    doc.create(Node::text("p2", "paragraph", "Second paragraph"))
        .unwrap();
    doc.show("body", "p1", None).unwrap();
    doc.show("body", "p2", None).unwrap();
    doc
}

fn paste_once(doc: &mut Document, selection: Selection, args: PasteArgs) -> Selection {
    let (sel, _) = doc
        .transact(selection, |tx| paste(tx, args).map(Some))
        .unwrap();
    sel.unwrap()
}

fn body_texts(doc: &Document) -> Vec<String> {
    doc.container_nodes("body")
        .unwrap()
        .iter()
        .map(|id| doc.get_text(&text_path(id)).unwrap())
        .collect()
}

#[test]
fn test_single_line_text_merges_inline() {
    let mut doc = doc();
    let before = Selection::cursor(text_path("p1"), 6);
    let sel = paste_once(
        &mut doc,
        before.clone(),
        PasteArgs {
            selection: before,
            container_id: Some("body".to_string()),
            text: Some("brave ".to_string()),
            snippet: None,
        },
    );

    assert_eq!(body_texts(&doc), vec!["Hello brave world", "Second paragraph"]);
    assert_eq!(sel, Selection::cursor(text_path("p1"), 12));
}

#[test]
fn test_blank_line_split_creates_paragraphs() {
    let mut doc = doc();
    let before = Selection::cursor(text_path("p1"), 5);
    let sel = paste_once(
        &mut doc,
        before.clone(),
        PasteArgs {
            selection: before,
            container_id: Some("body".to_string()),
            text: Some("One\n\nTwo".to_string()),
            snippet: None,
        },
    );

    // "One" splices into p1, the cursor node splits, "Two" lands between
    assert_eq!(
        body_texts(&doc),
        vec!["HelloOne", "Two", " world", "Second paragraph"]
    );
    let ids = doc.container_nodes("body").unwrap();
    assert_eq!(
        sel,
        Selection::container("body", vec![ids[1].clone()], 0, vec![ids[1].clone()], 1)
    );
}

#[test]
fn test_text_without_container_falls_back_to_insert() {
    let mut doc = doc();
    let before = Selection::cursor(text_path("p1"), 5);
    let sel = paste_once(
        &mut doc,
        before.clone(),
        PasteArgs {
            selection: before,
            container_id: None,
            text: Some("!".to_string()),
            snippet: None,
        },
    );

    assert_eq!(doc.get_text(&text_path("p1")).unwrap(), "Hello! world");
    assert_eq!(sel, Selection::cursor(text_path("p1"), 6));
}

#[test]
fn test_copy_paste_round_trip_re_anchors_annotations() -> anyhow::Result<()> {
    let mut doc = doc();
    doc.create(Node::annotation("s1", "strong", text_path("p1"), 2, 5))?;

    let snippet = copy_selection(&doc, &Selection::property(text_path("p1"), 0, 11))?
        .expect("non-collapsed selection yields a snippet");

    let before = Selection::cursor(text_path("p2"), 5);
    let sel = paste_once(
        &mut doc,
        before.clone(),
        PasteArgs {
            selection: before,
            container_id: Some("body".to_string()),
            text: None,
            snippet: Some(snippet),
        },
    );

    assert_eq!(
        doc.get_text(&text_path("p2")).unwrap(),
        "SeconHello worldd paragraph"
    );
    assert_eq!(sel, Selection::cursor(text_path("p2"), 16));

    // the copied annotation lands shifted by the insertion offset, under
    // a fresh id since "s1" is taken by the original
    let annos = doc.annotation_index().get(&text_path("p2"));
    assert_eq!(annos.len(), 1);
    let anno = doc.get(&annos[0]).unwrap();
    assert_ne!(anno.id, "s1");
    assert_eq!(anno.start_offset(), Some(7));
    assert_eq!(anno.end_offset(), Some(10));
    // the original is untouched
    assert_eq!(doc.get("s1")?.start_offset(), Some(2));
    Ok(())
}

#[test]
fn test_double_paste_keeps_ids_unique() {
    let mut doc = doc();
    let snippet = copy_selection(
        &doc,
        &Selection::container("body", vec!["p1".to_string()], 0, vec!["p2".to_string()], 1),
    )
    .unwrap()
    .unwrap();
    assert_eq!(snippet.container_nodes(SNIPPET_ID).unwrap(), vec!["p1", "p2"]);

    let at_end_of = |doc: &Document, id: &str| {
        let len = doc.get_text(&text_path(id)).unwrap().chars().count();
        Selection::cursor(text_path(id), len)
    };

    let before = at_end_of(&doc, "p2");
    paste_once(
        &mut doc,
        before.clone(),
        PasteArgs {
            selection: before,
            container_id: Some("body".to_string()),
            text: None,
            snippet: Some(snippet.clone()),
        },
    );
    let before = at_end_of(&doc, "p1");
    paste_once(
        &mut doc,
        before.clone(),
        PasteArgs {
            selection: before,
            container_id: Some("body".to_string()),
            text: None,
            snippet: Some(snippet),
        },
    );

    let ids = doc.container_nodes("body").unwrap();
    assert_eq!(ids.len(), 4);
    let unique: HashSet<&String> = ids.iter().collect();
    assert_eq!(unique.len(), 4);
}

#[test]
fn test_block_paste_at_end_of_node_does_not_split() {
    let mut doc = doc();
    let mut snippet = Document::snippet(doc.schema_handle()).unwrap();
    snippet
        .create(Node::text("li1", "list-item", "item one"))
        .unwrap();
    snippet
        .create(Node::new("l1", "list").with_attr("items", json!(["li1"])))
        .unwrap();
    snippet.show(SNIPPET_ID, "l1", None).unwrap();

    let before = Selection::cursor(text_path("p1"), 11);
    let sel = paste_once(
        &mut doc,
        before.clone(),
        PasteArgs {
            selection: before,
            container_id: Some("body".to_string()),
            text: None,
            snippet: Some(snippet),
        },
    );

    assert_eq!(doc.container_nodes("body").unwrap(), vec!["p1", "l1", "p2"]);
    assert_eq!(doc.get_text(&text_path("p1")).unwrap(), "Hello world");
    assert_eq!(doc.get("l1").unwrap().child_ids("items"), Some(vec!["li1".to_string()]));
    assert_eq!(
        sel,
        Selection::container("body", vec!["l1".to_string()], 0, vec!["l1".to_string()], 1)
    );
}

#[test]
fn test_block_paste_mid_node_splits_first() {
    let mut doc = doc();
    let mut snippet = Document::snippet(doc.schema_handle()).unwrap();
    snippet
        .create(Node::text("li1", "list-item", "item one"))
        .unwrap();
    snippet
        .create(Node::new("l1", "list").with_attr("items", json!(["li1"])))
        .unwrap();
    snippet.show(SNIPPET_ID, "l1", None).unwrap();

    let before = Selection::cursor(text_path("p1"), 5);
    paste_once(
        &mut doc,
        before.clone(),
        PasteArgs {
            selection: before,
            container_id: Some("body".to_string()),
            text: None,
            snippet: Some(snippet),
        },
    );

    let ids = doc.container_nodes("body").unwrap();
    assert_eq!(ids.len(), 4);
    assert_eq!(ids[0], "p1");
    assert_eq!(ids[1], "l1");
    assert_eq!(ids[3], "p2");
    assert_eq!(doc.get_text(&text_path("p1")).unwrap(), "Hello");
    assert_eq!(doc.get_text(&text_path(&ids[2])).unwrap(), " world");
}

#[test]
fn test_block_paste_into_empty_anchor_keeps_it() {
    let mut doc = doc();
    doc.create(Node::text("p0", "paragraph", "")).unwrap();
    doc.show("body", "p0", Some(0)).unwrap();

    let mut snippet = Document::snippet(doc.schema_handle()).unwrap();
    snippet
        .create(Node::text("li1", "list-item", "item one"))
        .unwrap();
    snippet
        .create(Node::new("l1", "list").with_attr("items", json!(["li1"])))
        .unwrap();
    snippet.show(SNIPPET_ID, "l1", None).unwrap();

    let before = Selection::cursor(text_path("p0"), 0);
    paste_once(
        &mut doc,
        before.clone(),
        PasteArgs {
            selection: before,
            container_id: Some("body".to_string()),
            text: None,
            snippet: Some(snippet),
        },
    );

    // an empty anchor counts as cursor-at-end: no split, no removal,
    // the pasted block lands right after it
    assert_eq!(doc.get_text(&text_path("p0")).unwrap(), "");
    assert_eq!(
        doc.container_nodes("body").unwrap(),
        vec!["p0", "l1", "p1", "p2"]
    );
}

#[test]
fn test_block_paste_remaps_subtree_ids_and_annotations() {
    let mut doc = doc();
    // occupy the snippet's child id so the copy has to remap it
    doc.create(Node::text("li1", "list-item", "taken")).unwrap();

    let mut snippet = Document::snippet(doc.schema_handle()).unwrap();
    snippet
        .create(Node::text("li1", "list-item", "item one"))
        .unwrap();
    snippet
        .create(Node::new("l1", "list").with_attr("items", json!(["li1"])))
        .unwrap();
    snippet
        .create(Node::annotation("em1", "emphasis", text_path("li1"), 0, 4))
        .unwrap();
    snippet.show(SNIPPET_ID, "l1", None).unwrap();

    let before = Selection::cursor(text_path("p1"), 11);
    paste_once(
        &mut doc,
        before.clone(),
        PasteArgs {
            selection: before,
            container_id: Some("body".to_string()),
            text: None,
            snippet: Some(snippet),
        },
    );

    let item_ids = doc.get("l1").unwrap().child_ids("items").unwrap();
    assert_eq!(item_ids.len(), 1);
    let item_id = &item_ids[0];
    assert_ne!(item_id, "li1");
    assert_eq!(doc.get_text(&text_path(item_id)).unwrap(), "item one");
    assert_eq!(doc.get_text(&text_path("li1")).unwrap(), "taken");

    // the annotation followed its node onto the remapped path
    assert_eq!(doc.annotation_index().get(&text_path(item_id)), vec!["em1"]);
    let anno = doc.get("em1").unwrap();
    assert_eq!(anno.start_offset(), Some(0));
    assert_eq!(anno.end_offset(), Some(4));
}

#[test]
fn test_paste_replaces_selected_range() {
    let mut doc = doc();
    let before = Selection::property(text_path("p1"), 0, 5);
    paste_once(
        &mut doc,
        before.clone(),
        PasteArgs {
            selection: before,
            container_id: Some("body".to_string()),
            text: Some("Goodbye".to_string()),
            snippet: None,
        },
    );
    assert_eq!(doc.get_text(&text_path("p1")).unwrap(), "Goodbye world");
}

#[test]
fn test_null_selection_is_a_noop() {
    let mut doc = doc();
    let snapshot = doc.clone();
    let (sel, change) = doc
        .transact(Selection::Null, |tx| {
            paste(
                tx,
                PasteArgs {
                    selection: Selection::Null,
                    container_id: Some("body".to_string()),
                    text: Some("ignored".to_string()),
                    snippet: None,
                },
            )
            .map(Some)
        })
        .unwrap();

    assert_eq!(doc, snapshot);
    assert_eq!(sel, Some(Selection::Null));
    assert!(change.is_empty());
}

#[test]
fn test_paste_undo_redo() -> anyhow::Result<()> {
    let mut session = EditSession::new(doc());
    session.set_selection(Selection::cursor(text_path("p1"), 5));

    session.apply(|tx| {
        let args = PasteArgs {
            selection: tx.before().clone(),
            container_id: Some("body".to_string()),
            text: Some("One\n\nTwo".to_string()),
            snippet: None,
        };
        paste(tx, args).map(Some)
    })?;
    let pasted = body_texts(session.document());
    assert_eq!(pasted.len(), 4);

    assert!(session.undo()?);
    assert_eq!(
        body_texts(session.document()),
        vec!["Hello world", "Second paragraph"]
    );
    assert_eq!(
        session.selection(),
        &Selection::cursor(text_path("p1"), 5)
    );

    assert!(session.redo()?);
    assert_eq!(body_texts(session.document()), pasted);
    Ok(())
}
