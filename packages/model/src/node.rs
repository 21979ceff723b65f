//! # Node
//!
//! The atomic addressable unit of document content. A node is
//! `{ id, type, ...attrs }` with JSON-valued attributes, so any node
//! round-trips through serde exactly as it was created.
//!
//! Cross-node relationships are expressed as `[nodeId, property]` paths
//! or bare ids, never as object references.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A `[nodeId, property]` address, or a bare `[nodeId]` for whole-node
/// selection fragments.
pub type Path = Vec<String>;

/// Canonical text property of text nodes.
pub const CONTENT: &str = "content";

/// Build the canonical text path of a node.
pub fn text_path(node_id: &str) -> Path {
    vec![node_id.to_string(), CONTENT.to_string()]
}

/// Addressable unit of document content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,

    #[serde(rename = "type")]
    pub node_type: String,

    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            attrs: Map::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    /// Convenience constructor for a text node.
    pub fn text(id: impl Into<String>, node_type: impl Into<String>, content: &str) -> Self {
        Self::new(id, node_type).with_attr(CONTENT, content)
    }

    /// Convenience constructor for an annotation node.
    pub fn annotation(
        id: impl Into<String>,
        node_type: impl Into<String>,
        path: Path,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Self::new(id, node_type)
            .with_attr("path", Value::from(path))
            .with_attr("startOffset", start_offset)
            .with_attr("endOffset", end_offset)
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    /// The node's text content, when it has one.
    pub fn text_content(&self) -> Option<&str> {
        self.attrs.get(CONTENT).and_then(Value::as_str)
    }

    /// The ordered child-id list stored under `property`.
    pub fn child_ids(&self, property: &str) -> Option<Vec<String>> {
        let items = self.attrs.get(property)?.as_array()?;
        Some(
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        )
    }

    // Annotation accessors. These return `None` on non-annotation nodes.

    pub fn anno_path(&self) -> Option<Path> {
        let items = self.attrs.get("path")?.as_array()?;
        Some(
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        )
    }

    pub fn start_offset(&self) -> Option<usize> {
        self.attrs.get("startOffset")?.as_u64().map(|v| v as usize)
    }

    pub fn end_offset(&self) -> Option<usize> {
        self.attrs.get("endOffset")?.as_u64().map(|v| v as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_json_round_trip() {
        let node = Node::text("p1", "paragraph", "Hello");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json, json!({ "id": "p1", "type": "paragraph", "content": "Hello" }));

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_annotation_accessors() {
        let anno = Node::annotation("s1", "strong", text_path("p1"), 2, 5);
        assert_eq!(anno.anno_path(), Some(text_path("p1")));
        assert_eq!(anno.start_offset(), Some(2));
        assert_eq!(anno.end_offset(), Some(5));
    }

    #[test]
    fn test_child_ids() {
        let container = Node::new("body", "container").with_attr("nodes", json!(["p1", "p2"]));
        assert_eq!(
            container.child_ids("nodes"),
            Some(vec!["p1".to_string(), "p2".to_string()])
        );
        assert_eq!(container.child_ids("items"), None);
    }
}
