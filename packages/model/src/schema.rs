//! # Schema
//!
//! Registry of node-type definitions. Populated when a document is
//! constructed, read-only afterwards. Answers type-hierarchy queries
//! (`is_instance_of`) and knows the default text type used when plain
//! text is converted into nodes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known abstract base type for text-bearing nodes.
pub const TEXT_TYPE: &str = "text";

/// Well-known abstract base type for range-anchored annotations.
pub const ANNOTATION_TYPE: &str = "annotation";

/// A single node-type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeType {
    pub name: String,

    /// Parent type in the hierarchy (e.g. `paragraph` extends `text`).
    pub parent: Option<String>,

    /// Attribute holding this type's ordered child-id list, if the type
    /// is a composite (e.g. `container.nodes`, `list.items`).
    pub children_property: Option<String>,
}

impl NodeType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children_property: None,
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_children(mut self, property: impl Into<String>) -> Self {
        self.children_property = Some(property.into());
        self
    }
}

/// Node-type registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    types: HashMap<String, NodeType>,
    default_text_type: String,
}

impl Schema {
    /// Create an empty schema with the given default text type.
    /// The abstract `text` and `annotation` bases are pre-registered.
    pub fn new(default_text_type: impl Into<String>) -> Self {
        let mut schema = Self {
            types: HashMap::new(),
            default_text_type: default_text_type.into(),
        };
        schema.register(NodeType::new(TEXT_TYPE));
        schema.register(NodeType::new(ANNOTATION_TYPE));
        schema
    }

    /// The built-in prose schema: paragraphs and headings inside
    /// containers, inline annotations, and nested lists.
    pub fn prose() -> Self {
        let mut schema = Self::new("paragraph");
        schema.register(NodeType::new("container").with_children("nodes"));
        schema.register(NodeType::new("paragraph").extends(TEXT_TYPE));
        schema.register(NodeType::new("heading").extends(TEXT_TYPE));
        schema.register(NodeType::new("list").with_children("items"));
        schema.register(NodeType::new("list-item").extends(TEXT_TYPE));
        schema.register(NodeType::new("strong").extends(ANNOTATION_TYPE));
        schema.register(NodeType::new("emphasis").extends(ANNOTATION_TYPE));
        schema.register(NodeType::new("link").extends(ANNOTATION_TYPE));
        schema
    }

    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.name.clone(), node_type);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Walk the parent chain. Unregistered types answer `false`,
    /// never an error.
    pub fn is_instance_of(&self, name: &str, base: &str) -> bool {
        let mut current = name;
        let mut hops = 0;
        loop {
            if current == base {
                return self.types.contains_key(current);
            }
            match self.types.get(current).and_then(|t| t.parent.as_deref()) {
                Some(parent) => current = parent,
                None => return false,
            }
            // guards against accidental cycles in a hand-built registry
            hops += 1;
            if hops > self.types.len() {
                return false;
            }
        }
    }

    pub fn is_text(&self, name: &str) -> bool {
        self.is_instance_of(name, TEXT_TYPE)
    }

    pub fn is_annotation(&self, name: &str) -> bool {
        self.is_instance_of(name, ANNOTATION_TYPE)
    }

    pub fn default_text_type(&self) -> &str {
        &self.default_text_type
    }

    /// The child-id-list attribute for a type, inherited along the
    /// parent chain.
    pub fn children_property(&self, name: &str) -> Option<&str> {
        let mut current = name;
        let mut hops = 0;
        while let Some(t) = self.types.get(current) {
            if let Some(prop) = t.children_property.as_deref() {
                return Some(prop);
            }
            match t.parent.as_deref() {
                Some(parent) => current = parent,
                None => return None,
            }
            hops += 1;
            if hops > self.types.len() {
                return None;
            }
        }
        None
    }
}
