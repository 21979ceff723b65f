//! # Selection
//!
//! The addressing value every edit targets and every transform returns.
//! A closed tagged union over property ranges, container ranges, whole
//! nodes, and the null selection. Selections are immutable values; they
//! are copied, never mutated in place.
//!
//! The `surface_id` tag is owned by the consuming UI layer. The model
//! preserves it verbatim and never interprets it.

use crate::node::Path;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Selection {
    /// No selection.
    Null,

    /// Cursor or range inside one text property.
    #[serde(rename_all = "camelCase")]
    Property {
        path: Path,
        start_offset: usize,
        end_offset: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        surface_id: Option<String>,
    },

    /// Range spanning one or more nodes inside a container. A path of
    /// `[nodeId]` with offsets `0..1` addresses the whole node.
    #[serde(rename_all = "camelCase")]
    Container {
        container_id: String,
        start_path: Path,
        start_offset: usize,
        end_path: Path,
        end_offset: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        surface_id: Option<String>,
    },

    /// Whole-node selection, a derived form of the container variant.
    #[serde(rename_all = "camelCase")]
    Node {
        container_id: String,
        node_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        surface_id: Option<String>,
    },
}

impl Selection {
    /// Collapsed cursor inside a text property.
    pub fn cursor(path: Path, offset: usize) -> Self {
        Selection::Property {
            path,
            start_offset: offset,
            end_offset: offset,
            surface_id: None,
        }
    }

    /// Range inside a text property.
    pub fn property(path: Path, start_offset: usize, end_offset: usize) -> Self {
        Selection::Property {
            path,
            start_offset,
            end_offset,
            surface_id: None,
        }
    }

    /// Range spanning nodes inside a container.
    pub fn container(
        container_id: impl Into<String>,
        start_path: Path,
        start_offset: usize,
        end_path: Path,
        end_offset: usize,
    ) -> Self {
        Selection::Container {
            container_id: container_id.into(),
            start_path,
            start_offset,
            end_path,
            end_offset,
            surface_id: None,
        }
    }

    /// Whole-node selection.
    pub fn node(container_id: impl Into<String>, node_id: impl Into<String>) -> Self {
        Selection::Node {
            container_id: container_id.into(),
            node_id: node_id.into(),
            surface_id: None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Selection::Null)
    }

    pub fn is_collapsed(&self) -> bool {
        match self {
            Selection::Null => true,
            Selection::Property {
                start_offset,
                end_offset,
                ..
            } => start_offset == end_offset,
            Selection::Container {
                start_path,
                start_offset,
                end_path,
                end_offset,
                ..
            } => start_path == end_path && start_offset == end_offset,
            Selection::Node { .. } => false,
        }
    }

    pub fn surface_id(&self) -> Option<&str> {
        match self {
            Selection::Null => None,
            Selection::Property { surface_id, .. }
            | Selection::Container { surface_id, .. }
            | Selection::Node { surface_id, .. } => surface_id.as_deref(),
        }
    }

    /// Attach a surface tag, preserving it through transform chains.
    pub fn with_surface(mut self, surface: Option<String>) -> Self {
        match &mut self {
            Selection::Null => {}
            Selection::Property { surface_id, .. }
            | Selection::Container { surface_id, .. }
            | Selection::Node { surface_id, .. } => *surface_id = surface,
        }
        self
    }

    /// Id of the node the selection starts in.
    pub fn start_node_id(&self) -> Option<&str> {
        match self {
            Selection::Property { path, .. } => path.first().map(String::as_str),
            Selection::Container { start_path, .. } => start_path.first().map(String::as_str),
            Selection::Node { node_id, .. } => Some(node_id),
            Selection::Null => None,
        }
    }

    /// Rewrite the derived `Node` form into its degenerate container
    /// equivalent; all other variants pass through unchanged.
    pub fn normalized(self) -> Self {
        match self {
            Selection::Node {
                container_id,
                node_id,
                surface_id,
            } => Selection::Container {
                container_id,
                start_path: vec![node_id.clone()],
                start_offset: 0,
                end_path: vec![node_id],
                end_offset: 1,
                surface_id,
            },
            other => other,
        }
    }
}
