//! Error types for the document model

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Property not found: {0}")]
    PropertyNotFound(String),

    #[error("Duplicate node id: {0}")]
    DuplicateId(String),

    #[error("Offset out of range: {offset} (length {len})")]
    OutOfRange { offset: usize, len: usize },

    #[error("Unknown node type: {0}")]
    UnknownType(String),

    #[error("Node is not a container: {0}")]
    NotAContainer(String),

    #[error("Node is not text: {0}")]
    NotText(String),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}
