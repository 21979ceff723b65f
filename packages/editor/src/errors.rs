//! Error types for the editor

use inkstone_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}
