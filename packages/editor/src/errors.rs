//! Error types for the editor

use splice_dom::DomError;
use splice_markup::ParseError;
use splice_transform::TransformError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasteError {
    #[error("No editable target for event")]
    NoEditableTarget,

    #[error("No insertion point for the current selection")]
    NoInsertionPoint,

    #[error("Clipboard has no insertable content")]
    EmptyContent,

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] DomError),
}

impl PasteError {
    /// Kinds that leave the event untouched instead of failing the paste
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            PasteError::NoEditableTarget | PasteError::NoInsertionPoint | PasteError::EmptyContent
        )
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
