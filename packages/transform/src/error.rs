//! Error types for transforms

use splice_dom::DomError;
use splice_markup::ParseError;
use thiserror::Error;

pub type TransformResult<T> = Result<T, TransformError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Tree error: {0}")]
    Tree(#[from] DomError),
}
