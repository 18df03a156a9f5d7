use splice_dom::DomError;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Input too large: {size} bytes exceeds limit of {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("Nesting too deep: depth {depth} exceeds limit of {limit}")]
    TooDeep { depth: usize, limit: usize },

    #[error("Tree construction failed: {0}")]
    Tree(#[from] DomError),
}

impl ParseError {
    pub fn too_large(size: usize, limit: usize) -> Self {
        Self::TooLarge { size, limit }
    }

    pub fn too_deep(depth: usize, limit: usize) -> Self {
        Self::TooDeep { depth, limit }
    }
}
