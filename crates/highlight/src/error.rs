//! Error types for the highlighting pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HighlightError>;

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("failed to compile query pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("match at bytes {start}..{end} not bound to any text node")]
    UnboundMatch { start: usize, end: usize },

    #[error("match offsets do not line up with node {0}")]
    Misaligned(dom::NodeId),

    #[error(transparent)]
    Dom(#[from] dom::DomError),
}
