//! Error types for tree operations.
//!
//! Simple, flat error hierarchy.

use crate::types::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("node {0} is not attached to a parent")]
    Detached(NodeId),

    #[error("node {child} is not a child of node {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("no root node set")]
    MissingRoot,
}
