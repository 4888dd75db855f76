//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Domain errors represent violations of the cluster model.
///
/// Store mutations never return these: invalid ids and empty labels are
/// silent no-ops. They surface from parsing and from index construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid color '{input}': {reason}")]
    InvalidColor { input: String, reason: String },

    #[error("invalid node id: {0}")]
    InvalidNodeId(String),

    #[error("cycle detected in cluster hierarchy at: {0}")]
    CycleDetected(NodeId),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
