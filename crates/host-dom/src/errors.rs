use thiserror::Error;

use crate::tree::NodeId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("hierarchy request error: {0}")]
    HierarchyRequest(String),
}
