use crate::NodeKey;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("node {0:?} does not exist in this document")]
    MissingKey(NodeKey),
    #[error("node {0:?} has the wrong kind for this operation")]
    WrongNodeKind(NodeKey),
    #[error("node {0:?} cannot take this parent/child role")]
    InvalidParent(NodeKey),
    #[error("appending {child:?} under {parent:?} would create a cycle")]
    CycleDetected { parent: NodeKey, child: NodeKey },
}
