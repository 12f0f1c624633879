use thiserror::Error;

use crate::document::NodeId;

/// Reasons a selection cannot be applied to a document.
///
/// Navigation never surfaces these to the host: they are logged and the
/// previous selection (or the document end) is kept instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("node {0:?} is not attached to the document")]
    Detached(NodeId),

    #[error("node {0:?} lives outside the editable root")]
    OutsideRoot(NodeId),

    #[error("offset {offset} is out of range for node {node:?} (max {max})")]
    OffsetOutOfRange {
        node: NodeId,
        offset: usize,
        max: usize,
    },

    #[error("node {0:?} cannot be selected as a unit")]
    NotSelectable(NodeId),

    #[error("document has no caret positions")]
    NoCaretPositions,
}
