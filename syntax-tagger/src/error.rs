use corpus_utils::{Node, NodeType};

/// Why a node could not be classified.
///
/// A node that simply does not qualify is `Ok(false)`; these errors mean the
/// corpus is malformed around the node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize)]
pub enum ClassifyError {
    #[error("{node} has no enclosing {expected}")]
    MissingContext { node: Node, expected: NodeType },
}
