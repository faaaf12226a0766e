use crate::features::{Feature, Observed, Vocabulary};
use crate::{Node, NodeType};

/// Read access to an annotated corpus.
///
/// This is everything the classifiers need from the corpus engine. The
/// graph is an immutable snapshot, so implementations are expected to be
/// cheap, synchronous lookups.
pub trait CorpusGraph {
    /// The raw value of `feature` on `node`, if it has one.
    fn feature_value(&self, node: Node, feature: Feature) -> Option<&str>;

    /// All nodes of type `target` that enclose `node`, in corpus order.
    ///
    /// For types that enclose a word uniquely (phrase, phrase atom, clause,
    /// lexeme) the first element is authoritative.
    fn enclosing_nodes(&self, node: Node, target: NodeType) -> Vec<Node>;

    /// The word `offset` positions before `node`, or `None` when that would
    /// run past the start of the corpus.
    fn preceding_node(&self, node: Node, offset: u32) -> Option<Node>;

    /// Reads a feature and validates it against its vocabulary.
    fn observe<V: Vocabulary>(&self, node: Node) -> Observed<V>
    where
        Self: Sized,
    {
        Observed::from_raw_logged(self.feature_value(node, V::FEATURE), node)
    }
}

impl<G: CorpusGraph + ?Sized> CorpusGraph for &G {
    fn feature_value(&self, node: Node, feature: Feature) -> Option<&str> {
        (**self).feature_value(node, feature)
    }

    fn enclosing_nodes(&self, node: Node, target: NodeType) -> Vec<Node> {
        (**self).enclosing_nodes(node, target)
    }

    fn preceding_node(&self, node: Node, offset: u32) -> Option<Node> {
        (**self).preceding_node(node, offset)
    }
}
