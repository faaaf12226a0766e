//! Structural context around a target node.
//!
//! The extractor only navigates the corpus graph. It never decides anything
//! about a node; that is left to the rules.

use corpus_utils::{CorpusGraph, Domain, Node, NodeType, Observed, Relation, Vocabulary};

use crate::error::ClassifyError;

/// The phrase level units a word belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseContext {
    pub phrase: Node,
    pub phrase_atom: Node,
    /// Outermost first. Empty when the word is not inside any subphrase.
    pub subphrases: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseContext {
    pub clause: Node,
    pub domain: Observed<Domain>,
}

pub struct ContextExtractor<'g, G> {
    graph: &'g G,
}

impl<G> Clone for ContextExtractor<'_, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G> Copy for ContextExtractor<'_, G> {}

impl<'g, G: CorpusGraph> ContextExtractor<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self { graph }
    }

    /// Reads a feature of `node` and validates it.
    pub fn observe<V: Vocabulary>(&self, node: Node) -> Observed<V> {
        self.graph.observe(node)
    }

    pub fn resolve_phrase_context(&self, word: Node) -> Result<PhraseContext, ClassifyError> {
        Ok(PhraseContext {
            phrase: self.unique_enclosing(word, NodeType::Phrase)?,
            phrase_atom: self.unique_enclosing(word, NodeType::PhraseAtom)?,
            subphrases: self.graph.enclosing_nodes(word, NodeType::Subphrase),
        })
    }

    pub fn resolve_clause_context(&self, verb: Node) -> Result<ClauseContext, ClassifyError> {
        let clause = self.unique_enclosing(verb, NodeType::Clause)?;
        Ok(ClauseContext {
            clause,
            domain: self.observe(clause),
        })
    }

    /// The lexeme node of the word right before `word`.
    ///
    /// `Ok(None)` at the start of the corpus. A preceding word without a
    /// lexeme is a malformed corpus and reported as such.
    pub fn resolve_preceding_lexeme(&self, word: Node) -> Result<Option<Node>, ClassifyError> {
        let Some(preceding) = self.graph.preceding_node(word, 1) else {
            return Ok(None);
        };
        self.unique_enclosing(preceding, NodeType::Lexeme).map(Some)
    }

    /// `rela` of every subphrase in the context, duplicates included.
    pub fn subphrase_relations(&self, context: &PhraseContext) -> Vec<Observed<Relation>> {
        context
            .subphrases
            .iter()
            .map(|subphrase| self.observe(*subphrase))
            .collect()
    }

    fn unique_enclosing(&self, node: Node, expected: NodeType) -> Result<Node, ClassifyError> {
        self.graph
            .enclosing_nodes(node, expected)
            .first()
            .copied()
            .ok_or(ClassifyError::MissingContext { node, expected })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus_utils::{CorpusBuilder, Feature, InMemoryCorpus, Lexeme};

    fn corpus() -> (InMemoryCorpus, Vec<Node>) {
        let mut builder = CorpusBuilder::new();
        let words: Vec<Node> = ["W", "HJH[", "MLK/"]
            .into_iter()
            .map(|lex| builder.word([(Feature::Lex, lex)]))
            .collect();
        for (word, lex) in words.iter().zip(["W", "HJH[", "MLK/"]) {
            builder.node(NodeType::Lexeme, [*word], [(Feature::Lex, lex)]);
        }
        builder.node(NodeType::Clause, words.clone(), [(Feature::Domain, "D")]);
        builder.node(NodeType::Phrase, words[2..].to_vec(), []);
        builder.node(NodeType::PhraseAtom, words[2..].to_vec(), [(Feature::Rela, "NA")]);
        builder.node(NodeType::Subphrase, words[2..].to_vec(), [(Feature::Rela, "atr")]);
        (builder.build().unwrap(), words)
    }

    #[test]
    fn test_resolve_phrase_context() {
        let (corpus, words) = corpus();
        let extractor = ContextExtractor::new(&corpus);

        let context = extractor.resolve_phrase_context(words[2]).unwrap();

        assert_eq!(context.phrase, Node::new(NodeType::Phrase, 1));
        assert_eq!(context.phrase_atom, Node::new(NodeType::PhraseAtom, 1));
        assert_eq!(context.subphrases, vec![Node::new(NodeType::Subphrase, 1)]);
        assert_eq!(
            extractor.subphrase_relations(&context),
            vec![Observed::Known(Relation::Attributive)]
        );
    }

    #[test]
    fn test_missing_phrase_is_an_error() {
        let (corpus, words) = corpus();
        let extractor = ContextExtractor::new(&corpus);

        assert_eq!(
            extractor.resolve_phrase_context(words[0]),
            Err(ClassifyError::MissingContext {
                node: words[0],
                expected: NodeType::Phrase
            })
        );
    }

    #[test]
    fn test_resolve_clause_context() {
        let (corpus, words) = corpus();
        let extractor = ContextExtractor::new(&corpus);

        let context = extractor.resolve_clause_context(words[1]).unwrap();

        assert_eq!(context.clause, Node::new(NodeType::Clause, 1));
        assert_eq!(context.domain, Observed::Known(Domain::Discourse));
    }

    #[test]
    fn test_resolve_preceding_lexeme() {
        let (corpus, words) = corpus();
        let extractor = ContextExtractor::new(&corpus);

        let lexeme = extractor.resolve_preceding_lexeme(words[1]).unwrap().unwrap();
        assert_eq!(lexeme, Node::new(NodeType::Lexeme, 1));
        assert_eq!(
            extractor.observe::<Lexeme>(lexeme),
            Observed::Known(Lexeme::new("W"))
        );
    }

    #[test]
    fn test_no_preceding_lexeme_at_corpus_start() {
        let (corpus, words) = corpus();
        let extractor = ContextExtractor::new(&corpus);

        assert_eq!(extractor.resolve_preceding_lexeme(words[0]), Ok(None));
    }
}
