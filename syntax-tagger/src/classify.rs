use corpus_utils::{
    CorpusGraph, Domain, Lexeme, Node, Observed, PhraseDependentPos, Relation, Tense,
};

use crate::context::ContextExtractor;
use crate::error::ClassifyError;
use crate::rules::{Failure, FeatureBundle, Predicate, Rule, Slot};

/// Lexeme of the conjunction waw
pub const WAW: &str = "W";

#[derive(
    Clone,
    Copy,
    Debug,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    serde::Serialize,
    parse_display::Display,
    parse_display::FromStr,
)]
#[serde(rename_all = "kebab-case")]
#[display(style = "kebab-case")]
pub enum ClassifierKind {
    HeadSubstantive,
    Weqetal,
}

impl ClassifierKind {
    pub const ALL: [ClassifierKind; 2] = [ClassifierKind::HeadSubstantive, ClassifierKind::Weqetal];
}

/// A yes/no grammatical category that the corpus does not tag directly.
///
/// Classification happens in two steps. The gate looks only at the node's
/// own features; when it fails the node is not a candidate and no context is
/// resolved at all. Otherwise the context is gathered and the main rule
/// decides.
pub trait NodeClassifier<G: CorpusGraph>: Send + Sync {
    fn kind(&self) -> ClassifierKind;

    fn gate(&self) -> &Rule;

    fn rule(&self) -> &Rule;

    /// Features of the node itself
    fn gate_bundle(&self, extractor: &ContextExtractor<'_, G>, node: Node) -> FeatureBundle;

    /// Features of the node's surroundings
    fn context_bundle(
        &self,
        extractor: &ContextExtractor<'_, G>,
        node: Node,
    ) -> Result<FeatureBundle, ClassifyError>;

    fn classify(
        &self,
        extractor: &ContextExtractor<'_, G>,
        node: Node,
    ) -> Result<bool, ClassifyError> {
        if !self.gate().evaluate(&self.gate_bundle(extractor, node)) {
            log::trace!("{node} is not a {} candidate", self.kind());
            return Ok(false);
        }
        let result = self
            .rule()
            .evaluate(&self.context_bundle(extractor, node)?);
        log::debug!("{node} {}: {result}", self.kind());
        Ok(result)
    }

    /// The predicates that keep `node` out of the category. Empty when the
    /// node qualifies.
    fn explain(
        &self,
        extractor: &ContextExtractor<'_, G>,
        node: Node,
    ) -> Result<Vec<Failure>, ClassifyError> {
        let failures = self.gate().explain(&self.gate_bundle(extractor, node));
        if !failures.is_empty() {
            return Ok(failures);
        }
        Ok(self
            .rule()
            .explain(&self.context_bundle(extractor, node)?))
    }
}

/// Get the classifier for a given category
pub fn get_classifier<G: CorpusGraph>(kind: ClassifierKind) -> Box<dyn NodeClassifier<G>> {
    match kind {
        ClassifierKind::HeadSubstantive => Box::new(HeadSubstantive::default()),
        ClassifierKind::Weqetal => Box::new(Weqetal::default()),
    }
}

/// A substantive at the head of its phrase: a noun that is not in apposition
/// or a specification, and that is not a nomen rectum, adjunct, attribute,
/// modifier or demonstrative inside a subphrase.
///
/// Known false positives are accepted. In Gen 20:5 both היא pronouns come out
/// as heads, although only one of them is the subject.
#[derive(Debug, Clone)]
pub struct HeadSubstantive {
    gate: Rule,
    rule: Rule,
}

impl Default for HeadSubstantive {
    fn default() -> Self {
        Self {
            gate: Rule::new(
                "head_substantive.pdp",
                vec![Predicate::member(
                    Slot::WordPos,
                    [PhraseDependentPos::Substantive],
                )],
            ),
            rule: Rule::new(
                "head_substantive",
                vec![
                    Predicate::disjoint(
                        Slot::PhraseAtomRelation,
                        [Relation::Apposition, Relation::Specification],
                    ),
                    Predicate::disjoint(
                        Slot::SubphraseRelations,
                        [
                            Relation::NomenRectum,
                            Relation::Adjunct,
                            Relation::Attributive,
                            Relation::Modifier,
                            Relation::Demonstrative,
                        ],
                    ),
                ],
            ),
        }
    }
}

impl<G: CorpusGraph> NodeClassifier<G> for HeadSubstantive {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::HeadSubstantive
    }

    fn gate(&self) -> &Rule {
        &self.gate
    }

    fn rule(&self) -> &Rule {
        &self.rule
    }

    fn gate_bundle(&self, extractor: &ContextExtractor<'_, G>, word: Node) -> FeatureBundle {
        FeatureBundle::new().with_value(
            Slot::WordPos,
            extractor.observe::<PhraseDependentPos>(word),
        )
    }

    fn context_bundle(
        &self,
        extractor: &ContextExtractor<'_, G>,
        word: Node,
    ) -> Result<FeatureBundle, ClassifyError> {
        let context = extractor.resolve_phrase_context(word)?;
        Ok(FeatureBundle::new()
            .with_value(
                Slot::PhraseAtomRelation,
                extractor.observe::<Relation>(context.phrase_atom),
            )
            .with_values(
                Slot::SubphraseRelations,
                extractor.subphrase_relations(&context),
            ))
    }
}

/// A perfect used as a weqetal. The database only stores the qatal, so the
/// weqetal is recognized by the waw attached right before it in discourse or
/// quotation.
#[derive(Debug, Clone)]
pub struct Weqetal {
    gate: Rule,
    rule: Rule,
}

impl Default for Weqetal {
    fn default() -> Self {
        Self {
            gate: Rule::new(
                "weqetal.tense",
                vec![Predicate::member(Slot::VerbTense, [Tense::Perfect])],
            ),
            rule: Rule::new(
                "weqetal",
                vec![
                    Predicate::member(Slot::PrecedingLexeme, [Lexeme::new(WAW)]),
                    Predicate::member(Slot::ClauseDomain, [Domain::Discourse, Domain::Quotation]),
                ],
            ),
        }
    }
}

impl<G: CorpusGraph> NodeClassifier<G> for Weqetal {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Weqetal
    }

    fn gate(&self) -> &Rule {
        &self.gate
    }

    fn rule(&self) -> &Rule {
        &self.rule
    }

    fn gate_bundle(&self, extractor: &ContextExtractor<'_, G>, verb: Node) -> FeatureBundle {
        FeatureBundle::new().with_value(Slot::VerbTense, extractor.observe::<Tense>(verb))
    }

    fn context_bundle(
        &self,
        extractor: &ContextExtractor<'_, G>,
        verb: Node,
    ) -> Result<FeatureBundle, ClassifyError> {
        // no preceding word means no attached waw
        let preceding = match extractor.resolve_preceding_lexeme(verb)? {
            Some(lexeme) => extractor.observe::<Lexeme>(lexeme),
            None => {
                log::debug!("{verb} is at the start of the corpus");
                Observed::Absent
            }
        };
        let clause = extractor.resolve_clause_context(verb)?;

        Ok(FeatureBundle::new()
            .with_value(Slot::PrecedingLexeme, preceding)
            .with_value(Slot::ClauseDomain, clause.domain))
    }
}

/// Both classifiers bound to one corpus.
pub struct Tagger<'g, G> {
    extractor: ContextExtractor<'g, G>,
    head_substantive: HeadSubstantive,
    weqetal: Weqetal,
}

impl<'g, G: CorpusGraph> Tagger<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self {
            extractor: ContextExtractor::new(graph),
            head_substantive: HeadSubstantive::default(),
            weqetal: Weqetal::default(),
        }
    }

    pub fn classifier(&self, kind: ClassifierKind) -> &dyn NodeClassifier<G> {
        match kind {
            ClassifierKind::HeadSubstantive => &self.head_substantive,
            ClassifierKind::Weqetal => &self.weqetal,
        }
    }

    pub fn is_head_substantive(&self, word: Node) -> Result<bool, ClassifyError> {
        self.classify(ClassifierKind::HeadSubstantive, word)
    }

    pub fn is_weqetal(&self, verb: Node) -> Result<bool, ClassifyError> {
        self.classify(ClassifierKind::Weqetal, verb)
    }

    pub fn classify(&self, kind: ClassifierKind, node: Node) -> Result<bool, ClassifyError> {
        self.classifier(kind).classify(&self.extractor, node)
    }

    pub fn explain(&self, kind: ClassifierKind, node: Node) -> Result<Vec<Failure>, ClassifyError> {
        self.classifier(kind).explain(&self.extractor, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus_utils::{CorpusBuilder, Feature, InMemoryCorpus, NodeType};

    /// One word in its own phrase, phrase atom and clause.
    fn lone_word<'a>(
        features: impl IntoIterator<Item = (Feature, &'a str)>,
    ) -> (InMemoryCorpus, Node) {
        let mut builder = CorpusBuilder::new();
        let word = builder.word(features);
        builder.node(NodeType::Phrase, [word], []);
        builder.node(NodeType::PhraseAtom, [word], [(Feature::Rela, "NA")]);
        builder.node(NodeType::Clause, [word], [(Feature::Domain, "D")]);
        (builder.build().unwrap(), word)
    }

    #[test]
    fn test_classifier_kind_names() {
        assert_eq!(ClassifierKind::HeadSubstantive.to_string(), "head-substantive");
        assert_eq!(
            "weqetal".parse::<ClassifierKind>().unwrap(),
            ClassifierKind::Weqetal
        );
        assert!("subject".parse::<ClassifierKind>().is_err());
    }

    #[test]
    fn test_get_classifier() {
        for kind in ClassifierKind::ALL {
            let classifier = get_classifier::<InMemoryCorpus>(kind);
            assert_eq!(classifier.kind(), kind);
        }
    }

    #[test]
    fn test_pdp_gate_skips_context() {
        // a verb with no phrase at all is still a plain "no"
        let mut builder = CorpusBuilder::new();
        let word = builder.word([(Feature::Pdp, "verb")]);
        let corpus = builder.build().unwrap();

        assert_eq!(Tagger::new(&corpus).is_head_substantive(word), Ok(false));
    }

    #[test]
    fn test_tense_gate_skips_context() {
        let mut builder = CorpusBuilder::new();
        let verb = builder.word([(Feature::Vt, "wayq")]);
        let corpus = builder.build().unwrap();

        assert_eq!(Tagger::new(&corpus).is_weqetal(verb), Ok(false));
    }

    #[test]
    fn test_missing_phrase_atom_is_reported() {
        let mut builder = CorpusBuilder::new();
        let word = builder.word([(Feature::Pdp, "subs")]);
        builder.node(NodeType::Phrase, [word], []);
        let corpus = builder.build().unwrap();

        assert_eq!(
            Tagger::new(&corpus).is_head_substantive(word),
            Err(ClassifyError::MissingContext {
                node: word,
                expected: NodeType::PhraseAtom
            })
        );
    }

    #[test]
    fn test_missing_clause_is_reported() {
        let mut builder = CorpusBuilder::new();
        let waw = builder.word([(Feature::Lex, WAW)]);
        builder.node(NodeType::Lexeme, [waw], [(Feature::Lex, WAW)]);
        let verb = builder.word([(Feature::Vt, "perf")]);
        let corpus = builder.build().unwrap();

        assert_eq!(
            Tagger::new(&corpus).is_weqetal(verb),
            Err(ClassifyError::MissingContext {
                node: verb,
                expected: NodeType::Clause
            })
        );
    }

    #[test]
    fn test_unrecognized_pdp_fails_closed() {
        let (corpus, word) = lone_word([(Feature::Pdp, "noun")]);

        assert_eq!(Tagger::new(&corpus).is_head_substantive(word), Ok(false));
    }

    #[test]
    fn test_explain_stops_at_gate() {
        let (corpus, word) = lone_word([(Feature::Pdp, "prep")]);
        let failures = Tagger::new(&corpus)
            .explain(ClassifierKind::HeadSubstantive, word)
            .unwrap();

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].rule, "head_substantive.pdp");
    }

    #[test]
    fn test_explain_weqetal_at_corpus_start() {
        let (corpus, verb) = lone_word([(Feature::Vt, "perf")]);
        let failures = Tagger::new(&corpus)
            .explain(ClassifierKind::Weqetal, verb)
            .unwrap();

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].predicate.slot(), Slot::PrecedingLexeme);
        assert_eq!(failures[0].observed, vec![Observed::Absent]);
    }

    #[test]
    fn test_explain_is_empty_for_head_substantive() {
        let (corpus, word) = lone_word([(Feature::Pdp, "subs")]);

        assert!(
            Tagger::new(&corpus)
                .explain(ClassifierKind::HeadSubstantive, word)
                .unwrap()
                .is_empty()
        );
    }
}
