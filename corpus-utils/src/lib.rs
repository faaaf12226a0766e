pub mod features;
pub mod graph;
pub mod memory;

pub use features::{
    Domain, Feature, Lexeme, Observed, PhraseDependentPos, Relation, Tense, Vocabulary,
};
pub use graph::CorpusGraph;
pub use memory::{
    CorpusBuilder, CorpusError, CorpusSnapshot, FeatureMap, InMemoryCorpus, NodeRecord, RawFeatures,
};

/// Object types of the ETCBC database, finest first.
#[derive(
    Clone,
    Copy,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    schemars::JsonSchema,
    parse_display::Display,
    parse_display::FromStr,
)]
#[serde(rename_all = "snake_case")]
#[display(style = "snake_case")]
pub enum NodeType {
    Word,
    #[serde(rename = "lex")]
    #[display("lex")]
    Lexeme,
    Subphrase,
    PhraseAtom,
    Phrase,
    ClauseAtom,
    Clause,
    SentenceAtom,
    Sentence,
    HalfVerse,
    Verse,
    Chapter,
    Book,
}

/// A node in the corpus graph.
///
/// `index` is only unique within one object type. Words are slots and are
/// numbered by their textual position starting at 1.
#[derive(
    Clone,
    Copy,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    schemars::JsonSchema,
    parse_display::Display,
)]
#[display("{otype} {index}")]
pub struct Node {
    pub otype: NodeType,
    pub index: u32,
}

impl Node {
    pub fn new(otype: NodeType, index: u32) -> Self {
        Self { otype, index }
    }

    pub fn word(position: u32) -> Self {
        Self::new(NodeType::Word, position)
    }

    pub fn is_word(&self) -> bool {
        self.otype == NodeType::Word
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_names_match_otype() {
        assert_eq!(NodeType::PhraseAtom.to_string(), "phrase_atom");
        assert_eq!(NodeType::Lexeme.to_string(), "lex");
        assert_eq!("half_verse".parse::<NodeType>().unwrap(), NodeType::HalfVerse);
        assert_eq!(
            serde_json::to_string(&NodeType::Lexeme).unwrap(),
            "\"lex\""
        );
    }

    #[test]
    fn test_node_display() {
        assert_eq!(Node::word(12).to_string(), "word 12");
        assert_eq!(Node::new(NodeType::Clause, 3).to_string(), "clause 3");
    }
}
