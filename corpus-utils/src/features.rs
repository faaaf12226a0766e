/// ETCBC feature vocabularies used by the syntactic classifiers
use crate::Node;

/// Names of the features the classifiers read.
#[derive(
    Clone,
    Copy,
    Debug,
    serde::Serialize,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    parse_display::Display,
    parse_display::FromStr,
)]
#[serde(rename_all = "lowercase")]
#[display(style = "lowercase")]
pub enum Feature {
    Pdp,    // phrase dependent part of speech
    Rela,   // relation of a phrase atom, subphrase or clause
    Vt,     // verbal tense
    Lex,    // lexeme
    Domain, // text type of a clause
}

/// A closed set of values for one feature.
///
/// Raw values are validated here, at the graph boundary, so the rule
/// evaluator never has to look at strings.
pub trait Vocabulary: Sized {
    const FEATURE: Feature;

    fn parse(raw: &str) -> Option<Self>;
}

/// What a feature lookup produced once validated against a vocabulary.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Observed<T> {
    Known(T),
    /// The corpus has a value this vocabulary does not know about.
    Unrecognized(String),
    Absent,
}

impl<T: Vocabulary> Observed<T> {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None => Observed::Absent,
            Some(raw) => match T::parse(raw) {
                Some(value) => Observed::Known(value),
                None => Observed::Unrecognized(raw.to_string()),
            },
        }
    }

    /// Like `from_raw`, but leaves a trace of unknown values for whoever
    /// maintains the rule vocabularies.
    pub fn from_raw_logged(raw: Option<&str>, node: Node) -> Self {
        let observed = Self::from_raw(raw);
        if let Observed::Unrecognized(raw) = &observed {
            log::warn!("Unrecognized {} value {raw:?} on {node}", T::FEATURE);
        }
        observed
    }
}

impl<T> Observed<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Observed::Known(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Observed<U> {
        match self {
            Observed::Known(value) => Observed::Known(f(value)),
            Observed::Unrecognized(raw) => Observed::Unrecognized(raw),
            Observed::Absent => Observed::Absent,
        }
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Observed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Observed::Known(value) => write!(f, "{value}"),
            Observed::Unrecognized(raw) => write!(f, "{raw:?} (unrecognized)"),
            Observed::Absent => write!(f, "(absent)"),
        }
    }
}

/// Phrase dependent part of speech (`pdp`).
///
/// This is the part of speech a word has in the context of its phrase, so an
/// adjective used as a noun shows up as a substantive.
#[derive(
    Clone,
    Copy,
    Debug,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    parse_display::Display,
    parse_display::FromStr,
)]
pub enum PhraseDependentPos {
    #[display("art")]
    Article,
    #[display("verb")]
    Verb,
    #[display("subs")]
    Substantive,
    #[display("nmpr")]
    ProperNoun,
    #[display("advb")]
    Adverb,
    #[display("prep")]
    Preposition,
    #[display("conj")]
    Conjunction,
    #[display("prps")]
    PersonalPronoun,
    #[display("prde")]
    DemonstrativePronoun,
    #[display("prin")]
    InterrogativePronoun,
    #[display("intj")]
    Interjection,
    #[display("nega")]
    Negative,
    #[display("inrg")]
    Interrogative,
    #[display("adjv")]
    Adjective,
}

/// Relation of a phrase atom or subphrase to its mother (`rela`).
///
/// Phrase atoms use the capitalised codes, subphrases the lowercase ones.
#[derive(
    Clone,
    Copy,
    Debug,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    parse_display::Display,
    parse_display::FromStr,
)]
pub enum Relation {
    #[display("NA")]
    NotApplicable,
    #[display("Appo")]
    Apposition,
    #[display("Spec")]
    Specification,
    #[display("Link")]
    Link,
    #[display("Para")]
    Parallel,
    #[display("Resu")]
    Resumption,
    #[display("Sfxs")]
    Suffix,
    #[display("rec")]
    NomenRectum,
    #[display("adj")]
    Adjunct,
    #[display("atr")]
    Attributive,
    #[display("mod")]
    Modifier,
    #[display("dem")]
    Demonstrative,
    #[display("par")]
    SubphraseParallel,
}

/// Verbal tense (`vt`). Only the qatal is stored for perfects; the weqetal
/// has no tag of its own.
#[derive(
    Clone,
    Copy,
    Debug,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    parse_display::Display,
    parse_display::FromStr,
)]
pub enum Tense {
    #[display("perf")]
    Perfect,
    #[display("impf")]
    Imperfect,
    #[display("wayq")]
    Wayyiqtol,
    #[display("impv")]
    Imperative,
    #[display("infa")]
    InfinitiveAbsolute,
    #[display("infc")]
    InfinitiveConstruct,
    #[display("ptca")]
    Participle,
    #[display("ptcp")]
    PassiveParticiple,
    #[display("NA")]
    NotApplicable,
}

/// Text type of a clause (`domain`).
#[derive(
    Clone,
    Copy,
    Debug,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    parse_display::Display,
    parse_display::FromStr,
)]
pub enum Domain {
    #[display("N")]
    Narrative,
    #[display("D")]
    Discourse,
    #[display("Q")]
    Quotation,
    #[display("?")]
    Unknown,
}

/// A lexeme identifier such as `W` or `>MR[`.
///
/// Lexemes are an open vocabulary, so every value is recognized.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, parse_display::Display)]
#[display("{0}")]
pub struct Lexeme(pub String);

impl Lexeme {
    pub fn new(lex: impl Into<String>) -> Self {
        Self(lex.into())
    }
}

impl Vocabulary for PhraseDependentPos {
    const FEATURE: Feature = Feature::Pdp;

    fn parse(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl Vocabulary for Relation {
    const FEATURE: Feature = Feature::Rela;

    fn parse(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl Vocabulary for Tense {
    const FEATURE: Feature = Feature::Vt;

    fn parse(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl Vocabulary for Domain {
    const FEATURE: Feature = Feature::Domain;

    fn parse(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl Vocabulary for Lexeme {
    const FEATURE: Feature = Feature::Lex;

    fn parse(raw: &str) -> Option<Self> {
        Some(Lexeme::new(raw))
    }
}
