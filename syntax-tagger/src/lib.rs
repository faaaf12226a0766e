//! Rule-based tagging of grammatical categories the ETCBC database does not
//! encode directly: head substantives and weqetal verb forms.

pub mod batch;
pub mod classify;
pub mod config;
pub mod context;
pub mod error;
pub mod rules;

pub use batch::{BatchSummary, Classified, classify_batch};
pub use classify::{
    ClassifierKind, HeadSubstantive, NodeClassifier, Tagger, Weqetal, get_classifier,
};
pub use config::{ConfigError, TaggerConfig};
pub use context::ContextExtractor;
pub use error::ClassifyError;
pub use rules::{FeatureBundle, Predicate, Rule, evaluate};
