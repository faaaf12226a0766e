//! Classifying many nodes at once.
//!
//! Every classification is a pure read of the corpus, so the nodes are
//! spread over the rayon pool without any coordination. A node whose context
//! is broken gets its error recorded and the batch carries on.

use corpus_utils::{CorpusGraph, Node};
use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::classify::{ClassifierKind, get_classifier};
use crate::context::ContextExtractor;
use crate::error::ClassifyError;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Classified {
    pub node: Node,
    pub kind: ClassifierKind,
    pub outcome: Result<bool, ClassifyError>,
}

/// Classifies `nodes` in parallel. Results come back in input order.
pub fn classify_batch<G: CorpusGraph + Sync>(
    graph: &G,
    kind: ClassifierKind,
    nodes: &[Node],
    progress: Option<&ProgressBar>,
) -> Vec<Classified> {
    let classifier = get_classifier::<G>(kind);
    let extractor = ContextExtractor::new(graph);

    let results: Vec<Classified> = nodes
        .par_iter()
        .map(|&node| {
            let outcome = classifier.classify(&extractor, node);
            if let Err(error) = &outcome {
                log::warn!("Could not classify {node} as {kind}: {error}");
            }
            if let Some(progress) = progress {
                progress.inc(1);
            }
            Classified {
                node,
                kind,
                outcome,
            }
        })
        .collect();

    log::info!("{kind}: {}", BatchSummary::from_results(&results));
    results
}

/// Nodes that were classified as members of the category.
pub fn positives(results: &[Classified]) -> Vec<Node> {
    results
        .iter()
        .filter(|result| result.outcome == Ok(true))
        .map(|result| result.node)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[Classified]) -> Self {
        results
            .iter()
            .fold(Self::default(), |mut summary, result| {
                summary.total += 1;
                match result.outcome {
                    Ok(true) => summary.positive += 1,
                    Ok(false) => summary.negative += 1,
                    Err(_) => summary.failed += 1,
                }
                summary
            })
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} nodes, {} positive, {} negative, {} failed",
            self.total, self.positive, self.negative, self.failed
        )
    }
}
