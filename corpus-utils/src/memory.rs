//! An in-memory corpus graph with Text-Fabric semantics.
//!
//! Words are the slots of the corpus and are numbered from 1 in textual
//! order. Every other node is a set of slots; a node encloses another when
//! its slots are a superset of the other's. Nodes enclosing the same word are
//! kept in canonical order: earlier first slot first, then the bigger node.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::features::Feature;
use crate::graph::CorpusGraph;
use crate::{Node, NodeType};

pub type FeatureMap = BTreeMap<Feature, String>;

/// Features as they appear in a snapshot, keyed by feature name. Exports
/// usually carry many more features than the classifiers read.
pub type RawFeatures = BTreeMap<String, String>;

/// Serialized form of a corpus.
#[derive(
    Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize, schemars::JsonSchema,
)]
pub struct CorpusSnapshot {
    /// Word features in textual order. The first entry is word 1.
    pub words: Vec<RawFeatures>,
    /// All non-word nodes. A node's index is its position among the nodes
    /// of the same type, starting at 1.
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
}

#[derive(
    Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize, schemars::JsonSchema,
)]
pub struct NodeRecord {
    pub otype: NodeType,
    /// Positions of the words this node covers.
    pub slots: Vec<u32>,
    #[serde(default)]
    pub features: RawFeatures,
}

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("{node} does not cover any words")]
    EmptyNode { node: Node },
    #[error("{node} refers to word {slot}, but the corpus has {words} words")]
    SlotOutOfRange { node: Node, slot: u32, words: usize },
    #[error("node record {position} is a word; words belong in `words`")]
    WordRecord { position: usize },
    #[error("failed to read corpus snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse corpus snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug)]
struct StoredNode {
    slots: Vec<u32>,
    features: FeatureMap,
}

#[derive(Debug)]
pub struct InMemoryCorpus {
    words: Vec<FeatureMap>,
    nodes: FxHashMap<NodeType, Vec<StoredNode>>,
    // enclosing nodes of every word in canonical order, indexed by position - 1
    containers: Vec<Vec<Node>>,
}

impl InMemoryCorpus {
    pub fn from_snapshot(snapshot: CorpusSnapshot) -> Result<Self, CorpusError> {
        let CorpusSnapshot {
            words,
            nodes: records,
        } = snapshot;
        let words: Vec<FeatureMap> = words.into_iter().map(known_features).collect();
        let word_count = words.len();

        let mut nodes: FxHashMap<NodeType, Vec<StoredNode>> = FxHashMap::default();
        let mut ordered = Vec::with_capacity(records.len());

        for (position, record) in records.into_iter().enumerate() {
            let NodeRecord {
                otype,
                mut slots,
                features,
            } = record;
            if otype == NodeType::Word {
                return Err(CorpusError::WordRecord { position });
            }
            slots.sort_unstable();
            slots.dedup();

            let siblings = nodes.entry(otype).or_default();
            let node = Node::new(otype, siblings.len() as u32 + 1);
            let (Some(&first), Some(&last)) = (slots.first(), slots.last()) else {
                return Err(CorpusError::EmptyNode { node });
            };
            if first == 0 {
                return Err(CorpusError::SlotOutOfRange {
                    node,
                    slot: first,
                    words: word_count,
                });
            }
            if last as usize > word_count {
                return Err(CorpusError::SlotOutOfRange {
                    node,
                    slot: last,
                    words: word_count,
                });
            }

            ordered.push((first, slots.len(), node));
            siblings.push(StoredNode {
                slots,
                features: known_features(features),
            });
        }

        ordered.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then(b.1.cmp(&a.1))
                .then(b.2.otype.cmp(&a.2.otype))
                .then(a.2.index.cmp(&b.2.index))
        });

        let mut corpus = Self {
            words,
            nodes,
            containers: vec![Vec::new(); word_count],
        };
        for (_, _, node) in ordered {
            let Some(stored) = corpus
                .nodes
                .get(&node.otype)
                .and_then(|siblings| siblings.get(node.index as usize - 1))
            else {
                continue;
            };
            for &slot in &stored.slots {
                corpus.containers[slot as usize - 1].push(node);
            }
        }

        log::debug!(
            "Built corpus with {} words and {} other nodes",
            corpus.words.len(),
            corpus.nodes.values().map(Vec::len).sum::<usize>()
        );

        Ok(corpus)
    }

    /// Loads a JSON corpus snapshot.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let file = File::open(path)?;
        let snapshot: CorpusSnapshot = serde_json::from_reader(BufReader::new(file))?;
        Self::from_snapshot(snapshot)
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// All words in textual order.
    pub fn words(&self) -> impl Iterator<Item = Node> + '_ {
        (1..=self.words.len() as u32).map(Node::word)
    }

    pub fn nodes_of(&self, otype: NodeType) -> Vec<Node> {
        if otype == NodeType::Word {
            return self.words().collect();
        }
        let count = self.nodes.get(&otype).map_or(0, Vec::len) as u32;
        (1..=count).map(|index| Node::new(otype, index)).collect()
    }

    fn stored(&self, node: Node) -> Option<&StoredNode> {
        let index = node.index.checked_sub(1)? as usize;
        self.nodes.get(&node.otype)?.get(index)
    }

    fn word_features(&self, node: Node) -> Option<&FeatureMap> {
        let index = node.index.checked_sub(1)? as usize;
        self.words.get(index)
    }

    fn first_slot(&self, node: Node) -> Option<u32> {
        if node.is_word() {
            self.word_features(node).map(|_| node.index)
        } else {
            self.stored(node)?.slots.first().copied()
        }
    }
}

impl CorpusGraph for InMemoryCorpus {
    fn feature_value(&self, node: Node, feature: Feature) -> Option<&str> {
        let features = if node.is_word() {
            self.word_features(node)?
        } else {
            &self.stored(node)?.features
        };
        features.get(&feature).map(String::as_str)
    }

    fn enclosing_nodes(&self, node: Node, target: NodeType) -> Vec<Node> {
        let Some(first) = self.first_slot(node) else {
            return Vec::new();
        };
        let candidates = self.containers[first as usize - 1]
            .iter()
            .filter(|candidate| candidate.otype == target && **candidate != node);

        if node.is_word() {
            return candidates.copied().collect();
        }

        let Some(stored) = self.stored(node) else {
            return Vec::new();
        };
        candidates
            .filter(|candidate| {
                self.stored(**candidate).is_some_and(|outer| {
                    stored
                        .slots
                        .iter()
                        .all(|slot| outer.slots.binary_search(slot).is_ok())
                })
            })
            .copied()
            .collect()
    }

    fn preceding_node(&self, node: Node, offset: u32) -> Option<Node> {
        let position = self.first_slot(node)?.checked_sub(offset)?;
        (position >= 1).then(|| Node::word(position))
    }
}

/// Assembles a corpus node by node. Mostly useful for fixtures.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    snapshot: CorpusSnapshot,
    counts: FxHashMap<NodeType, u32>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a word at the next textual position.
    pub fn word<'a>(&mut self, features: impl IntoIterator<Item = (Feature, &'a str)>) -> Node {
        self.snapshot.words.push(raw_features(features));
        Node::word(self.snapshot.words.len() as u32)
    }

    /// Adds a node covering `words`.
    pub fn node<'a>(
        &mut self,
        otype: NodeType,
        words: impl IntoIterator<Item = Node>,
        features: impl IntoIterator<Item = (Feature, &'a str)>,
    ) -> Node {
        let count = self.counts.entry(otype).or_default();
        *count += 1;
        self.snapshot.nodes.push(NodeRecord {
            otype,
            slots: words.into_iter().map(|word| word.index).collect(),
            features: raw_features(features),
        });
        Node::new(otype, *count)
    }

    pub fn build(self) -> Result<InMemoryCorpus, CorpusError> {
        InMemoryCorpus::from_snapshot(self.snapshot)
    }
}

fn raw_features<'a>(features: impl IntoIterator<Item = (Feature, &'a str)>) -> RawFeatures {
    features
        .into_iter()
        .map(|(feature, value)| (feature.to_string(), value.to_string()))
        .collect()
}

/// Keeps the features the classifiers read and drops the rest.
fn known_features(raw: RawFeatures) -> FeatureMap {
    raw.into_iter()
        .filter_map(|(name, value)| Some((name.parse::<Feature>().ok()?, value)))
        .collect()
}
