//! Deterministic sampling of classified nodes for manual review.
//!
//! Rule-based taggers have known false positives that nobody wants to patch
//! with a heuristic. Instead a reviewer looks at a fixed-size sample of the
//! positives. The sample has to be stable: the same items with the same salt
//! are always kept or dropped the same way, no matter the input order or how
//! many times the tagger is rerun.
//!
//! # Example
//!
//! ```
//! use review_sampler::ReviewSampler;
//!
//! let positions: Vec<u32> = (1..=500).collect();
//! let sample = ReviewSampler::new(40).sample(positions, |position| *position);
//! assert!(sample.len() < 100);
//! ```

use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use xxhash_rust::xxh3::Xxh3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewSampler {
    target: usize,
    salt: u64,
}

impl ReviewSampler {
    /// A sampler that keeps roughly `target` items.
    pub fn new(target: usize) -> Self {
        Self { target, salt: 0 }
    }

    /// Changes which items end up in the sample while keeping it stable.
    /// Useful for drawing a second, independent review round.
    pub fn with_salt(self, salt: u64) -> Self {
        Self { salt, ..self }
    }

    /// Keeps each item with probability `target / items.len()`, seeded by the
    /// item's key. Collections at or below the target are returned whole.
    pub fn sample<T, K, F>(&self, items: Vec<T>, key_fn: F) -> Vec<T>
    where
        K: Hash,
        F: Fn(&T) -> K,
    {
        self.sample_with_stats(items, key_fn).0
    }

    pub fn sample_with_stats<T, K, F>(&self, items: Vec<T>, key_fn: F) -> (Vec<T>, SampleStats)
    where
        K: Hash,
        F: Fn(&T) -> K,
    {
        let population = items.len();
        if population <= self.target {
            return (
                items,
                SampleStats {
                    population,
                    target: self.target,
                    kept: population,
                    was_sampled: false,
                },
            );
        }

        let keep_probability = self.target as f64 / population as f64;
        let kept: Vec<T> = items
            .into_iter()
            .filter(|item| self.roll(&key_fn(item)) < keep_probability)
            .collect();
        let stats = SampleStats {
            population,
            target: self.target,
            kept: kept.len(),
            was_sampled: true,
        };

        (kept, stats)
    }

    fn roll<K: Hash>(&self, key: &K) -> f64 {
        let mut hasher = Xxh3::with_seed(self.salt);
        key.hash(&mut hasher);
        ChaCha8Rng::seed_from_u64(hasher.finish()).random::<f64>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleStats {
    /// Items offered to the sampler
    pub population: usize,
    pub target: usize,
    /// Items that made it into the sample
    pub kept: usize,
    /// False when the population already fit the target
    pub was_sampled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_population_is_kept_whole() {
        let items = vec!["a", "b", "c"];
        let (sample, stats) = ReviewSampler::new(10).sample_with_stats(items.clone(), |s| *s);

        assert_eq!(sample, items);
        assert_eq!(stats.kept, 3);
        assert!(!stats.was_sampled);
    }

    #[test]
    fn test_sample_is_stable_across_input_order() {
        let items: Vec<u32> = (0..2000).collect();
        let mut reversed = items.clone();
        reversed.reverse();

        let sampler = ReviewSampler::new(100);
        let forward = sampler.sample(items, |n| *n);
        let mut backward = sampler.sample(reversed, |n| *n);
        backward.sort();

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_sample_is_near_target() {
        let items: Vec<u32> = (0..10_000).collect();
        let (sample, stats) = ReviewSampler::new(1000).sample_with_stats(items, |n| *n);

        assert!(stats.was_sampled);
        assert_eq!(stats.kept, sample.len());
        assert!(
            (800..=1200).contains(&sample.len()),
            "kept {} items, expected about 1000",
            sample.len()
        );
    }

    #[test]
    fn test_salt_changes_the_sample() {
        let items: Vec<u32> = (0..2000).collect();

        let first = ReviewSampler::new(100).sample(items.clone(), |n| *n);
        let second = ReviewSampler::new(100)
            .with_salt(7)
            .sample(items, |n| *n);

        assert_ne!(first, second);
    }
}
