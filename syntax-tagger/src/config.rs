//! Runtime settings for the command line tool, read from the environment.

pub const THREADS_VAR: &str = "SYNTAX_TAGGER_THREADS";
pub const REVIEW_SAMPLE_VAR: &str = "SYNTAX_TAGGER_REVIEW_SAMPLE";
pub const PROGRESS_VAR: &str = "SYNTAX_TAGGER_PROGRESS";

const DEFAULT_REVIEW_SAMPLE: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggerConfig {
    /// Size of the rayon pool. `None` leaves the choice to rayon.
    pub threads: Option<usize>,
    /// How many positives to pull for manual review
    pub review_sample: usize,
    pub progress: bool,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            threads: None,
            review_sample: DEFAULT_REVIEW_SAMPLE,
            progress: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidCount { key: &'static str, value: String },
    #[error("{key} must be 0 or 1, got {value:?}")]
    InvalidFlag { key: &'static str, value: String },
}

impl TaggerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Unset keys keep their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(THREADS_VAR) {
            config.threads = Some(parse_count(THREADS_VAR, value)?);
        }
        if let Some(value) = lookup(REVIEW_SAMPLE_VAR) {
            config.review_sample = parse_count(REVIEW_SAMPLE_VAR, value)?;
        }
        if let Some(value) = lookup(PROGRESS_VAR) {
            config.progress = match value.trim() {
                "1" => true,
                "0" => false,
                _ => {
                    return Err(ConfigError::InvalidFlag {
                        key: PROGRESS_VAR,
                        value,
                    });
                }
            };
        }

        Ok(config)
    }
}

fn parse_count(key: &'static str, value: String) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(ConfigError::InvalidCount { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(
            TaggerConfig::from_lookup(lookup(&[])).unwrap(),
            TaggerConfig::default()
        );
    }

    #[test]
    fn test_overrides() {
        let config = TaggerConfig::from_lookup(lookup(&[
            (THREADS_VAR, "4"),
            (REVIEW_SAMPLE_VAR, " 100 "),
            (PROGRESS_VAR, "0"),
        ]))
        .unwrap();

        assert_eq!(config.threads, Some(4));
        assert_eq!(config.review_sample, 100);
        assert!(!config.progress);
    }

    #[test]
    fn test_rejects_zero_threads() {
        assert_eq!(
            TaggerConfig::from_lookup(lookup(&[(THREADS_VAR, "0")])),
            Err(ConfigError::InvalidCount {
                key: THREADS_VAR,
                value: "0".to_string()
            })
        );
    }

    #[test]
    fn test_rejects_bad_flag() {
        assert!(matches!(
            TaggerConfig::from_lookup(lookup(&[(PROGRESS_VAR, "yes")])),
            Err(ConfigError::InvalidFlag { .. })
        ));
    }
}
