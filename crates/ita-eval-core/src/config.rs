//! Evaluation configuration.
//!
//! Every threshold the engine uses is carried here and passed down
//! explicitly; nothing below this module hard-codes one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default similarity threshold for resolving a term to a vocabulary id.
pub const DEFAULT_VOCAB_THRESHOLD: f64 = 0.75;

/// Default similarity threshold for the fuzzy-match tier.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.80;

/// Default number of bootstrap resamples.
pub const DEFAULT_N_BOOTSTRAP: usize = 10_000;

/// Default resampling seed.
pub const DEFAULT_SEED: u64 = 42;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Threshold {name} must be within [0, 1], got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("n_bootstrap must be positive")]
    ZeroBootstrap,

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Unknown prediction source: {0}")]
    UnknownSource(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Thresholds used by the term matcher.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MatcherConfig {
    /// Minimum similarity for a vocabulary lookup to yield an id
    pub vocab_threshold: f64,
    /// Minimum similarity for the fuzzy-match tier
    pub fuzzy_threshold: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            vocab_threshold: DEFAULT_VOCAB_THRESHOLD,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

/// Full evaluation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvalConfig {
    pub vocab_threshold: f64,
    pub fuzzy_threshold: f64,
    pub n_bootstrap: usize,
    pub seed: u64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            vocab_threshold: DEFAULT_VOCAB_THRESHOLD,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            n_bootstrap: DEFAULT_N_BOOTSTRAP,
            seed: DEFAULT_SEED,
        }
    }
}

impl EvalConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: EvalConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> ConfigResult<()> {
        check_threshold("vocab_threshold", self.vocab_threshold)?;
        check_threshold("fuzzy_threshold", self.fuzzy_threshold)?;
        if self.n_bootstrap == 0 {
            return Err(ConfigError::ZeroBootstrap);
        }
        Ok(())
    }

    /// Matcher thresholds.
    pub fn matcher(&self) -> MatcherConfig {
        MatcherConfig {
            vocab_threshold: self.vocab_threshold,
            fuzzy_threshold: self.fuzzy_threshold,
        }
    }
}

fn check_threshold(name: &'static str, value: f64) -> ConfigResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EvalConfig::default();
        assert_eq!(config.vocab_threshold, 0.75);
        assert_eq!(config.fuzzy_threshold, 0.80);
        assert_eq!(config.n_bootstrap, 10_000);
        assert_eq!(config.seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = EvalConfig::from_json(r#"{"fuzzy_threshold": 0.85, "seed": 7}"#).unwrap();
        assert_eq!(config.fuzzy_threshold, 0.85);
        assert_eq!(config.seed, 7);
        assert_eq!(config.vocab_threshold, DEFAULT_VOCAB_THRESHOLD);
        assert_eq!(config.n_bootstrap, DEFAULT_N_BOOTSTRAP);
    }

    #[test]
    fn test_from_json_rejects_bad_threshold() {
        let result = EvalConfig::from_json(r#"{"vocab_threshold": 1.5}"#);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidThreshold { name: "vocab_threshold", .. })
        ));
    }

    #[test]
    fn test_from_json_rejects_zero_bootstrap() {
        let result = EvalConfig::from_json(r#"{"n_bootstrap": 0}"#);
        assert!(matches!(result, Err(ConfigError::ZeroBootstrap)));
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(EvalConfig::from_json("{not json"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_matcher_config() {
        let config = EvalConfig {
            fuzzy_threshold: 0.9,
            ..Default::default()
        };
        let matcher = config.matcher();
        assert_eq!(matcher.fuzzy_threshold, 0.9);
        assert_eq!(matcher.vocab_threshold, DEFAULT_VOCAB_THRESHOLD);
    }
}
