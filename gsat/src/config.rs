//! Search configuration.
use thiserror::Error;

use gsat_internal_macros::{ConfigUpdate, DocDefault};

/// Configurable parameters of the local search.
#[derive(DocDefault, ConfigUpdate, Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// Probability of a random walk step instead of a greedy step, between 0 and 1. (Default: 0.4)
    pub random_step_probability: f64,

    /// Number of flips per try, 0 for no limit. (Default: 300)
    pub max_iterations: u64,

    /// Number of tries, each starting from a fresh random assignment, 0 for no limit.
    /// (Default: 1)
    pub max_tries: u64,

    /// Seed of the random number generator. (Default: 0)
    pub seed: u64,

    /// Recount all clauses after every flip and abort when the incremental state disagrees.
    /// (Default: false)
    pub self_check: bool,
}

/// Invalid configuration values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{option} must be between {min} and {max}, got {value}")]
    OutOfRange {
        option: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl SearchConfig {
    /// Check that all values are within their valid range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = self.random_step_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::OutOfRange {
                option: "random_step_probability",
                value: p,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(())
    }

    /// Whether the number of flips per try is bounded.
    pub fn iterations_bounded(&self) -> bool {
        self.max_iterations != 0
    }

    /// Whether the number of tries is bounded.
    pub fn tries_bounded(&self) -> bool {
        self.max_tries != 0
    }
}
