//! Configuration options for the CFR solver.
//!
//! This module provides the configuration struct that controls when the
//! iteration driver stops and how the strategy update treats degenerate
//! InfoSets, plus the statistics and telemetry recorded during a run.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the strategy updater does when an InfoSet's total cumulative gain is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroGainPolicy {
    /// Abort the run with `DegenerateStrategyUpdate`.
    #[default]
    Fail,
    /// Fall back to the uniform distribution over legal actions.
    Uniform,
}

/// Configuration for the CFR solver.
///
/// # Example
/// ```
/// use infoset_solver::cfr::SolverConfig;
///
/// let config = SolverConfig::default().with_max_iterations(10_000);
/// assert!(config.validate().is_ok());
/// assert!(config.seed_cumulative_gain);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Iteration budget. The driver stops after this many iterations.
    pub max_iterations: u64,

    /// Convergence threshold on the total added gain of one iteration.
    ///
    /// The driver stops as soon as an iteration adds this much gain or less.
    /// Set to 0.0 to only stop on the iteration budget (or an exactly zero gain).
    pub gain_threshold: f64,

    /// How often (in iterations) a telemetry sample is recorded.
    pub telemetry_interval: u64,

    /// Handling of InfoSets whose cumulative gain totals zero.
    pub zero_gain_policy: ZeroGainPolicy,

    /// Seed each action's cumulative gain with its initial (uniform) probability.
    ///
    /// Seeding keeps every cumulative gain strictly positive, so strategies
    /// never assign exactly zero probability and beliefs stay well defined.
    pub seed_cumulative_gain: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100_000,
            gain_threshold: 1e-4,
            telemetry_interval: 100,
            zero_gain_policy: ZeroGainPolicy::Fail,
            seed_cumulative_gain: true,
        }
    }
}

impl SolverConfig {
    /// Create a new SolverConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Short run suitable for tests and quick looks at a game.
    pub fn quick() -> Self {
        Self {
            max_iterations: 10_000,
            ..Default::default()
        }
    }

    /// Long run that only stops on the iteration budget.
    pub fn exhaustive() -> Self {
        Self {
            max_iterations: 1_000_000,
            gain_threshold: 0.0,
            telemetry_interval: 1_000,
            ..Default::default()
        }
    }

    /// Builder method: set the iteration budget.
    pub fn with_max_iterations(mut self, iterations: u64) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Builder method: set the gain threshold.
    pub fn with_gain_threshold(mut self, threshold: f64) -> Self {
        self.gain_threshold = threshold;
        self
    }

    /// Builder method: set the telemetry interval.
    pub fn with_telemetry_interval(mut self, interval: u64) -> Self {
        self.telemetry_interval = interval;
        self
    }

    /// Builder method: set the zero-gain policy.
    pub fn with_zero_gain_policy(mut self, policy: ZeroGainPolicy) -> Self {
        self.zero_gain_policy = policy;
        self
    }

    /// Builder method: set whether cumulative gains are seeded.
    pub fn with_seeded_gain(mut self, enable: bool) -> Self {
        self.seed_cumulative_gain = enable;
        self
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidIterations);
        }

        if !self.gain_threshold.is_finite() || self.gain_threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.gain_threshold));
        }

        if self.telemetry_interval == 0 {
            return Err(ConfigError::InvalidTelemetryInterval);
        }

        Ok(())
    }
}

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Iteration budget is zero.
    #[error("iteration budget must be at least 1")]
    InvalidIterations,
    /// Gain threshold is negative or not finite.
    #[error("gain threshold {0} must be finite and non-negative")]
    InvalidThreshold(f64),
    /// Telemetry interval is zero.
    #[error("telemetry interval must be at least 1")]
    InvalidTelemetryInterval,
    /// Game parameters are out of range.
    #[error("invalid game parameters: {0}")]
    InvalidGame(String),
    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    IoError(String),
    /// Config file is not valid JSON for this struct.
    #[error("failed to parse config: {0}")]
    ParseError(String),
}

/// Why a solving run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The run has not finished yet.
    #[default]
    Running,
    /// `max_iterations` reached.
    IterationBudget,
    /// An iteration's total gain fell to `gain_threshold` or below.
    GainThreshold,
}

/// A single telemetry sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainSample {
    /// Iteration number (1-based) when this sample was taken.
    pub iteration: u64,
    /// Total gain added during that iteration.
    pub total_gain: f64,
}

/// Statistics tracked during solving.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolveStats {
    /// Total number of iterations completed.
    pub iterations: u64,

    /// Number of InfoSets in the registry.
    pub info_sets: usize,

    /// Total gain added by the most recent iteration.
    pub final_gain: f64,

    /// Total time spent solving (in seconds).
    pub elapsed_seconds: f64,

    /// Iterations per second.
    pub iterations_per_second: f64,

    /// Why the run stopped.
    pub termination: Termination,

    /// Sampled `(iteration, total gain)` telemetry.
    pub gain_history: Vec<GainSample>,
}

impl SolveStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update iterations per second based on elapsed time.
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.iterations_per_second = self.iterations as f64 / self.elapsed_seconds;
        }
    }

    /// Record a telemetry sample, skipping duplicates of the last iteration.
    pub fn record_gain(&mut self, iteration: u64, total_gain: f64) {
        if self.gain_history.last().map(|s| s.iteration) == Some(iteration) {
            return;
        }
        self.gain_history.push(GainSample {
            iteration,
            total_gain,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SolverConfig::default().validate().is_ok());
        assert!(SolverConfig::quick().validate().is_ok());
        assert!(SolverConfig::exhaustive().validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let config = SolverConfig::default().with_max_iterations(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidIterations));

        let config = SolverConfig::default().with_gain_threshold(-1.0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidThreshold(-1.0)));

        let config = SolverConfig::default().with_gain_threshold(f64::NAN);
        assert!(config.validate().is_err());

        let config = SolverConfig::default().with_telemetry_interval(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidTelemetryInterval));
    }

    #[test]
    fn test_from_json_partial() {
        let config = SolverConfig::from_json_str(
            r#"{ "max_iterations": 500, "zero_gain_policy": "uniform" }"#,
        )
        .unwrap();
        assert_eq!(config.max_iterations, 500);
        assert_eq!(config.zero_gain_policy, ZeroGainPolicy::Uniform);
        assert_eq!(config.gain_threshold, 1e-4);

        let err = SolverConfig::from_json_str(r#"{ "max_iterations": 0 }"#).unwrap_err();
        assert_eq!(err, ConfigError::InvalidIterations);

        assert!(matches!(
            SolverConfig::from_json_str("not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_record_gain_skips_duplicates() {
        let mut stats = SolveStats::new();
        stats.record_gain(1, 2.0);
        stats.record_gain(1, 2.0);
        stats.record_gain(2, 1.5);
        assert_eq!(stats.gain_history.len(), 2);
        assert_eq!(stats.gain_history[1].iteration, 2);
    }
}
