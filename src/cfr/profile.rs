//! Persisted solver artifacts.
//!
//! A [`StrategyProfile`] is the final strategy map of a run, keyed by InfoSet
//! text and action symbol, which is all a bot needs to play. [`GainTelemetry`]
//! is the sampled total gain curve of the run.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cfr::config::GainSample;
use crate::cfr::game::{Game, Symbol};
use crate::cfr::solver::CFRSolver;

/// Errors that can occur when saving, loading or querying artifacts.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Reading or writing the file failed.
    #[error("profile I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid JSON for this artifact.
    #[error("profile JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
    /// The profile has no entry for this InfoSet.
    #[error("no strategy for info set `{0}`")]
    UnknownInfoSet(String),
    /// The stored distribution cannot be sampled from.
    #[error("strategy for info set `{0}` is not a valid distribution")]
    InvalidDistribution(String),
    /// An action symbol the game does not know.
    #[error("unknown action `{action}` at info set `{key}`")]
    UnknownAction {
        /// InfoSet key text.
        key: String,
        /// Offending symbol.
        action: String,
    },
}

/// Description of the run that produced a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileMetadata {
    /// Game instance name.
    pub game: String,
    /// Completed iterations.
    pub iterations: u64,
    /// Total gain of the last iteration.
    pub final_gain: f64,
    /// Number of InfoSets.
    pub info_sets: usize,
}

/// Final strategy map: key text -> action symbol -> probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyProfile {
    /// Run metadata.
    pub metadata: ProfileMetadata,
    /// Strategy of every InfoSet.
    pub strategies: BTreeMap<String, BTreeMap<String, f64>>,
}

impl StrategyProfile {
    /// Snapshot the current strategies of a solver.
    pub fn from_solver<G: Game>(solver: &CFRSolver<G>) -> Self {
        let registry = solver.registry();
        let strategies = registry
            .nodes()
            .iter()
            .zip(solver.table().states())
            .map(|(node, state)| {
                let actions = node
                    .actions
                    .iter()
                    .map(Symbol::symbol)
                    .zip(state.strategy.iter().copied())
                    .collect();
                (node.text.clone(), actions)
            })
            .collect();

        Self {
            metadata: ProfileMetadata {
                game: solver.game().name(),
                iterations: solver.iteration(),
                final_gain: solver.stats().final_gain,
                info_sets: registry.len(),
            },
            strategies,
        }
    }

    /// Number of InfoSets in the profile.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Check if the profile is empty.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Action distribution of an InfoSet.
    pub fn distribution(&self, key: &str) -> Result<&BTreeMap<String, f64>, ProfileError> {
        self.strategies
            .get(key)
            .ok_or_else(|| ProfileError::UnknownInfoSet(key.to_string()))
    }

    /// Probability of one action at an InfoSet.
    pub fn probability(&self, key: &str, action: &str) -> Result<f64, ProfileError> {
        self.distribution(key)?
            .get(action)
            .copied()
            .ok_or_else(|| ProfileError::UnknownAction {
                key: key.to_string(),
                action: action.to_string(),
            })
    }

    /// Sample an action symbol from an InfoSet's distribution.
    pub fn sample_action<R: Rng + ?Sized>(
        &self,
        key: &str,
        rng: &mut R,
    ) -> Result<&str, ProfileError> {
        let distribution = self.distribution(key)?;
        let weights = WeightedIndex::new(distribution.values().copied())
            .map_err(|_| ProfileError::InvalidDistribution(key.to_string()))?;
        let index = weights.sample(rng);
        distribution
            .keys()
            .nth(index)
            .map(String::as_str)
            .ok_or_else(|| ProfileError::InvalidDistribution(key.to_string()))
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ProfileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ProfileError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save as pretty JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ProfileError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Load from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ProfileError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    /// Print every InfoSet and its distribution.
    pub fn print_summary(&self) {
        println!("\n=== {} ===", self.metadata.game);
        println!(
            "{} info sets, {} iterations, final gain {:.6}\n",
            self.metadata.info_sets, self.metadata.iterations, self.metadata.final_gain
        );
        for (key, actions) in &self.strategies {
            let cells: Vec<String> = actions
                .iter()
                .map(|(action, p)| format!("{}={:.3}", action, p))
                .collect();
            println!("{:>12}  {}", key, cells.join("  "));
        }
    }
}

/// Sampled total gain curve of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GainTelemetry {
    /// Game instance name.
    pub game: String,
    /// `(iteration, total gain)` samples in iteration order.
    pub samples: Vec<GainSample>,
}

impl GainTelemetry {
    /// Copy the solver's telemetry samples.
    pub fn from_solver<G: Game>(solver: &CFRSolver<G>) -> Self {
        Self {
            game: solver.game().name(),
            samples: solver.stats().gain_history.clone(),
        }
    }

    /// Save as pretty JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ProfileError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
