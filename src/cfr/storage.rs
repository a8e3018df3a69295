//! Per-InfoSet solver state.
//!
//! This module holds the mutable side of the solver: the current strategy,
//! beliefs, utilities, likelihood and cumulative gain of every InfoSet. It is
//! an arena indexed by [`InfoSetId`], sized once from the registry, so the
//! solving phases never allocate keys or look up hash maps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cfr::error::SolverError;
use crate::cfr::game::Symbol;
use crate::cfr::registry::{InfoSetId, InfoSetRegistry, Move};

/// Mutable values of one InfoSet.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoSetState {
    /// Current probability of each legal action.
    pub strategy: Vec<f64>,
    /// Posterior over the InfoSet's candidate deals.
    pub beliefs: Vec<f64>,
    /// Expected utility of each action under the current beliefs.
    pub action_utilities: Vec<f64>,
    /// Strategy-weighted utility of the InfoSet.
    pub expected_utility: f64,
    /// Probability that the other players steer play into this InfoSet.
    pub likelihood: f64,
    /// Accumulated likelihood-weighted gain per action.
    pub cumulative_gain: Vec<f64>,
}

/// Arena of InfoSet states, parallel to the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoSetTable {
    states: Vec<InfoSetState>,
}

impl InfoSetTable {
    /// Create the initial state for every InfoSet in `registry`.
    ///
    /// Strategies start uniform, beliefs start at the normalized prior of the
    /// candidates. With `seed_gain`, cumulative gains start equal to the
    /// initial strategy; otherwise at zero.
    pub fn new<P: Symbol, A: Symbol>(registry: &InfoSetRegistry<P, A>, seed_gain: bool) -> Self {
        let states = registry
            .nodes()
            .iter()
            .map(|node| {
                let n = node.num_actions();
                let strategy = vec![1.0 / n as f64; n];

                let prior: f64 = node.candidates.iter().map(|c| c.prior).sum();
                let beliefs = node
                    .candidates
                    .iter()
                    .map(|c| if prior > 0.0 { c.prior / prior } else { 0.0 })
                    .collect();

                let cumulative_gain = if seed_gain {
                    strategy.clone()
                } else {
                    vec![0.0; n]
                };

                InfoSetState {
                    strategy,
                    beliefs,
                    action_utilities: vec![0.0; n],
                    expected_utility: 0.0,
                    likelihood: 0.0,
                    cumulative_gain,
                }
            })
            .collect();

        Self { states }
    }

    /// Number of InfoSets.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Get the state of an InfoSet.
    pub fn get(&self, id: InfoSetId) -> &InfoSetState {
        &self.states[id.index()]
    }

    /// Get mutable access to the state of an InfoSet.
    pub fn get_mut(&mut self, id: InfoSetId) -> &mut InfoSetState {
        &mut self.states[id.index()]
    }

    /// All states, in registry order.
    pub fn states(&self) -> &[InfoSetState] {
        &self.states
    }

    /// Current strategy of an InfoSet.
    pub fn strategy(&self, id: InfoSetId) -> &[f64] {
        &self.states[id.index()].strategy
    }

    /// Current probability of a single move.
    pub fn probability(&self, mv: Move) -> f64 {
        self.states[mv.info_set.index()].strategy[mv.action]
    }

    /// Product of the current probabilities of a sequence of moves.
    pub fn chain_probability(&self, moves: &[Move]) -> f64 {
        moves.iter().map(|&mv| self.probability(mv)).product()
    }

    /// Export strategies and cumulative gains, keyed by InfoSet text.
    pub fn export<P: Symbol, A: Symbol>(&self, registry: &InfoSetRegistry<P, A>) -> StorageExport {
        let mut strategies = BTreeMap::new();
        let mut cumulative_gains = BTreeMap::new();
        for (node, state) in registry.nodes().iter().zip(&self.states) {
            strategies.insert(node.text.clone(), state.strategy.clone());
            cumulative_gains.insert(node.text.clone(), state.cumulative_gain.clone());
        }
        StorageExport {
            strategies,
            cumulative_gains,
        }
    }

    /// Import strategies and cumulative gains from an export.
    ///
    /// Every InfoSet of `registry` must be present with the right number of
    /// finite, non-negative values. Nothing is modified if validation fails.
    /// Beliefs, utilities and likelihoods are recomputed by the next iteration.
    pub fn import<P: Symbol, A: Symbol>(
        &mut self,
        registry: &InfoSetRegistry<P, A>,
        data: &StorageExport,
    ) -> Result<(), SolverError> {
        let mut imported = Vec::with_capacity(registry.len());
        for node in registry.nodes() {
            let strategy = checked_entry(&data.strategies, &node.text, node.num_actions())?;
            let gain = checked_entry(&data.cumulative_gains, &node.text, node.num_actions())?;
            imported.push((strategy, gain));
        }

        for (state, (strategy, gain)) in self.states.iter_mut().zip(imported) {
            state.strategy.copy_from_slice(strategy);
            state.cumulative_gain.copy_from_slice(gain);
        }
        Ok(())
    }
}

fn checked_entry<'a>(
    map: &'a BTreeMap<String, Vec<f64>>,
    key: &str,
    len: usize,
) -> Result<&'a [f64], SolverError> {
    let values = map
        .get(key)
        .ok_or_else(|| SolverError::invalid_history(key, "missing from checkpoint"))?;
    if values.len() != len {
        return Err(SolverError::invalid_history(
            key,
            format!("checkpoint has {} values for {} actions", values.len(), len),
        ));
    }
    if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(SolverError::invalid_history(
            key,
            "checkpoint values must be finite and non-negative",
        ));
    }
    Ok(values)
}

/// Serializable export format for the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageExport {
    /// Current strategies: key text -> probability per action
    pub strategies: BTreeMap<String, Vec<f64>>,
    /// Cumulative gains: key text -> gain per action
    pub cumulative_gains: BTreeMap<String, Vec<f64>>,
}
