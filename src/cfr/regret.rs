//! Regret accumulation and strategy update.
//!
//! # Regret matching
//!
//! For each InfoSet and action, the instantaneous gain is how much better
//! the action does than the InfoSet's expected utility, floored at zero:
//!
//! ```text
//! gain(I, a)  = max(0, u(I, a) - EU(I))
//! G(I, a)    += gain(I, a) * L(I)
//! σ'(I, a)    = G(I, a) / Σ_b G(I, b)
//! ```
//!
//! The unweighted sum of all gains in an iteration is the convergence signal.

use log::warn;

use crate::cfr::config::ZeroGainPolicy;
use crate::cfr::error::{Phase, SolverError};
use crate::cfr::game::Symbol;
use crate::cfr::registry::InfoSetRegistry;
use crate::cfr::storage::InfoSetTable;

/// Accumulate this iteration's gains into the cumulative gains.
///
/// Utilities and likelihoods must be current. Returns the total gain added
/// over all InfoSets and actions, before likelihood weighting.
pub fn accumulate_gains<P: Symbol, A: Symbol>(
    registry: &InfoSetRegistry<P, A>,
    table: &mut InfoSetTable,
) -> f64 {
    let mut total = 0.0;
    for &id in registry.order() {
        let state = table.get_mut(id);
        let expected = state.expected_utility;
        let likelihood = state.likelihood;
        for (cumulative, &utility) in state
            .cumulative_gain
            .iter_mut()
            .zip(&state.action_utilities)
        {
            let gain = (utility - expected).max(0.0);
            total += gain;
            *cumulative += gain * likelihood;
        }
    }
    total
}

/// Renormalize cumulative gains into the next strategy of every InfoSet.
///
/// # Errors
/// `DegenerateStrategyUpdate` if an InfoSet's cumulative gain totals zero
/// and `policy` is [`ZeroGainPolicy::Fail`].
pub fn update_strategies<P: Symbol, A: Symbol>(
    registry: &InfoSetRegistry<P, A>,
    table: &mut InfoSetTable,
    policy: ZeroGainPolicy,
) -> Result<(), SolverError> {
    for &id in registry.order() {
        let state = table.get_mut(id);
        let total: f64 = state.cumulative_gain.iter().sum();

        if total > 0.0 {
            for (p, g) in state.strategy.iter_mut().zip(&state.cumulative_gain) {
                *p = g / total;
            }
            continue;
        }

        let key = &registry.node(id).text;
        match policy {
            ZeroGainPolicy::Fail => {
                return Err(SolverError::DegenerateStrategyUpdate {
                    key: key.clone(),
                    phase: Phase::Strategy,
                });
            }
            ZeroGainPolicy::Uniform => {
                warn!("info set {} has zero cumulative gain, using uniform strategy", key);
                let n = state.strategy.len() as f64;
                state.strategy.iter_mut().for_each(|p| *p = 1.0 / n);
            }
        }
    }
    Ok(())
}
