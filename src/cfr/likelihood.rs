//! Likelihood calculator.
//!
//! The likelihood of an InfoSet is the probability, over the prior and the
//! other players' current strategies, that play reaches its public history
//! given that the deciding player chose to get there. The deciding player's
//! own strategy is excluded, so this is the counterfactual reach used to
//! weight gains.
//!
//! Each candidate's opponent move chain already contains one move per
//! ancestor on the way down, so the recursive product over ancestors reduces
//! to summing candidate masses.

use crate::cfr::belief::candidate_mass;
use crate::cfr::game::Symbol;
use crate::cfr::registry::{InfoSetRegistry, PRIOR_TOLERANCE};
use crate::cfr::storage::InfoSetTable;

/// Recompute the likelihood of every InfoSet, roots first.
pub fn update_likelihoods<P: Symbol, A: Symbol>(
    registry: &InfoSetRegistry<P, A>,
    table: &mut InfoSetTable,
) {
    for &id in registry.order() {
        let likelihood: f64 = registry
            .node(id)
            .candidates
            .iter()
            .map(|c| candidate_mass(c, table))
            .sum();
        debug_assert!(
            likelihood <= 1.0 + PRIOR_TOLERANCE,
            "likelihood {} of {} exceeds 1",
            likelihood,
            registry.node(id).text
        );
        table.get_mut(id).likelihood = likelihood;
    }
}
