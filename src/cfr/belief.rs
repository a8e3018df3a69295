//! Belief updater.
//!
//! The belief of an InfoSet is the posterior over its candidate deals given
//! the public history: each candidate's prior times the probability that the
//! other players, holding that deal, made the moves in the history.

use crate::cfr::error::{Phase, SolverError};
use crate::cfr::game::Symbol;
use crate::cfr::registry::{Candidate, InfoSetRegistry};
use crate::cfr::storage::InfoSetTable;

/// Prior of a candidate times the probability of its opponent move chain.
pub(crate) fn candidate_mass<P>(candidate: &Candidate<P>, table: &InfoSetTable) -> f64 {
    candidate.prior * table.chain_probability(&candidate.chain)
}

/// Recompute the beliefs of every InfoSet from the current strategies.
///
/// # Errors
/// `DegenerateBelief` if no candidate of some InfoSet has positive mass,
/// i.e. the current strategies make its history impossible.
pub fn update_beliefs<P: Symbol, A: Symbol>(
    registry: &InfoSetRegistry<P, A>,
    table: &mut InfoSetTable,
) -> Result<(), SolverError> {
    for &id in registry.order() {
        let node = registry.node(id);
        let masses: Vec<f64> = node
            .candidates
            .iter()
            .map(|c| candidate_mass(c, table))
            .collect();
        let total: f64 = masses.iter().sum();

        if !(total > 0.0) {
            return Err(SolverError::DegenerateBelief {
                key: node.text.clone(),
                phase: Phase::Belief,
            });
        }

        let beliefs = &mut table.get_mut(id).beliefs;
        for (belief, mass) in beliefs.iter_mut().zip(&masses) {
            *belief = mass / total;
        }
    }
    Ok(())
}
