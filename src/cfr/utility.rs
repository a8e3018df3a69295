//! Utility evaluator.
//!
//! Action utilities are expectations over the InfoSet's beliefs and over the
//! other players' current strategies, down to either a payoff or the deciding
//! player's own next InfoSet, whose expected utility is already known because
//! InfoSets are visited deepest first.

use crate::cfr::game::Symbol;
use crate::cfr::registry::{InfoSetRegistry, Leaf};
use crate::cfr::storage::InfoSetTable;

/// Recompute action utilities and expected utility of every InfoSet.
///
/// Beliefs must be current. Visits InfoSets in reverse topological order.
pub fn update_utilities<P: Symbol, A: Symbol>(
    registry: &InfoSetRegistry<P, A>,
    table: &mut InfoSetTable,
) {
    for &id in registry.order().iter().rev() {
        let node = registry.node(id);
        let state = table.get(id);

        let utilities: Vec<f64> = node
            .outcomes
            .iter()
            .map(|outcomes| {
                outcomes
                    .iter()
                    .map(|outcome| {
                        let leaf = match outcome.leaf {
                            Leaf::Payoff(payoff) => payoff,
                            Leaf::InfoSet(next) => {
                                debug_assert!(registry.node(next).depth() > node.depth());
                                table.get(next).expected_utility
                            }
                        };
                        state.beliefs[outcome.candidate]
                            * table.chain_probability(&outcome.moves)
                            * leaf
                    })
                    .sum()
            })
            .collect();
        let expected: f64 = utilities
            .iter()
            .zip(&state.strategy)
            .map(|(u, s)| u * s)
            .sum();

        let state = table.get_mut(id);
        state.action_utilities = utilities;
        state.expected_utility = expected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::belief::update_beliefs;
    use crate::games::coin::CoinGame;
    use crate::games::kuhn::{Card, KuhnAction, KuhnPoker};

    type KuhnRegistry = InfoSetRegistry<Card, KuhnAction>;

    fn uniform_kuhn() -> (KuhnRegistry, InfoSetTable) {
        let registry = InfoSetRegistry::build(&KuhnPoker::new()).unwrap();
        let mut table = InfoSetTable::new(&registry, true);
        update_beliefs(&registry, &mut table).unwrap();
        update_utilities(&registry, &mut table);
        (registry, table)
    }

    fn utilities(registry: &KuhnRegistry, table: &InfoSetTable, text: &str) -> Vec<f64> {
        let id = registry.get_by_text(text).unwrap();
        table.get(id).action_utilities.clone()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_terminal_only_info_sets() {
        let (registry, table) = uniform_kuhn();
        // Facing a bet with the Jack: fold loses 1, call loses 2.
        assert_close(&utilities(&registry, &table, "0:b"), &[-1.0, -2.0]);
        // With the King: fold loses 1, call always wins 2.
        assert_close(&utilities(&registry, &table, "2:pb"), &[-1.0, 2.0]);
        // Queen's call beats the Jack and loses to the King, equally likely.
        assert_close(&utilities(&registry, &table, "1:b"), &[-1.0, 0.0]);
    }

    #[test]
    fn test_utilities_back_up_through_own_next_info_set() {
        let (registry, table) = uniform_kuhn();
        let jack_pb = registry.get_by_text("0:pb").unwrap();
        assert!((table.get(jack_pb).expected_utility + 1.5).abs() < 1e-12);

        // Jack passes: opponent passes (lose 1) or bets into "0:pb" (EU -1.5).
        // Jack bets: opponent folds (win 1) or calls (lose 2).
        assert_close(&utilities(&registry, &table, "0:"), &[-1.25, -0.5]);
        let jack = registry.get_by_text("0:").unwrap();
        assert!((table.get(jack).expected_utility + 0.875).abs() < 1e-12);
    }

    #[test]
    fn test_utilities_chain_through_several_opponents() {
        let game = CoinGame::new(3, 1).unwrap();
        let registry = InfoSetRegistry::build(&game).unwrap();
        let mut table = InfoSetTable::new(&registry, true);
        update_beliefs(&registry, &mut table).unwrap();
        update_utilities(&registry, &mut table);

        let id = |text: &str| registry.get_by_text(text).unwrap();

        // First to guess holding nothing: both opponents reply before the
        // game ends. A total of 3 is impossible without a coin.
        let first = &table.get(id("0:")).action_utilities;
        assert_close(first, &[0.0, 2.0 / 3.0, 0.0, -2.0 / 3.0]);

        // Last to guess holding one coin after 3 and 0: the opponents'
        // holdings stay uniform, so the total is 2 half of the time.
        let last = &table.get(id("1:3,0")).action_utilities;
        assert_close(last, &[0.25, 0.75]);
    }
}
