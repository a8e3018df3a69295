//! Kuhn Poker implementation for CFR validation.
//!
//! Kuhn Poker is a simplified poker game used to validate CFR implementations
//! because it has a known, mathematically proven Nash equilibrium.
//!
//! ## Game Rules
//!
//! - 3 cards: Jack (0), Queen (1), King (2); larger decks via [`KuhnPoker::with_ranks`]
//! - 2 players, each antes 1 chip
//! - Each player receives 1 card, every ordered pair of distinct cards is equally likely
//! - Player 1 acts first: Pass or Bet (1 chip)
//! - Player 2 responds based on P1's action
//! - Higher card wins at showdown
//!
//! ## Game Tree
//!
//! ```text
//! P1 (first to act)
//! ├── Pass
//! │   └── P2
//! │       ├── Pass → Showdown (pot = 2)
//! │       └── Bet
//! │           └── P1
//! │               ├── Pass → P2 wins (pot = 3)
//! │               └── Bet → Showdown (pot = 4)
//! └── Bet
//!     └── P2
//!         ├── Pass → P1 wins (pot = 3)
//!         └── Bet → Showdown (pot = 4)
//! ```
//!
//! ## Known Nash Equilibrium
//!
//! - **Player 1 with Jack**: Bet with probability α ∈ [0, 1/3]
//! - **Player 1 with Queen**: Always Pass
//! - **Player 1 with King**: Bet with probability 3α
//! - **Player 2 facing Bet with Jack**: Always Fold
//! - **Player 2 facing Bet with Queen**: Call with probability 1/3
//! - **Player 2 facing Bet with King**: Always Call
//!
//! **Expected Value**: Player 1 EV = -1/18 ≈ -0.0556
//!
//! ## Keys
//!
//! InfoSet keys are `"{card}:{history}"` with no separator between actions,
//! e.g. `"2:pb"` is the King facing a bet after passing.

use std::fmt;

use crate::cfr::config::ConfigError;
use crate::cfr::error::SolverError;
use crate::cfr::game::{Deal, Game, Symbol};

/// A card, by rank. 0 is the lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card(pub u8);

impl Symbol for Card {
    fn symbol(&self) -> String {
        self.0.to_string()
    }

    fn from_symbol(text: &str) -> Option<Self> {
        text.parse().ok().map(Card)
    }
}

/// Actions in Kuhn Poker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KuhnAction {
    /// Pass (check if no bet, fold if facing bet)
    Pass,
    /// Bet (or call if facing bet)
    Bet,
}

impl Symbol for KuhnAction {
    fn symbol(&self) -> String {
        match self {
            KuhnAction::Pass => "p".to_string(),
            KuhnAction::Bet => "b".to_string(),
        }
    }

    fn from_symbol(text: &str) -> Option<Self> {
        match text {
            "p" => Some(KuhnAction::Pass),
            "b" => Some(KuhnAction::Bet),
            _ => None,
        }
    }
}

impl fmt::Display for KuhnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KuhnAction::Pass => write!(f, "Pass"),
            KuhnAction::Bet => write!(f, "Bet"),
        }
    }
}

/// Kuhn Poker game.
#[derive(Debug, Clone)]
pub struct KuhnPoker {
    num_cards: u8,
}

impl Default for KuhnPoker {
    fn default() -> Self {
        Self::new()
    }
}

impl KuhnPoker {
    /// Create the classic three-card game.
    pub fn new() -> Self {
        Self { num_cards: 3 }
    }

    /// Create a game with `num_cards` distinct ranks.
    pub fn with_ranks(num_cards: u8) -> Result<Self, ConfigError> {
        if num_cards < 2 {
            return Err(ConfigError::InvalidGame(format!(
                "Kuhn poker needs at least 2 ranks, got {}",
                num_cards
            )));
        }
        Ok(Self { num_cards })
    }

    /// Number of ranks in the deck.
    pub fn num_cards(&self) -> u8 {
        self.num_cards
    }

    /// Get card name for display.
    pub fn card_name(&self, card: Card) -> String {
        match (self.num_cards, card.0) {
            (3, 0) => "Jack".to_string(),
            (3, 1) => "Queen".to_string(),
            (3, 2) => "King".to_string(),
            (_, rank) => format!("rank {}", rank),
        }
    }

    fn check_deal(&self, types: &[Card], history: &[KuhnAction]) -> Result<(), SolverError> {
        let valid = types.len() == 2
            && types[0] != types[1]
            && types.iter().all(|c| c.0 < self.num_cards);
        if valid {
            Ok(())
        } else {
            Err(SolverError::invalid_history(
                self.history_text(history),
                format!("{:?} is not a deal of {} distinct ranks", types, self.num_cards),
            ))
        }
    }
}

impl Game for KuhnPoker {
    type Private = Card;
    type Action = KuhnAction;

    fn name(&self) -> String {
        format!("kuhn-{}", self.num_cards)
    }

    fn num_players(&self) -> usize {
        2
    }

    fn private_types(&self) -> Vec<Card> {
        (0..self.num_cards).map(Card).collect()
    }

    fn action_alphabet(&self) -> Vec<KuhnAction> {
        vec![KuhnAction::Pass, KuhnAction::Bet]
    }

    fn deals(&self) -> Vec<Deal<Card>> {
        let n = self.num_cards as f64;
        let probability = 1.0 / (n * (n - 1.0));
        let mut deals = Vec::new();
        for first in 0..self.num_cards {
            for second in (0..self.num_cards).filter(|&c| c != first) {
                deals.push(Deal::new(vec![Card(first), Card(second)], probability));
            }
        }
        deals
    }

    fn deciding_player(&self, history_len: usize) -> usize {
        // P0 at even history length, P1 at odd ("pb" comes back to P0)
        history_len % 2
    }

    fn legal_actions(&self, history: &[KuhnAction]) -> Vec<KuhnAction> {
        if self.is_terminal(history) || history.len() >= self.max_history_len() {
            return vec![];
        }
        // Both actions always available when not terminal
        vec![KuhnAction::Pass, KuhnAction::Bet]
    }

    fn is_terminal(&self, history: &[KuhnAction]) -> bool {
        use KuhnAction::{Bet, Pass};
        // "pp" - both pass, showdown
        // "pbp" - pass, bet, fold
        // "pbb" - pass, bet, call
        // "bp" - bet, fold
        // "bb" - bet, call
        matches!(
            history,
            [Pass, Pass] | [Pass, Bet, Pass] | [Pass, Bet, Bet] | [Bet, Pass] | [Bet, Bet]
        )
    }

    fn payoff(&self, types: &[Card], history: &[KuhnAction]) -> Result<Vec<f64>, SolverError> {
        use KuhnAction::{Bet, Pass};

        if !self.is_terminal(history) {
            return Err(SolverError::invalid_history(
                self.history_text(history),
                "not a terminal history",
            ));
        }
        self.check_deal(types, history)?;

        let showdown = if types[0] > types[1] { 1.0 } else { -1.0 };

        // Payoff for player 0; player 1 gets the negation
        let p0_payoff = match history {
            // Showdown after both pass - pot is 2 (1+1 ante)
            [Pass, Pass] => showdown,
            // Player 2 folded to the opening bet
            [Bet, Pass] => 1.0,
            // Player 1 folded to player 2's bet
            [Pass, Bet, Pass] => -1.0,
            // Showdown after bet-call - pot is 4 (2+2)
            _ => 2.0 * showdown,
        };

        Ok(vec![p0_payoff, -p0_payoff])
    }

    fn max_history_len(&self) -> usize {
        3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::KuhnAction::{Bet, Pass};
    use crate::cfr::{CFRSolver, InfoSetKey, InfoSetRegistry, SolverConfig, Termination};

    const TERMINALS: [&[KuhnAction]; 5] = [
        &[Pass, Pass],
        &[Bet, Pass],
        &[Bet, Bet],
        &[Pass, Bet, Pass],
        &[Pass, Bet, Bet],
    ];

    #[test]
    fn test_kuhn_game_tree() {
        let game = KuhnPoker::new();

        assert!(!game.is_terminal(&[]));
        assert_eq!(game.deciding_player(0), 0);
        assert_eq!(game.legal_actions(&[]), vec![Pass, Bet]);

        // After "pb", P0 acts again
        assert!(!game.is_terminal(&[Pass, Bet]));
        assert_eq!(game.deciding_player(2), 0);

        for terminal in TERMINALS {
            assert!(game.is_terminal(terminal));
            assert!(game.legal_actions(terminal).is_empty());
        }

        let deals = game.deals();
        assert_eq!(deals.len(), 6);
        let total: f64 = deals.iter().map(|d| d.probability).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_kuhn_terminal_payoffs() {
        let game = KuhnPoker::new();
        let king_jack = [Card(2), Card(0)];
        let jack_king = [Card(0), Card(2)];

        // "pp" - both pass, higher card wins
        assert_eq!(game.payoff(&king_jack, &[Pass, Pass]).unwrap(), vec![1.0, -1.0]);
        // "bp" - bet then fold
        assert_eq!(game.payoff(&jack_king, &[Bet, Pass]).unwrap(), vec![1.0, -1.0]);
        // "pbp" - P1 folds to P2's bet
        assert_eq!(game.payoff(&king_jack, &[Pass, Bet, Pass]).unwrap(), vec![-1.0, 1.0]);
        // "bb" - bet then call, showdown
        assert_eq!(game.payoff(&jack_king, &[Bet, Bet]).unwrap(), vec![-2.0, 2.0]);
        assert_eq!(game.payoff(&king_jack, &[Pass, Bet, Bet]).unwrap(), vec![2.0, -2.0]);
    }

    #[test]
    fn test_kuhn_payoffs_are_zero_sum() {
        let game = KuhnPoker::new();
        for deal in game.deals() {
            for history in TERMINALS {
                let payoff = game.payoff(&deal.types, history).unwrap();
                assert_eq!(payoff[0] + payoff[1], 0.0);
            }
        }
    }

    #[test]
    fn test_kuhn_invalid_histories() {
        let game = KuhnPoker::new();
        let deal = [Card(1), Card(2)];

        assert!(matches!(
            game.payoff(&deal, &[Pass]),
            Err(SolverError::InvalidHistory { .. })
        ));
        assert!(game.payoff(&[Card(1), Card(1)], &[Bet, Bet]).is_err());
        assert!(game.payoff(&[Card(1), Card(3)], &[Bet, Bet]).is_err());
        assert!(game.payoff(&deal, &[Pass, Pass, Pass]).is_err());
        assert!(KuhnPoker::with_ranks(1).is_err());
    }

    #[test]
    fn test_kuhn_info_states() {
        let game = KuhnPoker::new();
        // Current player is P1 (index 1) holding the King after a pass
        let key = InfoSetKey::new(Card(2), vec![Pass]);
        assert_eq!(game.key_text(&key), "2:p");
        assert_eq!(game.deciding_player(key.history.len()), 1);
        assert_eq!(KuhnAction::from_symbol("b"), Some(Bet));
        assert_eq!(Card::from_symbol("2"), Some(Card(2)));
    }

    #[test]
    fn test_kuhn_larger_deck() {
        let game = KuhnPoker::with_ranks(4).unwrap();
        assert_eq!(game.name(), "kuhn-4");
        let registry = InfoSetRegistry::build(&game).unwrap();
        // 4 cards x 4 decision histories
        assert_eq!(registry.len(), 16);
        let node = registry.node(registry.get_by_text("3:b").unwrap());
        assert_eq!(node.candidates.len(), 3);
    }

    #[test]
    fn test_kuhn_cfr_convergence() {
        let game = KuhnPoker::new();
        let config = SolverConfig::default()
            .with_max_iterations(10_000)
            .with_gain_threshold(1e-6)
            .with_telemetry_interval(100);
        let mut solver = CFRSolver::new(game, config).unwrap();

        let stats = solver.solve().unwrap().clone();
        assert_eq!(stats.iterations, 10_000);
        assert_eq!(stats.termination, Termination::IterationBudget);

        // Total gain trends down: the first sweep adds by far the most gain
        let first = stats.gain_history.first().unwrap();
        let at_1000 = stats
            .gain_history
            .iter()
            .find(|s| s.iteration == 1_000)
            .unwrap();
        assert_eq!(first.iteration, 1);
        assert!((first.total_gain - 6.875).abs() < 1e-9);
        assert!(stats.final_gain < first.total_gain / 10.0);
        assert!(stats.final_gain < at_1000.total_gain);

        // Index 0 = Pass, Index 1 = Bet
        let jack = solver.strategy_by_text("0:").unwrap();
        let queen = solver.strategy_by_text("1:").unwrap();
        let king = solver.strategy_by_text("2:").unwrap();
        println!("Jack strategy: Pass={:.3}, Bet={:.3}", jack[0], jack[1]);
        println!("Queen strategy: Pass={:.3}, Bet={:.3}", queen[0], queen[1]);
        println!("King strategy: Pass={:.3}, Bet={:.3}", king[0], king[1]);

        assert!(king[1] > jack[1], "King should bet more often than Jack");
        assert!(queen[0] > 0.9, "Queen pass probability {} should be near 1.0", queen[0]);

        // P2 facing a bet
        let p2_jack_vs_bet = solver.strategy_by_text("0:b").unwrap();
        let p2_king_vs_bet = solver.strategy_by_text("2:b").unwrap();
        assert!(p2_jack_vs_bet[0] > 0.95, "P2 Jack should fold to bet");
        assert!(p2_king_vs_bet[1] > 0.95, "P2 King should call bet");

        // P1 facing a bet after passing
        assert!(solver.strategy_by_text("0:pb").unwrap()[0] > 0.95);
        assert!(solver.strategy_by_text("2:pb").unwrap()[1] > 0.95);

        let value = solver.root_value();
        println!("P1 value: {:.4}", value);
        assert!((value + 1.0 / 18.0).abs() < 0.01, "P1 value {} should be near -1/18", value);
    }
}
