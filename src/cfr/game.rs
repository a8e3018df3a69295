//! Game trait definition for the CFR solver.
//!
//! A game is described the way the solver consumes it: a private-type
//! alphabet with a joint prior over who holds what, an action alphabet, a
//! turn order that depends only on how long the public history is, a terminal
//! predicate and a payoff function. Any game that implements [`Game`] can be
//! enumerated into an [`InfoSetRegistry`](crate::cfr::InfoSetRegistry) and solved.

use std::fmt::Debug;
use std::hash::Hash;

use crate::cfr::error::SolverError;

/// Trait for private types and actions.
///
/// Symbols are small copyable values with a stable textual form. The text is
/// what appears in InfoSet keys and in persisted strategy files, so
/// `from_symbol(&x.symbol())` must return `Some(x)`.
pub trait Symbol: Copy + Eq + Hash + Ord + Debug {
    /// Textual form used in keys and persisted strategies.
    fn symbol(&self) -> String;

    /// Parse the textual form back.
    fn from_symbol(text: &str) -> Option<Self>;
}

/// One assignment of private types to player slots, with its prior probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Deal<P> {
    /// Private type of each player, indexed by player slot.
    pub types: Vec<P>,
    /// Prior probability of this assignment.
    pub probability: f64,
}

impl<P> Deal<P> {
    /// Create a new deal.
    pub fn new(types: Vec<P>, probability: f64) -> Self {
        Self { types, probability }
    }
}

/// Identity of an information set: the acting player's private type plus the
/// public history so far.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InfoSetKey<P, A> {
    /// The acting player's private type.
    pub private: P,
    /// Public action history.
    pub history: Vec<A>,
}

impl<P: Symbol, A: Symbol> InfoSetKey<P, A> {
    /// Create a new key.
    pub fn new(private: P, history: Vec<A>) -> Self {
        Self { private, history }
    }

    /// Textual form `"{private}:{history}"`, history symbols joined by `separator`.
    pub fn text(&self, separator: &str) -> String {
        format!(
            "{}:{}",
            self.private.symbol(),
            history_text(&self.history, separator)
        )
    }
}

/// Join history symbols with a separator.
pub fn history_text<A: Symbol>(history: &[A], separator: &str) -> String {
    history
        .iter()
        .map(Symbol::symbol)
        .collect::<Vec<_>>()
        .join(separator)
}

/// The main Game trait that defines the interface for any game.
///
/// # Example
/// ```ignore
/// struct MyGame;
///
/// impl Game for MyGame {
///     type Private = MyCard;
///     type Action = MyAction;
///
///     // ... implement required methods
/// }
/// ```
pub trait Game {
    /// A player's hidden type (a card, a number of coins...).
    type Private: Symbol;

    /// A public action symbol.
    type Action: Symbol;

    /// Separator between action symbols in textual keys.
    const HISTORY_SEPARATOR: &'static str = "";

    /// Short identifier of the game instance, stored in artifact metadata.
    fn name(&self) -> String;

    /// Get the total number of players in the game.
    fn num_players(&self) -> usize;

    /// The private-type alphabet.
    fn private_types(&self) -> Vec<Self::Private>;

    /// The full action alphabet.
    fn action_alphabet(&self) -> Vec<Self::Action>;

    /// Joint prior over private-type assignments.
    ///
    /// Probabilities must be non-negative and sum to one.
    fn deals(&self) -> Vec<Deal<Self::Private>>;

    /// Index of the player who acts after `history_len` public actions.
    fn deciding_player(&self, history_len: usize) -> usize;

    /// Legal next actions. Returns an empty vector at terminal histories.
    fn legal_actions(&self, history: &[Self::Action]) -> Vec<Self::Action>;

    /// Check if the history ends the game.
    fn is_terminal(&self, history: &[Self::Action]) -> bool;

    /// Payoff vector of a terminal history, one entry per player slot.
    ///
    /// `types` is indexed by player slot, like [`Deal::types`].
    ///
    /// # Errors
    /// `InvalidHistory` if `history` is not terminal or not producible.
    fn payoff(
        &self,
        types: &[Self::Private],
        history: &[Self::Action],
    ) -> Result<Vec<f64>, SolverError>;

    /// Upper bound on the length of any history.
    fn max_history_len(&self) -> usize;

    /// Textual form of a history.
    fn history_text(&self, history: &[Self::Action]) -> String {
        history_text(history, Self::HISTORY_SEPARATOR)
    }

    /// Textual form of an InfoSet key.
    fn key_text(&self, key: &InfoSetKey<Self::Private, Self::Action>) -> String {
        key.text(Self::HISTORY_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    struct Digit(u8);

    impl Symbol for Digit {
        fn symbol(&self) -> String {
            self.0.to_string()
        }

        fn from_symbol(text: &str) -> Option<Self> {
            text.parse().ok().map(Digit)
        }
    }

    #[test]
    fn test_key_text() {
        let key = InfoSetKey::new(Digit(1), vec![Digit(3), Digit(0)]);
        assert_eq!(key.text(","), "1:3,0");
        assert_eq!(key.text(""), "1:30");

        let root = InfoSetKey::new(Digit(2), Vec::<Digit>::new());
        assert_eq!(root.text(","), "2:");
    }

    #[test]
    fn test_symbol_round_trip() {
        let d = Digit(7);
        assert_eq!(Digit::from_symbol(&d.symbol()), Some(d));
        assert_eq!(Digit::from_symbol("x"), None);
    }
}
