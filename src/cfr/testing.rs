//! Tiny games for exercising edge cases of the solver.

use crate::cfr::error::SolverError;
use crate::cfr::game::{Deal, Game, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(pub u8);

impl Symbol for Token {
    fn symbol(&self) -> String {
        self.0.to_string()
    }

    fn from_symbol(text: &str) -> Option<Self> {
        text.parse().ok().map(Token)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Left,
    Right,
}

impl Symbol for Side {
    fn symbol(&self) -> String {
        match self {
            Side::Left => "l".to_string(),
            Side::Right => "r".to_string(),
        }
    }

    fn from_symbol(text: &str) -> Option<Self> {
        match text {
            "l" => Some(Side::Left),
            "r" => Some(Side::Right),
            _ => None,
        }
    }
}

/// Two players, one private type each, two moves in turn.
///
/// Player 0 wins 1 if the sides match and loses 1 otherwise, unless the
/// game is `flat`, where every ending pays nothing.
#[derive(Debug, Clone)]
pub struct Toy {
    flat: bool,
    endless: bool,
    prior_scale: f64,
}

impl Toy {
    pub fn matching() -> Self {
        Self {
            flat: false,
            endless: false,
            prior_scale: 1.0,
        }
    }

    pub fn flat() -> Self {
        Self {
            flat: true,
            ..Self::matching()
        }
    }

    pub fn endless(mut self) -> Self {
        self.endless = true;
        self
    }

    pub fn with_prior_scale(mut self, scale: f64) -> Self {
        self.prior_scale = scale;
        self
    }
}

impl Game for Toy {
    type Private = Token;
    type Action = Side;

    fn name(&self) -> String {
        "toy".to_string()
    }

    fn num_players(&self) -> usize {
        2
    }

    fn private_types(&self) -> Vec<Token> {
        vec![Token(0)]
    }

    fn action_alphabet(&self) -> Vec<Side> {
        vec![Side::Left, Side::Right]
    }

    fn deals(&self) -> Vec<Deal<Token>> {
        vec![Deal::new(vec![Token(0), Token(0)], self.prior_scale)]
    }

    fn deciding_player(&self, history_len: usize) -> usize {
        history_len % 2
    }

    fn legal_actions(&self, history: &[Side]) -> Vec<Side> {
        if self.is_terminal(history) {
            Vec::new()
        } else {
            vec![Side::Left, Side::Right]
        }
    }

    fn is_terminal(&self, history: &[Side]) -> bool {
        !self.endless && history.len() == 2
    }

    fn payoff(&self, _types: &[Token], history: &[Side]) -> Result<Vec<f64>, SolverError> {
        if !self.is_terminal(history) {
            return Err(SolverError::invalid_history(
                self.history_text(history),
                "not a terminal history",
            ));
        }
        if self.flat {
            return Ok(vec![0.0, 0.0]);
        }
        let first = if history[0] == history[1] { 1.0 } else { -1.0 };
        Ok(vec![first, -first])
    }

    fn max_history_len(&self) -> usize {
        4
    }
}
