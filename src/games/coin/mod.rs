//! Coin guessing game.
//!
//! ## Game Rules
//!
//! - n players (n ≥ 2), each secretly holds between 0 and c coins (c ≥ 1)
//! - Every holding is equally likely, independently per player
//! - Players guess the total number of coins in seat order, once each
//! - A total already guessed by an earlier player cannot be guessed again
//! - The player who guessed the total wins n - 1 chips, everyone else pays 1
//! - If nobody guessed it, nobody pays
//!
//! ## Keys
//!
//! InfoSet keys are `"{coins}:{guesses}"` with guesses separated by commas,
//! since totals can have more than one digit. For example `"1:3,0"` is the
//! third player holding one coin after the others guessed 3 and 0.

use std::fmt;

use crate::cfr::config::ConfigError;
use crate::cfr::error::SolverError;
use crate::cfr::game::{Deal, Game, Symbol};

/// Number of coins a player holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coins(pub u8);

impl Symbol for Coins {
    fn symbol(&self) -> String {
        self.0.to_string()
    }

    fn from_symbol(text: &str) -> Option<Self> {
        text.parse().ok().map(Coins)
    }
}

/// A guess of the total number of coins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guess(pub u16);

impl Symbol for Guess {
    fn symbol(&self) -> String {
        self.0.to_string()
    }

    fn from_symbol(text: &str) -> Option<Self> {
        text.parse().ok().map(Guess)
    }
}

impl fmt::Display for Guess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coin guessing game for `num_players` players holding up to `max_coins` each.
#[derive(Debug, Clone)]
pub struct CoinGame {
    num_players: usize,
    max_coins: u8,
}

impl CoinGame {
    /// Create a new game.
    pub fn new(num_players: usize, max_coins: u8) -> Result<Self, ConfigError> {
        if num_players < 2 {
            return Err(ConfigError::InvalidGame(format!(
                "coin game needs at least 2 players, got {}",
                num_players
            )));
        }
        if max_coins < 1 {
            return Err(ConfigError::InvalidGame(
                "coin game needs at least 1 coin per player".to_string(),
            ));
        }
        let too_large = num_players
            .checked_mul(max_coins as usize)
            .map_or(true, |total| total > u16::MAX as usize);
        if too_large {
            return Err(ConfigError::InvalidGame(format!(
                "{} players with {} coins exceed the guess range",
                num_players, max_coins
            )));
        }
        let holdings = max_coins as usize + 1;
        if holdings.checked_pow(num_players as u32).is_none() {
            return Err(ConfigError::InvalidGame(format!(
                "{} players with up to {} coins have too many deals to enumerate",
                num_players, max_coins
            )));
        }
        Ok(Self {
            num_players,
            max_coins,
        })
    }

    /// Maximum coins per player.
    pub fn max_coins(&self) -> u8 {
        self.max_coins
    }

    /// Largest possible total.
    pub fn max_total(&self) -> u16 {
        (self.num_players * self.max_coins as usize) as u16
    }

    fn check_deal(&self, types: &[Coins], history: &[Guess]) -> Result<(), SolverError> {
        if types.len() != self.num_players || types.iter().any(|c| c.0 > self.max_coins) {
            return Err(SolverError::invalid_history(
                self.history_text(history),
                format!(
                    "{:?} is not a deal of 0..={} coins to {} players",
                    types, self.max_coins, self.num_players
                ),
            ));
        }
        Ok(())
    }

    fn check_guesses(&self, history: &[Guess]) -> Result<(), SolverError> {
        for (i, guess) in history.iter().enumerate() {
            if guess.0 > self.max_total() || history[..i].contains(guess) {
                return Err(SolverError::invalid_history(
                    self.history_text(history),
                    format!("guess {} is not legal at position {}", guess, i),
                ));
            }
        }
        Ok(())
    }
}

impl Game for CoinGame {
    type Private = Coins;
    type Action = Guess;

    const HISTORY_SEPARATOR: &'static str = ",";

    fn name(&self) -> String {
        format!("coin-{}x{}", self.num_players, self.max_coins)
    }

    fn num_players(&self) -> usize {
        self.num_players
    }

    fn private_types(&self) -> Vec<Coins> {
        (0..=self.max_coins).map(Coins).collect()
    }

    fn action_alphabet(&self) -> Vec<Guess> {
        (0..=self.max_total()).map(Guess).collect()
    }

    fn deals(&self) -> Vec<Deal<Coins>> {
        let base = self.max_coins as usize + 1;
        let count = base.pow(self.num_players as u32);
        let probability = 1.0 / count as f64;

        // Odometer over all holdings, first player's count most significant
        (0..count)
            .map(|mut index| {
                let mut types = vec![Coins(0); self.num_players];
                for slot in types.iter_mut().rev() {
                    *slot = Coins((index % base) as u8);
                    index /= base;
                }
                Deal::new(types, probability)
            })
            .collect()
    }

    fn deciding_player(&self, history_len: usize) -> usize {
        history_len % self.num_players
    }

    fn legal_actions(&self, history: &[Guess]) -> Vec<Guess> {
        if self.is_terminal(history) {
            return vec![];
        }
        (0..=self.max_total())
            .map(Guess)
            .filter(|g| !history.contains(g))
            .collect()
    }

    fn is_terminal(&self, history: &[Guess]) -> bool {
        history.len() >= self.num_players
    }

    fn payoff(&self, types: &[Coins], history: &[Guess]) -> Result<Vec<f64>, SolverError> {
        if history.len() != self.num_players {
            return Err(SolverError::invalid_history(
                self.history_text(history),
                format!("expected {} guesses", self.num_players),
            ));
        }
        self.check_deal(types, history)?;
        self.check_guesses(history)?;

        let total: u16 = types.iter().map(|c| c.0 as u16).sum();
        let payoff = match history.iter().position(|g| g.0 == total) {
            Some(winner) => (0..self.num_players)
                .map(|p| {
                    if p == winner {
                        (self.num_players - 1) as f64
                    } else {
                        -1.0
                    }
                })
                .collect(),
            None => vec![0.0; self.num_players],
        };
        Ok(payoff)
    }

    fn max_history_len(&self) -> usize {
        self.num_players
    }
}
