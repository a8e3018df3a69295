//! Playing games with a solved strategy profile.
//!
//! [`Bot`] turns a [`StrategyProfile`] back into moves; [`play_hand`] runs
//! one hand of any [`Game`] with the moves supplied by a callback, so the
//! same loop serves bots, humans at a terminal and tests.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use thiserror::Error;

use crate::cfr::error::SolverError;
use crate::cfr::game::{Game, InfoSetKey, Symbol};
use crate::cfr::profile::{ProfileError, StrategyProfile};

/// Errors while playing a hand.
#[derive(Debug, Error)]
pub enum PlayError {
    /// The profile could not supply a move.
    #[error(transparent)]
    Profile(#[from] ProfileError),
    /// The game rejected a deal or history.
    #[error(transparent)]
    Solver(#[from] SolverError),
    /// A move that is not legal at the current history.
    #[error("action `{action}` is not legal after `{history}`")]
    IllegalAction {
        /// Offending action symbol.
        action: String,
        /// History text at the time.
        history: String,
    },
    /// Terminal input failed.
    #[error("input failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Plays by sampling a strategy profile.
#[derive(Debug, Clone)]
pub struct Bot<R: Rng> {
    profile: StrategyProfile,
    rng: R,
}

impl<R: Rng> Bot<R> {
    /// Create a bot from a profile and a random source.
    pub fn new(profile: StrategyProfile, rng: R) -> Self {
        Self { profile, rng }
    }

    /// The profile the bot plays.
    pub fn profile(&self) -> &StrategyProfile {
        &self.profile
    }

    /// Choose an action for `private` at `history`.
    ///
    /// # Errors
    /// `UnknownInfoSet` if the profile was solved for a different game,
    /// `UnknownAction` if the stored symbol does not parse as an action.
    pub fn choose<G: Game>(
        &mut self,
        game: &G,
        private: G::Private,
        history: &[G::Action],
    ) -> Result<G::Action, ProfileError> {
        let key = game.key_text(&InfoSetKey::new(private, history.to_vec()));
        let symbol = self.profile.sample_action(&key, &mut self.rng)?;
        G::Action::from_symbol(symbol).ok_or_else(|| ProfileError::UnknownAction {
            action: symbol.to_string(),
            key,
        })
    }
}

/// Draw private types for every player from the game's prior.
pub fn deal<G: Game, R: Rng + ?Sized>(
    game: &G,
    rng: &mut R,
) -> Result<Vec<G::Private>, SolverError> {
    let deals = game.deals();
    let weights = WeightedIndex::new(deals.iter().map(|d| d.probability)).map_err(|_| {
        SolverError::InvalidPrior {
            total: deals.iter().map(|d| d.probability).sum(),
        }
    })?;
    Ok(deals[weights.sample(rng)].types.clone())
}

/// Play one hand to the end.
///
/// `choose` is called with the deciding player and the history so far and
/// must return a legal action. Returns the full history and the payoffs.
pub fn play_hand<G, F>(
    game: &G,
    types: &[G::Private],
    mut choose: F,
) -> Result<(Vec<G::Action>, Vec<f64>), PlayError>
where
    G: Game,
    F: FnMut(usize, &[G::Action]) -> Result<G::Action, PlayError>,
{
    let mut history = Vec::new();
    while !game.is_terminal(&history) {
        let player = game.deciding_player(history.len());
        let action = choose(player, &history)?;
        if !game.legal_actions(&history).contains(&action) {
            return Err(PlayError::IllegalAction {
                action: action.symbol(),
                history: game.history_text(&history),
            });
        }
        history.push(action);
    }
    let payoff = game.payoff(types, &history)?;
    Ok((history, payoff))
}
