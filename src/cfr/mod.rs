//! CFR (Counterfactual Regret Minimization) Solver Module.
//!
//! This module provides a full-width CFR engine for small extensive-form
//! games of imperfect information, where every player holds a private type
//! and all actions are public.
//!
//! # Overview
//!
//! The engine works on information sets (InfoSets): a deciding player's own
//! private type plus the public history. Before solving, the registry
//! enumerates every InfoSet of the game once and resolves which deals each
//! one is consistent with and where each of its actions can lead. Each
//! iteration then sweeps all InfoSets, in a fixed order:
//!
//! 1. [`belief`]: posterior over candidate deals, from the current strategies
//! 2. [`utility`]: action utilities, deepest InfoSets first
//! 3. [`likelihood`]: counterfactual reach, shallowest InfoSets first
//! 4. [`regret`]: accumulate gains, then renormalize into the next strategy
//!
//! The run stops on an iteration budget or once an iteration's total gain
//! drops to a threshold.
//!
//! # Usage
//!
//! 1. Implement the `Game` trait for your game
//! 2. Create a `CFRSolver` with your game and configuration
//! 3. Call `solve()` to iterate
//! 4. Extract strategies with `strategy_by_text()` or `strategy_profile()`
//!
//! # Example
//!
//! ```
//! use infoset_solver::cfr::{CFRSolver, SolverConfig};
//! use infoset_solver::games::coin::CoinGame;
//!
//! let game = CoinGame::new(2, 1).unwrap();
//! let config = SolverConfig::default().with_max_iterations(200);
//! let mut solver = CFRSolver::new(game, config).unwrap();
//!
//! let stats = solver.solve().unwrap();
//! println!("Solved {} info sets in {:.2}s", stats.info_sets, stats.elapsed_seconds);
//!
//! let profile = solver.strategy_profile();
//! println!("{:?}", profile.distribution("0:").unwrap());
//! ```
//!
//! # Theory
//!
//! **Gain**: how much better an action does than the InfoSet's current
//! expected utility, floored at zero.
//! ```text
//! Gain(I, a) = max(0, u(I, a) - EU(I))
//! ```
//!
//! **Regret Matching**: the next strategy is proportional to cumulative gain,
//! each iteration's gain weighted by the InfoSet's reach likelihood.
//! ```text
//! Strategy(I, a) = G(I, a) / sum(G(I, a'))
//! ```
//!
//! **Convergence**: the total gain per iteration shrinks as the current
//! strategy profile approaches an equilibrium.
//!
//! # References
//!
//! - Zinkevich, M., et al. "Regret Minimization in Games with Incomplete Information" (2007)
//! - Kuhn, H. W. "A Simplified Two-Person Poker" (1950)

pub mod belief;
pub mod config;
pub mod error;
pub mod game;
pub mod likelihood;
pub mod profile;
pub mod registry;
pub mod regret;
pub mod solver;
pub mod storage;
pub mod utility;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenient access
pub use config::{
    ConfigError, GainSample, SolveStats, SolverConfig, Termination, ZeroGainPolicy,
};
pub use error::{Phase, SolverError};
pub use game::{Deal, Game, InfoSetKey, Symbol};
pub use profile::{GainTelemetry, ProfileError, ProfileMetadata, StrategyProfile};
pub use registry::{InfoSetId, InfoSetNode, InfoSetRegistry};
pub use solver::{CFRSolver, InfoSetReport, SolverState};
pub use storage::{InfoSetState, InfoSetTable, StorageExport};
