//! # InfoSet Solver
//!
//! A full-width Counterfactual Regret Minimization (CFR) solver for computing
//! Nash equilibrium strategies in small games of imperfect information,
//! where each player holds a private type and every action is public.
//!
//! ## Features
//!
//! - **Generic engine**: Works with any game implementing the `Game` trait
//! - **Exact sweeps**: Beliefs, utilities and reach are enumerated, never sampled
//! - **Explicit failure**: Degenerate beliefs or strategy updates abort with context
//! - **Checkpointing**: Save and resume solver state
//! - **Strategy profiles**: Persist strategies as JSON and play them with a bot
//!
//! ## Quick Start
//!
//! ```
//! use infoset_solver::cfr::{CFRSolver, SolverConfig};
//! use infoset_solver::games::kuhn::KuhnPoker;
//!
//! // 1. Pick a game implementing the Game trait
//! // 2. Create a solver
//! let config = SolverConfig::default().with_max_iterations(100);
//! let mut solver = CFRSolver::new(KuhnPoker::new(), config).unwrap();
//!
//! // 3. Solve
//! solver.solve().unwrap();
//!
//! // 4. Get strategies
//! let strategy = solver.strategy_by_text("0:b").unwrap();
//! assert_eq!(strategy.len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`cfr`]: Core CFR algorithm and solver
//! - [`games`]: Game implementations (Kuhn Poker, coin guessing)
//! - [`play`]: Bots and a hand loop for playing solved strategies
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      CFR Solver (Generic)                       │
//! │  - InfoSet registry       - Belief / utility / reach sweeps     │
//! │  - Regret matching        - Checkpoints and strategy profiles   │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ implements Game trait
//!                               ▼
//!              ┌────────────────┴────────────────┐
//!              │                                 │
//!              ▼                                 ▼
//!         ┌─────────┐                     ┌─────────────┐
//!         │  Kuhn   │                     │    Coin     │
//!         │  Poker  │                     │  Guessing   │
//!         └─────────┘                     └─────────────┘
//! ```

#![warn(missing_docs)]

/// CFR (Counterfactual Regret Minimization) solver module.
///
/// This is the core module containing the generic CFR algorithm.
pub mod cfr;

/// Game implementations module.
///
/// Contains Kuhn Poker for validation and the coin guessing game.
pub mod games;

pub mod play;

// Re-export commonly used types at crate root for convenience
pub use cfr::{CFRSolver, Game, SolveStats, SolverConfig, SolverError, StrategyProfile, Symbol};
