//! Game implementations for the CFR solver.
//!
//! This module contains implementations of games that can be solved with
//! the full-width CFR solver. These serve as:
//!
//! 1. **Validation**: Kuhn Poker has a known Nash equilibrium and verifies
//!    that the engine converges to it.
//!
//! 2. **Examples**: Demonstrate how to implement the `Game` trait for new games.
//!
//! 3. **Benchmarks**: Provide standardized games for performance testing.
//!
//! ## Available Games
//!
//! - [`kuhn`]: Kuhn Poker, a two-player poker game with one private card each
//! - [`coin`]: Coin guessing, where every player guesses the total number of
//!   hidden coins in turn
//!
//! ## Adding New Games
//!
//! To add a new game:
//!
//! 1. Create a new module under `src/games/`
//! 2. Define private type and action symbols
//! 3. Implement the `Game` trait
//! 4. Add tests that verify expected behavior
//!
//! See the [`kuhn`] module for a complete example.

pub mod coin;
pub mod kuhn;
