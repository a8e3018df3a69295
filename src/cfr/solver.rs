//! Full-width CFR solver.
//!
//! The solver owns the game, its InfoSet registry and the table of mutable
//! InfoSet state, and drives one full sweep per iteration:
//!
//! 1. **Beliefs**: posterior over candidate deals at every InfoSet
//! 2. **Utilities**: action utilities, deepest InfoSets first
//! 3. **Likelihoods**: counterfactual reach, roots first
//! 4. **Gains**: regret accumulation, returns the iteration's total gain
//! 5. **Strategies**: renormalize cumulative gains
//!
//! Everything is exact enumeration; no sampling, no randomness.
//! The solver is generic over any game that implements the `Game` trait.

use std::fmt;
use std::time::Instant;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::cfr::belief::update_beliefs;
use crate::cfr::config::{SolveStats, SolverConfig, Termination};
use crate::cfr::error::SolverError;
use crate::cfr::game::{Game, InfoSetKey, Symbol};
use crate::cfr::likelihood::update_likelihoods;
use crate::cfr::profile::{GainTelemetry, StrategyProfile};
use crate::cfr::regret::{accumulate_gains, update_strategies};
use crate::cfr::registry::{InfoSetId, InfoSetRegistry};
use crate::cfr::storage::{InfoSetState, InfoSetTable, StorageExport};
use crate::cfr::utility::update_utilities;

/// The main CFR solver.
///
/// # Type Parameters
/// - `G`: The game type implementing the `Game` trait
///
/// # Example
/// ```
/// use infoset_solver::cfr::{CFRSolver, SolverConfig};
/// use infoset_solver::games::kuhn::KuhnPoker;
///
/// let config = SolverConfig::default().with_max_iterations(1_000);
/// let mut solver = CFRSolver::new(KuhnPoker::new(), config).unwrap();
/// let stats = solver.solve().unwrap();
/// assert!(stats.iterations <= 1_000);
///
/// // Probability that the King bets first
/// let king = solver.strategy_by_text("2:").unwrap();
/// assert!(king[1] > 0.5);
/// ```
pub struct CFRSolver<G: Game> {
    /// The game being solved.
    game: G,

    /// Configuration for the solver.
    config: SolverConfig,

    /// Every InfoSet of the game, with resolved relations.
    registry: InfoSetRegistry<G::Private, G::Action>,

    /// Per-InfoSet strategies, beliefs, utilities and gains.
    table: InfoSetTable,

    /// Completed iterations.
    iteration: u64,

    /// Statistics tracking.
    stats: SolveStats,
}

impl<G: Game> CFRSolver<G> {
    /// Create a new CFR solver for the given game.
    ///
    /// Builds the InfoSet registry and the initial uniform strategy profile.
    ///
    /// # Errors
    /// - `Config` if `config` fails validation.
    /// - `InvalidPrior` / `InvalidHistory` if the game is malformed.
    pub fn new(game: G, config: SolverConfig) -> Result<Self, SolverError> {
        config.validate()?;

        let start = Instant::now();
        let registry = InfoSetRegistry::build(&game)?;
        let table = InfoSetTable::new(&registry, config.seed_cumulative_gain);
        info!(
            "{}: registered {} info sets (max depth {}) in {:.3}s",
            game.name(),
            registry.len(),
            registry.max_depth(),
            start.elapsed().as_secs_f64()
        );

        let stats = SolveStats {
            info_sets: registry.len(),
            ..SolveStats::new()
        };

        Ok(Self {
            game,
            config,
            registry,
            table,
            iteration: 0,
            stats,
        })
    }

    /// Run a single full sweep.
    ///
    /// Returns the total gain added during the iteration.
    ///
    /// # Errors
    /// `DegenerateBelief` or `DegenerateStrategyUpdate`; the solver state is
    /// left partially updated and the run should be abandoned.
    pub fn run_iteration(&mut self) -> Result<f64, SolverError> {
        update_beliefs(&self.registry, &mut self.table)?;
        update_utilities(&self.registry, &mut self.table);
        update_likelihoods(&self.registry, &mut self.table);
        let total_gain = accumulate_gains(&self.registry, &mut self.table);
        update_strategies(&self.registry, &mut self.table, self.config.zero_gain_policy)?;

        self.iteration += 1;
        self.stats.iterations = self.iteration;
        self.stats.final_gain = total_gain;

        if self.iteration == 1 || self.iteration % self.config.telemetry_interval == 0 {
            self.stats.record_gain(self.iteration, total_gain);
            debug!("iteration {}: total gain {:.6}", self.iteration, total_gain);
        }

        Ok(total_gain)
    }

    /// Iterate until the iteration budget or the gain threshold is reached.
    pub fn solve(&mut self) -> Result<&SolveStats, SolverError> {
        self.solve_with_callback(0, |_| {})
    }

    /// Solve with a callback for progress tracking.
    ///
    /// # Arguments
    /// * `callback_interval` - How often to call the callback (0 = never)
    /// * `callback` - Function called every `callback_interval` iterations
    pub fn solve_with_callback<F>(
        &mut self,
        callback_interval: u64,
        mut callback: F,
    ) -> Result<&SolveStats, SolverError>
    where
        F: FnMut(&SolveStats),
    {
        let start_time = Instant::now();
        let elapsed_before = self.stats.elapsed_seconds;
        self.stats.termination = Termination::Running;

        info!(
            "solving {}: budget {} iterations, gain threshold {}",
            self.game.name(),
            self.config.max_iterations,
            self.config.gain_threshold
        );

        loop {
            if self.iteration >= self.config.max_iterations {
                self.stats.termination = Termination::IterationBudget;
                break;
            }

            let gain = self.run_iteration()?;

            if gain <= self.config.gain_threshold {
                self.stats.termination = Termination::GainThreshold;
                break;
            }

            if callback_interval > 0 && self.iteration % callback_interval == 0 {
                self.stats.elapsed_seconds = elapsed_before + start_time.elapsed().as_secs_f64();
                self.stats.update_rate();
                callback(&self.stats);
            }
        }

        if self.iteration > 0 {
            self.stats.record_gain(self.iteration, self.stats.final_gain);
        }
        self.stats.elapsed_seconds = elapsed_before + start_time.elapsed().as_secs_f64();
        self.stats.update_rate();

        info!(
            "finished after {} iterations ({:?}), final gain {:.6}, {:.0} it/s",
            self.iteration,
            self.stats.termination,
            self.stats.final_gain,
            self.stats.iterations_per_second
        );

        Ok(&self.stats)
    }

    /// Current strategy of an InfoSet.
    pub fn strategy(&self, key: &InfoSetKey<G::Private, G::Action>) -> Option<&[f64]> {
        self.registry.get(key).map(|id| self.table.strategy(id))
    }

    /// Current strategy of an InfoSet, looked up by textual key.
    pub fn strategy_by_text(&self, text: &str) -> Option<&[f64]> {
        self.registry.get_by_text(text).map(|id| self.table.strategy(id))
    }

    /// Current probability of one action at an InfoSet.
    pub fn action_probability(&self, text: &str, action: G::Action) -> Option<f64> {
        let id = self.registry.get_by_text(text)?;
        let index = self.registry.node(id).action_index(&action)?;
        Some(self.table.strategy(id)[index])
    }

    /// Current beliefs of an InfoSet, parallel to its candidates.
    pub fn beliefs(&self, key: &InfoSetKey<G::Private, G::Action>) -> Option<&[f64]> {
        self.registry
            .get(key)
            .map(|id| self.table.get(id).beliefs.as_slice())
    }

    /// State of an InfoSet.
    pub fn state(&self, id: InfoSetId) -> &InfoSetState {
        self.table.get(id)
    }

    /// Expected value of the game for its first player under the profile
    /// evaluated by the last iteration.
    ///
    /// Sums prior-weighted expected utilities of the first player's root
    /// InfoSets. Zero before the first iteration.
    pub fn root_value(&self) -> f64 {
        self.registry
            .roots()
            .filter(|&id| self.registry.node(id).player == 0)
            .map(|id| {
                let state = self.table.get(id);
                state.likelihood * state.expected_utility
            })
            .sum()
    }

    /// Snapshot the current strategies as a persistable profile.
    pub fn strategy_profile(&self) -> StrategyProfile {
        StrategyProfile::from_solver(self)
    }

    /// Sampled total gain curve of the run so far.
    pub fn gain_telemetry(&self) -> GainTelemetry {
        GainTelemetry::from_solver(self)
    }

    /// Full per-InfoSet state, formatted as a table.
    pub fn info_set_report(&self) -> InfoSetReport<'_, G> {
        InfoSetReport { solver: self }
    }

    /// Print the state of every InfoSet: beliefs, utilities, likelihood and
    /// cumulative gains alongside the strategy.
    pub fn print_info_sets(&self) {
        println!("{}", self.info_set_report());
    }

    /// Get the current iteration count.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Get the number of information sets.
    pub fn num_info_sets(&self) -> usize {
        self.registry.len()
    }

    /// Get current statistics.
    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }

    /// Get reference to the registry.
    pub fn registry(&self) -> &InfoSetRegistry<G::Private, G::Action> {
        &self.registry
    }

    /// Get reference to the InfoSet table.
    pub fn table(&self) -> &InfoSetTable {
        &self.table
    }

    /// Get reference to the game.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Export solver state for checkpointing.
    pub fn export_state(&self) -> SolverState {
        SolverState {
            game: self.game.name(),
            iteration: self.iteration,
            storage: self.table.export(&self.registry),
            stats: self.stats.clone(),
        }
    }

    /// Import solver state from checkpoint.
    ///
    /// # Errors
    /// `InvalidHistory` if the checkpoint belongs to another game or does not
    /// cover every InfoSet. The solver is unchanged on error.
    pub fn import_state(&mut self, state: SolverState) -> Result<(), SolverError> {
        if state.game != self.game.name() {
            return Err(SolverError::invalid_history(
                state.game,
                format!("checkpoint is not for {}", self.game.name()),
            ));
        }
        self.table.import(&self.registry, &state.storage)?;
        self.iteration = state.iteration;
        self.stats = state.stats;
        self.stats.info_sets = self.registry.len();
        Ok(())
    }

    /// Reset the solver to initial state.
    pub fn reset(&mut self) {
        self.table = InfoSetTable::new(&self.registry, self.config.seed_cumulative_gain);
        self.iteration = 0;
        self.stats = SolveStats {
            info_sets: self.registry.len(),
            ..SolveStats::new()
        };
    }
}

/// Display adapter listing the full state of every InfoSet.
pub struct InfoSetReport<'a, G: Game> {
    solver: &'a CFRSolver<G>,
}

impl<G: Game> fmt::Display for InfoSetReport<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.solver.registry();
        writeln!(
            f,
            "=== {} after {} iterations ===",
            self.solver.game().name(),
            self.solver.iteration()
        )?;

        for (node, state) in registry.nodes().iter().zip(self.solver.table().states()) {
            writeln!(f)?;
            writeln!(
                f,
                "{}  player {}  likelihood {:.6}  expected utility {:.6}",
                node.text, node.player, state.likelihood, state.expected_utility
            )?;
            writeln!(
                f,
                "  {:>8} {:>10} {:>10} {:>12}",
                "action", "strategy", "utility", "cum. gain"
            )?;
            for (i, action) in node.actions.iter().enumerate() {
                writeln!(
                    f,
                    "  {:>8} {:>10.6} {:>10.6} {:>12.6}",
                    action.symbol(),
                    state.strategy[i],
                    state.action_utilities[i],
                    state.cumulative_gain[i]
                )?;
            }
            let beliefs: Vec<String> = node
                .candidates
                .iter()
                .zip(&state.beliefs)
                .map(|(candidate, belief)| {
                    let deal: Vec<String> = candidate.types.iter().map(Symbol::symbol).collect();
                    format!("[{}]={:.6}", deal.join(","), belief)
                })
                .collect();
            writeln!(f, "  beliefs {}", beliefs.join(" "))?;
        }
        Ok(())
    }
}

/// Serializable solver state for checkpointing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverState {
    /// Name of the game instance.
    pub game: String,
    /// Completed iterations.
    pub iteration: u64,
    /// Table export.
    pub storage: StorageExport,
    /// Statistics.
    pub stats: SolveStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::config::ZeroGainPolicy;
    use crate::cfr::error::Phase;
    use crate::cfr::testing::Toy;
    use crate::games::kuhn::KuhnPoker;

    fn assert_distributions(solver: &CFRSolver<KuhnPoker>) {
        for state in solver.table().states() {
            let strategy: f64 = state.strategy.iter().sum();
            let beliefs: f64 = state.beliefs.iter().sum();
            assert!((strategy - 1.0).abs() < 1e-9);
            assert!((beliefs - 1.0).abs() < 1e-9);
            assert!(state.strategy.iter().all(|&p| p >= 0.0));
            assert!((0.0..=1.0).contains(&state.likelihood));
        }
    }

    #[test]
    fn test_distributions_stay_normalized() {
        let config = SolverConfig::default().with_max_iterations(200);
        let mut solver = CFRSolver::new(KuhnPoker::new(), config).unwrap();
        assert_distributions(&solver);
        for _ in 0..50 {
            solver.run_iteration().unwrap();
            assert_distributions(&solver);
        }
    }

    #[test]
    fn test_root_beliefs_never_change() {
        let config = SolverConfig::default();
        let mut solver = CFRSolver::new(KuhnPoker::new(), config).unwrap();
        for _ in 0..100 {
            solver.run_iteration().unwrap();
        }
        for id in solver.registry().roots() {
            assert_eq!(solver.state(id).beliefs, vec![0.5, 0.5]);
        }
    }

    #[test]
    fn test_cumulative_gain_never_decreases() {
        let config = SolverConfig::default();
        let mut solver = CFRSolver::new(KuhnPoker::new(), config).unwrap();
        let mut previous: Vec<Vec<f64>> = solver
            .table()
            .states()
            .iter()
            .map(|s| s.cumulative_gain.clone())
            .collect();

        for _ in 0..200 {
            let gain = solver.run_iteration().unwrap();
            assert!(gain >= 0.0);
            for (state, before) in solver.table().states().iter().zip(&previous) {
                for (now, then) in state.cumulative_gain.iter().zip(before) {
                    assert!(now >= then);
                }
            }
            previous = solver
                .table()
                .states()
                .iter()
                .map(|s| s.cumulative_gain.clone())
                .collect();
        }
    }

    #[test]
    fn test_info_set_report() {
        let config = SolverConfig::default();
        let mut solver = CFRSolver::new(KuhnPoker::new(), config).unwrap();
        solver.run_iteration().unwrap();

        let report = solver.info_set_report().to_string();
        assert!(report.starts_with("=== kuhn-3 after 1 iterations ==="));
        assert!(report.contains("0:b  player 1  likelihood 0.166667  expected utility -1.500000"));
        assert!(report.contains("cum. gain"));
        // Queen facing a bet sees the Jack or the King, equally likely
        assert!(report.contains("beliefs [0,1]=0.500000 [2,1]=0.500000"));
        assert_eq!(report.matches("  beliefs ").count(), 12);
    }

    #[test]
    fn test_iteration_budget_stops_run() {
        let config = SolverConfig::default()
            .with_max_iterations(250)
            .with_gain_threshold(0.0)
            .with_telemetry_interval(100);
        let mut solver = CFRSolver::new(KuhnPoker::new(), config).unwrap();
        let stats = solver.solve().unwrap();

        assert_eq!(stats.iterations, 250);
        assert_eq!(stats.termination, Termination::IterationBudget);
        let sampled: Vec<u64> = stats.gain_history.iter().map(|s| s.iteration).collect();
        assert_eq!(sampled, vec![1, 100, 200, 250]);
    }

    #[test]
    fn test_gain_threshold_stops_run() {
        let config = SolverConfig::default()
            .with_max_iterations(10_000)
            .with_gain_threshold(1.0);
        let mut solver = CFRSolver::new(KuhnPoker::new(), config).unwrap();
        let stats = solver.solve().unwrap();

        assert_eq!(stats.termination, Termination::GainThreshold);
        assert!(stats.iterations < 10_000);
        assert!(stats.final_gain <= 1.0);
    }

    #[test]
    fn test_callback_interval() {
        let config = SolverConfig::default()
            .with_max_iterations(100)
            .with_gain_threshold(0.0);
        let mut solver = CFRSolver::new(KuhnPoker::new(), config).unwrap();

        let mut seen = Vec::new();
        solver
            .solve_with_callback(25, |stats| seen.push(stats.iterations))
            .unwrap();
        assert_eq!(seen, vec![25, 50, 75, 100]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SolverConfig::default().with_telemetry_interval(0);
        assert!(matches!(
            CFRSolver::new(KuhnPoker::new(), config),
            Err(SolverError::Config(_))
        ));
    }

    #[test]
    fn test_degenerate_strategy_policies() {
        let config = SolverConfig::default().with_seeded_gain(false);
        let mut solver = CFRSolver::new(Toy::flat(), config).unwrap();
        assert!(matches!(
            solver.run_iteration(),
            Err(SolverError::DegenerateStrategyUpdate { phase: Phase::Strategy, .. })
        ));

        let config = SolverConfig::default()
            .with_seeded_gain(false)
            .with_zero_gain_policy(ZeroGainPolicy::Uniform);
        let mut solver = CFRSolver::new(Toy::flat(), config).unwrap();
        // Nothing to gain: the run stops on the threshold after one sweep.
        let stats = solver.solve().unwrap();
        assert_eq!(stats.iterations, 1);
        assert_eq!(stats.termination, Termination::GainThreshold);
        assert_eq!(solver.strategy_by_text("0:"), Some(&[0.5, 0.5][..]));
    }

    #[test]
    fn test_degenerate_belief_from_checkpoint() {
        let mut solver = CFRSolver::new(KuhnPoker::new(), SolverConfig::default()).unwrap();
        let mut state = solver.export_state();
        for key in ["0:", "2:"] {
            state.storage.strategies.insert(key.to_string(), vec![1.0, 0.0]);
        }
        solver.import_state(state).unwrap();

        let err = solver.run_iteration().unwrap_err();
        assert!(matches!(err, SolverError::DegenerateBelief { ref key, .. } if key == "1:b"));
    }

    #[test]
    fn test_checkpoint_resume_matches_uninterrupted_run() {
        let config = SolverConfig::default()
            .with_max_iterations(300)
            .with_gain_threshold(0.0);

        let mut reference = CFRSolver::new(KuhnPoker::new(), config.clone()).unwrap();
        reference.solve().unwrap();

        let mut first =
            CFRSolver::new(KuhnPoker::new(), config.clone().with_max_iterations(120)).unwrap();
        first.solve().unwrap();
        let checkpoint = first.export_state();

        let json = serde_json::to_string(&checkpoint).unwrap();
        let restored: SolverState = serde_json::from_str(&json).unwrap();

        let mut resumed = CFRSolver::new(KuhnPoker::new(), config).unwrap();
        resumed.import_state(restored).unwrap();
        resumed.solve().unwrap();

        assert_eq!(resumed.iteration(), 300);
        for (a, b) in reference.table().states().iter().zip(resumed.table().states()) {
            for (x, y) in a.strategy.iter().zip(&b.strategy) {
                assert!((x - y).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_checkpoint_for_other_game_rejected() {
        let mut solver = CFRSolver::new(KuhnPoker::new(), SolverConfig::default()).unwrap();
        let other = CFRSolver::new(Toy::matching(), SolverConfig::default()).unwrap();
        assert!(solver.import_state(other.export_state()).is_err());
        assert_eq!(solver.iteration(), 0);
    }

    #[test]
    fn test_reset() {
        let mut solver = CFRSolver::new(KuhnPoker::new(), SolverConfig::default()).unwrap();
        let fresh = solver.table().clone();
        for _ in 0..10 {
            solver.run_iteration().unwrap();
        }
        solver.reset();
        assert_eq!(solver.iteration(), 0);
        assert_eq!(solver.table(), &fresh);
        assert_eq!(solver.stats().info_sets, 12);
    }
}
