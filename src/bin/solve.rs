//! Solve a game and write the strategy profile.
//!
//! Usage:
//!   cargo run --release --bin solve -- [OPTIONS] kuhn [--ranks N]
//!   cargo run --release --bin solve -- [OPTIONS] coin [--players N] [--coins C]
//!
//! Options given on the command line override the values of `--config`.
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use infoset_solver::cfr::{CFRSolver, Game, SolverConfig, ZeroGainPolicy};
use infoset_solver::games::coin::CoinGame;
use infoset_solver::games::kuhn::KuhnPoker;

#[derive(Parser)]
#[command(name = "solve", about = "Compute equilibrium strategies with full-width CFR")]
struct Args {
    #[command(subcommand)]
    game: GameArgs,

    /// Iteration budget
    #[arg(short, long, global = true)]
    iterations: Option<u64>,

    /// Stop once an iteration's total gain is at or below this value
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Record the total gain every N iterations
    #[arg(long, global = true)]
    telemetry_interval: Option<u64>,

    /// Solver configuration JSON file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Where to write the strategy profile
    #[arg(short, long, global = true, default_value = "strategy.json")]
    output: PathBuf,

    /// Where to write the gain telemetry
    #[arg(long, global = true)]
    telemetry: Option<PathBuf>,

    /// Fall back to the uniform strategy when an InfoSet gains nothing
    #[arg(long, global = true)]
    uniform_fallback: bool,

    /// Skip printing the strategy table
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print beliefs, utilities, likelihood and gains of every InfoSet
    #[arg(short, long, global = true)]
    details: bool,
}

#[derive(Clone, Copy, Subcommand)]
enum GameArgs {
    /// Kuhn poker
    Kuhn {
        /// Number of card ranks
        #[arg(long, default_value_t = 3)]
        ranks: u8,
    },
    /// Coin guessing game
    Coin {
        /// Number of players
        #[arg(long, default_value_t = 3)]
        players: usize,
        /// Maximum coins per player
        #[arg(long, default_value_t = 1)]
        coins: u8,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        log::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = solver_config(&args)?;
    match args.game {
        GameArgs::Kuhn { ranks } => solve(KuhnPoker::with_ranks(ranks)?, config, &args),
        GameArgs::Coin { players, coins } => {
            solve(CoinGame::new(players, coins)?, config, &args)
        }
    }
}

fn solver_config(args: &Args) -> Result<SolverConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("loading configuration from {}", path.display());
            SolverConfig::from_json_file(path)?
        }
        None => SolverConfig::default(),
    };

    if let Some(iterations) = args.iterations {
        config = config.with_max_iterations(iterations);
    }
    if let Some(threshold) = args.threshold {
        config = config.with_gain_threshold(threshold);
    }
    if let Some(interval) = args.telemetry_interval {
        config = config.with_telemetry_interval(interval);
    }
    if args.uniform_fallback {
        config = config.with_zero_gain_policy(ZeroGainPolicy::Uniform);
    }
    config.validate()?;
    Ok(config)
}

fn solve<G: Game>(
    game: G,
    config: SolverConfig,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let budget = config.max_iterations;
    let mut solver = CFRSolver::new(game, config)?;

    let progress = ProgressBar::new(budget);
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} iterations {msg}",
        )?,
    );
    let report_interval = (budget / 200).max(1);

    let result = solver.solve_with_callback(report_interval, |stats| {
        progress.set_position(stats.iterations);
        progress.set_message(format!("gain {:.6}", stats.final_gain));
    });
    let stats = match result {
        Ok(stats) => stats.clone(),
        Err(e) => {
            progress.abandon();
            return Err(e.into());
        }
    };
    progress.finish_with_message(format!("gain {:.6}", stats.final_gain));

    log::info!(
        "{} info sets, {} iterations in {:.2}s ({:?}), root value {:.6}",
        stats.info_sets,
        stats.iterations,
        stats.elapsed_seconds,
        stats.termination,
        solver.root_value()
    );

    let profile = solver.strategy_profile();
    if args.details {
        solver.print_info_sets();
    } else if !args.quiet {
        profile.print_summary();
    }
    profile.save_json(&args.output)?;
    log::info!("strategy written to {}", args.output.display());

    if let Some(path) = &args.telemetry {
        solver.gain_telemetry().save_json(path)?;
        log::info!("gain telemetry written to {}", path.display());
    }

    Ok(())
}
