//! Play against a solved strategy profile at the terminal.
//!
//! Usage:
//!   cargo run --release --bin play -- --strategy strategy.json kuhn
//!   cargo run --release --bin play -- --strategy coin.json coin --players 3
//!
//! The human takes a different seat every round. Bots in every other seat
//! sample their moves from the profile.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use infoset_solver::cfr::{Game, StrategyProfile, Symbol};
use infoset_solver::games::coin::{CoinGame, Coins, Guess};
use infoset_solver::games::kuhn::{Card, KuhnPoker};
use infoset_solver::play::{deal, play_hand, Bot, PlayError};

#[derive(Parser)]
#[command(name = "play", about = "Play against a solved strategy profile")]
struct Args {
    #[command(subcommand)]
    game: GameArgs,

    /// Strategy profile written by `solve`
    #[arg(short, long, global = true, default_value = "strategy.json")]
    strategy: PathBuf,

    /// Number of rounds
    #[arg(short, long, global = true, default_value_t = 10)]
    rounds: u32,

    /// Random seed for deals and bot moves
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Subcommand)]
enum GameArgs {
    /// Kuhn poker, heads up
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
    let profile = StrategyProfile::load_json(&args.strategy)?;
    log::info!(
        "loaded {} info sets for {} from {}",
        profile.len(),
        profile.metadata.game,
        args.strategy.display()
    );

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let bot = Bot::new(profile, StdRng::from_rng(&mut rng)?);

    match args.game {
        GameArgs::Kuhn { ranks } => {
            let game = KuhnPoker::with_ranks(ranks)?;
            check_game(&game, bot.profile())?;
            session(
                &game,
                bot,
                &mut rng,
                args.rounds,
                |card: Card| game.card_name(card),
                |_, _| "p = pass/fold, b = bet/call".to_string(),
            )
        }
        GameArgs::Coin { players, coins } => {
            let game = CoinGame::new(players, coins)?;
            check_game(&game, bot.profile())?;
            session(
                &game,
                bot,
                &mut rng,
                args.rounds,
                |held: Coins| format!("{} coin(s)", held.0),
                |game: &CoinGame, history: &[Guess]| {
                    let legal: Vec<String> =
                        game.legal_actions(history).iter().map(Guess::symbol).collect();
                    format!("guess the total ({})", legal.join(", "))
                },
            )
        }
    }
}

/// A profile solved for another game would fail mid-hand; stop up front.
fn check_game<G: Game>(game: &G, profile: &StrategyProfile) -> Result<(), String> {
    if profile.metadata.game != game.name() {
        return Err(format!(
            "profile was solved for {}, not {}",
            profile.metadata.game,
            game.name()
        ));
    }
    Ok(())
}

fn session<G, D, H>(
    game: &G,
    mut bot: Bot<StdRng>,
    rng: &mut StdRng,
    rounds: u32,
    describe: D,
    hint: H,
) -> Result<(), Box<dyn std::error::Error>>
where
    G: Game,
    D: Fn(G::Private) -> String,
    H: Fn(&G, &[G::Action]) -> String,
{
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut score = 0.0;

    println!("=== {} ===", game.name());

    for round in 0..rounds {
        let seat = round as usize % game.num_players();
        let types = deal(game, rng)?;

        println!();
        println!("Round {} of {}: you are player {}", round + 1, rounds, seat + 1);
        println!("You hold {}", describe(types[seat]));

        let (history, payoff) = play_hand(game, &types, |player, history| {
            if player == seat {
                prompt(game, history, &hint(game, history), &mut input)
            } else {
                let action = bot.choose(game, types[player], history)?;
                println!("Player {} plays {}", player + 1, action.symbol());
                Ok(action)
            }
        })?;

        let hands: Vec<String> = types.iter().map(|&t| describe(t)).collect();
        println!("Hand over: {} | holdings: {}", game.history_text(&history), hands.join(", "));
        println!("You {} {}", if payoff[seat] >= 0.0 { "win" } else { "lose" }, payoff[seat].abs());
        score += payoff[seat];
    }

    println!();
    println!(
        "Final score after {} rounds: {:+} ({:+.3} per round)",
        rounds,
        score,
        score / rounds.max(1) as f64
    );
    Ok(())
}

fn prompt<G: Game>(
    game: &G,
    history: &[G::Action],
    hint: &str,
    input: &mut impl BufRead,
) -> Result<G::Action, PlayError> {
    let legal = game.legal_actions(history);
    loop {
        print!("History [{}], {} > ", game.history_text(history), hint);
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed").into());
        }
        match G::Action::from_symbol(line.trim()) {
            Some(action) if legal.contains(&action) => return Ok(action),
            _ => println!("`{}` is not a legal move", line.trim()),
        }
    }
}

