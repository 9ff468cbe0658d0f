use std::time::Instant;

use clap::Parser;
use env_logger::Env;
use itertools::Itertools;

use catan_session::enums::COLORS;
use catan_session::{
    GameSession, SessionConfig, SessionResult, SettlersConfig, SettlersEngine, StrategyKind,
    TOTAL_SEATS,
};

const ACTIONS_PER_BATCH: usize = 50;

#[derive(Debug, Parser)]
#[command(name = "simulate")]
#[command(about = "Run all-automated Catan matches through the session manager")]
struct Args {
    /// Number of games to play
    #[arg(short = 'n', long, default_value_t = 1)]
    num_games: usize,

    /// Strategy for every seat
    #[arg(long, value_enum, default_value = "random")]
    strategy: StrategyKind,

    /// Base seed; game `i` uses `seed + i`
    #[arg(long)]
    seed: Option<u64>,

    /// Victory points needed to win
    #[arg(long, default_value_t = 10)]
    vps_to_win: u32,

    /// Give up on a game after this many actions
    #[arg(long, default_value_t = 5000)]
    max_actions: usize,

    /// Print every applied action
    #[arg(short, long)]
    verbose: bool,
}

struct GameResult {
    winner: Option<usize>,
    turns: u32,
    actions: usize,
}

fn main() -> SessionResult<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    println!("🎮 Catan Session Simulation");
    println!("===========================");
    println!("Configuration:");
    println!("  - Strategy: {:?} x {}", args.strategy, TOTAL_SEATS);
    println!("  - Number of games: {}", args.num_games);
    println!("  - Victory points to win: {}", args.vps_to_win);
    println!("  - Verbose: {}", args.verbose);

    let mut wins = vec![0usize; TOTAL_SEATS];
    let mut total_turns = 0u64;
    let mut completed_games = 0usize;
    let start = Instant::now();

    for game_num in 0..args.num_games {
        let seed = args.seed.map(|seed| seed.wrapping_add(game_num as u64));
        let result = simulate_single_game(&args, seed)?;

        match result.winner {
            Some(winner) => {
                wins[winner] += 1;
                total_turns += u64::from(result.turns);
                completed_games += 1;
                println!(
                    "Game {}: {} wins in {} turns ({} actions)",
                    game_num + 1,
                    COLORS[winner],
                    result.turns,
                    result.actions
                );
            }
            None => println!(
                "Game {}: no winner within {} actions",
                game_num + 1,
                args.max_actions
            ),
        }
    }

    println!("\n📊 Results:");
    println!("===========");
    for (seat, &win_count) in wins.iter().enumerate() {
        let win_rate = if completed_games > 0 {
            (win_count as f64 / completed_games as f64) * 100.0
        } else {
            0.0
        };
        println!("{}: {} wins ({:.1}%)", COLORS[seat], win_count, win_rate);
    }
    println!("Completed games: {}/{}", completed_games, args.num_games);
    if completed_games > 0 {
        println!(
            "Average turns per game: {:.1}",
            total_turns as f64 / completed_games as f64
        );
    }
    println!("Elapsed: {:?}", start.elapsed());

    Ok(())
}

fn simulate_single_game(args: &Args, seed: Option<u64>) -> SessionResult<GameResult> {
    let engine = SettlersEngine::new(SettlersConfig {
        vps_to_win: args.vps_to_win,
        seed,
    });
    let config = SessionConfig {
        default_strategy: args.strategy,
        seed,
        enforce_seat_kind: true,
    };
    let mut session = GameSession::new(engine, config);
    session.start_match(0)?;

    let mut actions = 0;
    while actions < args.max_actions {
        let batch = ACTIONS_PER_BATCH.min(args.max_actions - actions);
        let run = session.run_automated_turns(batch)?;
        actions += run.outcomes.len();

        if args.verbose {
            for outcome in &run.outcomes {
                println!(
                    "  turn {:>3} | {} ({:?})",
                    outcome.turn, outcome.action, outcome.decision
                );
            }
        }
        if let Some(err) = run.stopped_by {
            return Err(err);
        }
        if run.outcomes.is_empty() {
            break;
        }
    }

    let snapshot = session.query_state()?;
    if args.verbose {
        println!("  {}", snapshot.summary);
        println!(
            "  seats: {}",
            snapshot.seats.iter().map(|seat| &seat.description).join(" ")
        );
    }

    Ok(GameResult {
        winner: snapshot.winner,
        turns: snapshot.turn,
        actions,
    })
}
