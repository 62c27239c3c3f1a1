use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use quince_chess::game_state::game_state::GameState;
use quince_chess::search::board_scoring::MaterialScorer;
use quince_chess::search::iterative_deepening::{iterative_deepening_search, SearchConfig};
use quince_chess::search::threading::{ThreadingConfig, MAX_THREADS};
use quince_chess::utils::fen_parser::parse_fen;

/// Time fixed-depth searches over a small position set for 1..=N threads.
#[derive(Debug, Parser)]
struct Args {
    #[arg(long, default_value_t = 8)]
    max_threads: usize,
    #[arg(long, default_value_t = 4)]
    depth: u8,
    #[arg(long, default_value_t = 3)]
    runs_per_thread: usize,
    #[arg(long, default_value_t = 32)]
    hash: usize,
}

const POSITIONS: [&str; 2] = [
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut positions = vec![GameState::new_game()];
    for fen in POSITIONS {
        positions.push(parse_fen(fen)?);
    }

    let max_threads = args.max_threads.clamp(1, MAX_THREADS);
    println!(
        "Thread scaling benchmark: max_threads={} depth={} runs_per_thread={}",
        max_threads, args.depth, args.runs_per_thread
    );
    println!("threads,total_ms,avg_ms,nodes,knps");

    for threads in 1..=max_threads {
        let config = SearchConfig {
            max_depth: args.depth,
            threading: ThreadingConfig::with_threads(threads),
            hash_mb: args.hash.max(1),
            ..SearchConfig::default()
        };

        let mut total_ms: u128 = 0;
        let mut nodes = 0u64;
        let mut searched_runs = 0usize;
        for _ in 0..args.runs_per_thread.max(1) {
            for game in &positions {
                let start = Instant::now();
                let result = iterative_deepening_search(game, &config, &MaterialScorer)?;
                total_ms += start.elapsed().as_millis();
                nodes += result.nodes;
                searched_runs += 1;
            }
        }

        let avg_ms = total_ms as f64 / searched_runs.max(1) as f64;
        let knps = if total_ms == 0 {
            0.0
        } else {
            nodes as f64 / total_ms as f64
        };
        println!("{threads},{total_ms},{avg_ms:.2},{nodes},{knps:.1}");
    }
    Ok(())
}
