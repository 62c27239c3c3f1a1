use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use quince_chess::game_state::game_state::GameState;
use quince_chess::move_generation::legal_move_generator::generate_legal_moves;
use quince_chess::move_generation::perft::{count_legal_move_trees, perft_divide, perft_multi_threaded};
use quince_chess::moves::magic_tables::init_attack_tables;
use quince_chess::moves::move_descriptions::MoveList;
use quince_chess::search::board_scoring::MaterialScorer;
use quince_chess::search::iterative_deepening::{iterative_deepening_search, SearchConfig};
use quince_chess::search::threading::ThreadingConfig;
use quince_chess::search::time_management::{resolve_time_budget, ClockParams};
use quince_chess::utils::long_algebraic::move_to_long_algebraic;
use quince_chess::utils::render_game_state::render_game_state;
use quince_chess::utils::san::{line_to_san, move_to_san};

#[derive(Debug, Parser)]
#[command(name = "quince_chess", version, about = "Bitboard chess engine tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Count leaf nodes of the legal move tree.
    Perft {
        fen: String,
        depth: u8,
        /// Print the leaf count below every root move.
        #[arg(long)]
        divide: bool,
        #[arg(long, default_value_t = 1)]
        threads: usize,
    },
    /// Search a position and print the best move with its principal variation.
    Search {
        fen: String,
        #[arg(long, default_value_t = 6)]
        depth: u8,
        /// Fixed thinking time in seconds.
        #[arg(long)]
        time: Option<f64>,
        /// Remaining clock for the side to move, used when `--time` is absent.
        #[arg(long)]
        remaining_ms: Option<u64>,
        #[arg(long)]
        increment_ms: Option<u64>,
        #[arg(long)]
        moves_to_go: Option<u16>,
        #[arg(long, default_value_t = 1)]
        threads: usize,
        #[arg(long, default_value_t = 16)]
        hash: usize,
    },
    /// List the legal moves of a position in SAN.
    Legal { fen: String },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    init_attack_tables();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Perft {
            fen,
            depth,
            divide,
            threads,
        } => {
            let game = GameState::from_fen(&fen)?;
            let start = Instant::now();
            let nodes = if divide {
                let mut total = 0;
                for (mv, nodes) in perft_divide(&game, depth) {
                    println!("{}: {}", move_to_long_algebraic(mv), nodes);
                    total += nodes;
                }
                println!();
                total
            } else if threads > 1 {
                perft_multi_threaded(&game, depth, threads)
            } else {
                count_legal_move_trees(&game, depth)
            };
            let elapsed = start.elapsed();
            println!("nodes {nodes}");
            println!("time {} ms", elapsed.as_millis());
            println!("nps {}", nodes_per_second(nodes, elapsed));
        }
        Command::Search {
            fen,
            depth,
            time,
            remaining_ms,
            increment_ms,
            moves_to_go,
            threads,
            hash,
        } => {
            let game = GameState::from_fen(&fen)?;
            let clock = ClockParams {
                movetime_ms: time
                    .filter(|secs| secs.is_finite() && *secs > 0.0)
                    .map(|secs| (secs * 1000.0) as u64),
                remaining_ms,
                increment_ms,
                moves_to_go,
            };
            let config = SearchConfig {
                max_depth: depth,
                time_budget: resolve_time_budget(&game, &clock),
                threading: ThreadingConfig::with_threads(threads),
                hash_mb: hash.max(1),
                stop_flag: None,
            };

            println!("{}", render_game_state(&game));
            let result = iterative_deepening_search(&game, &config, &MaterialScorer)?;
            println!(
                "bestmove {} ({})",
                move_to_long_algebraic(result.best_move),
                move_to_san(&game, result.best_move)
            );
            println!("score {}", result.score);
            println!("depth {}", result.depth);
            println!("pv {}", line_to_san(&game, &result.principal_variation));
            println!(
                "nodes {} nps {}",
                result.nodes,
                nodes_per_second(result.nodes, result.elapsed)
            );
            println!(
                "tt probes {} hits {} stores {}",
                result.tt_stats.probes, result.tt_stats.hits, result.tt_stats.stores
            );
        }
        Command::Legal { fen } => {
            let game = GameState::from_fen(&fen)?;
            let mut list = MoveList::new();
            generate_legal_moves(&game, &mut list);
            let moves: Vec<String> = list.iter().map(|mv| move_to_san(&game, mv)).collect();
            println!("{} legal moves", moves.len());
            println!("{}", moves.join(" "));
        }
    }
    Ok(())
}

fn nodes_per_second(nodes: u64, elapsed: Duration) -> u64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0;
    }
    (nodes as f64 / secs) as u64
}
