mod game;
mod players;
mod replay;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use num_format::{Locale, ToFormattedString};
use polyreversi_core::constants::{DEFAULT_BOARD_SIZE, DEFAULT_SEARCH_DEPTH};
use polyreversi_core::perft::perft_root;
use tracing_subscriber::EnvFilter;

use crate::players::Seat;

#[derive(Parser, Debug, Clone)]
struct GameParams {
    /// Edge length of the board
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
    size: usize,

    /// Number of players (2 or 4)
    #[arg(short, long, default_value_t = 2)]
    players: usize,

    /// End the game as soon as the player to move has no legal move
    #[arg(long)]
    no_skip: bool,

    /// Who sits in each seat, in turn order. Missing seats are filled
    /// with minimax players.
    #[arg(long, value_delimiter = ',', default_value = "human,minimax")]
    seats: Vec<Seat>,

    /// Search depth for minimax players
    #[arg(short, long, default_value_t = DEFAULT_SEARCH_DEPTH)]
    depth: u32,

    /// Seed for random players
    #[arg(long)]
    seed: Option<u64>,

    /// Write the finished game to this file as JSON
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    record: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(name = "polyreversi", version, about = "Reversi for two or four players")]
struct Cli {
    #[command(subcommand)]
    command: Option<SubCommands>,

    #[command(flatten)]
    game_params: GameParams,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Debug, Subcommand)]
enum SubCommands {
    /// Play a game in the terminal (the default)
    Play {
        #[command(flatten)]
        game_params: GameParams,
    },
    /// Step through a saved game
    Replay {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,
    },
    /// Count the leaves of the move tree from the starting position
    Perft {
        #[arg()]
        depth: u32,

        #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
        size: usize,

        #[arg(short, long, default_value_t = 2)]
        players: usize,
    },
}

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let args = Cli::parse();
    init_logging(&args.log_level);

    let result = match args.command {
        Some(SubCommands::Play { game_params }) => game::play(&game_params),
        Some(SubCommands::Replay { file }) => replay::replay(&file),
        Some(SubCommands::Perft {
            depth,
            size,
            players,
        }) => run_perft(depth, size, players),
        None => game::play(&args.game_params),
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run_perft(depth: u32, size: usize, players: usize) -> Result<(), String> {
    let start = Instant::now();
    let nodes = perft_root(size, players, depth).map_err(|e| e.to_string())?;
    let elapsed = start.elapsed();
    let nps = (nodes as f64 / elapsed.as_secs_f64().max(1e-9)) as u64;

    println!("depth : {depth}");
    println!("nodes : {}", nodes.to_formatted_string(&Locale::en));
    println!("time  : {:.3}s", elapsed.as_secs_f64());
    println!("nps   : {}", nps.to_formatted_string(&Locale::en));
    Ok(())
}
