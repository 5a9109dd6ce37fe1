//! Terminal game loop.
//!
//! Seats take turns through the [`TurnController`]. Human seats type moves
//! at a rustyline prompt, minimax seats hand a snapshot to the search
//! worker, and random seats draw from the legal moves.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use colored::{Color, Colorize};
use num_format::{Locale, ToFormattedString};
use polyreversi_core::board::Board;
use polyreversi_core::command::Command;
use polyreversi_core::disc::Disc;
use polyreversi_core::game_state::{Phase, TurnController};
use polyreversi_core::record::GameRecord;
use polyreversi_core::search::options::SearchOptions;
use polyreversi_core::search::search_result::SearchOutcome;
use polyreversi_core::search::worker::SearchWorker;
use polyreversi_core::settings::GameSettings;
use polyreversi_core::square::BoardIndex;
use polyreversi_core::types::PlayerId;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::info;

use crate::GameParams;
use crate::players::{Seat, SeatListener, seat_table};

const PLAYER_COLORS: [Color; 6] = [
    Color::BrightGreen,
    Color::BrightYellow,
    Color::BrightMagenta,
    Color::BrightBlue,
    Color::BrightRed,
    Color::BrightWhite,
];

/// Returns the display color of `player`.
pub fn player_color(player: PlayerId) -> Color {
    PLAYER_COLORS[player.index() % PLAYER_COLORS.len()]
}

/// Prints a colored board. Legal moves of `to_move` are marked with a dot
/// and `last_move` is highlighted.
pub fn print_board(
    board: &Board,
    to_move: Option<PlayerId>,
    last_move: Option<BoardIndex>,
    players: &[PlayerId],
) {
    let size = board.size();
    let legal: BTreeSet<BoardIndex> = to_move.map(|p| board.legal_moves(p)).unwrap_or_default();

    let header: String = (0..size)
        .map(|col| {
            let label = if size <= 26 {
                char::from(b'a' + col as u8).to_string()
            } else {
                (col % 10).to_string()
            };
            format!(" {label}  ")
        })
        .collect();
    println!("      {}", header.trim_end());

    for row in 0..size {
        print!("  {:>3} ", row + 1);
        for col in 0..size {
            let pos = BoardIndex::new(row, col);
            let disc = board.at(pos).unwrap_or_default();
            let symbol = format!(" {} ", disc.to_char());
            let cell = match disc {
                Disc::Player(p) if Some(pos) == last_move => {
                    symbol.as_str().color(player_color(p)).on_bright_black()
                }
                Disc::Player(p) => symbol.as_str().color(player_color(p)),
                Disc::Empty if legal.contains(&pos) => " · ".bright_cyan(),
                Disc::Empty => "   ".normal(),
            };
            print!("{cell} ");
        }

        match players.get(row) {
            Some(&p) => {
                let marker = if Some(p) == to_move { "▶" } else { " " };
                let line = format!("{marker} {p}: {:>3}", board.score(p));
                println!("  {}", line.as_str().color(player_color(p)));
            }
            None => println!(),
        }
    }
    println!();
}

/// Plays one game with the given parameters.
pub fn play(params: &GameParams) -> Result<(), String> {
    let settings = GameSettings::new()
        .with_board_size(params.size)
        .with_player_count(params.players)
        .with_turn_skipping(!params.no_skip);
    let seats = seat_table(&params.seats, params.players)?;

    let mut controller = TurnController::new(settings).map_err(|e| e.to_string())?;
    for (index, &seat) in seats.iter().enumerate() {
        let listener = SeatListener::new(seat, PlayerId::new(index as u8));
        let id = controller
            .register_player(Box::new(listener))
            .map_err(|e| e.to_string())?;
        let name = id.to_string();
        println!("{} plays {}", name.as_str().color(player_color(id)), seat.label());
    }
    controller.initialize().map_err(|e| e.to_string())?;

    let seed = params.seed.unwrap_or_else(rand::random);
    info!(seed, "random players seeded");
    let mut rng = StdRng::seed_from_u64(seed);
    let options = SearchOptions::new(params.depth);
    let mut editor = DefaultEditor::new().map_err(|e| e.to_string())?;
    let mut last_move = None;

    while let Some(player) = controller.current_player() {
        print_board(controller.board(), Some(player), last_move, controller.players());

        let command = match seats[player.index()] {
            Seat::Human => match prompt_human(&mut editor, &controller, player)? {
                HumanAction::Command(command) => command,
                HumanAction::Quit => break,
            },
            Seat::Random => {
                let pos = controller
                    .board()
                    .legal_moves(player)
                    .into_iter()
                    .choose(&mut rng)
                    .ok_or_else(|| format!("{player} has no legal move"))?;
                Command::Move { player, pos }
            }
            Seat::Minimax => {
                last_move = Some(run_minimax(&mut controller, options)?);
                continue;
            }
        };

        if controller.submit(command) {
            last_move = command.position();
            let flips = controller.drain_flip_events();
            println!("{command} ({} flipped)\n", flips.len());
        }
    }

    print_board(controller.board(), None, last_move, controller.players());
    match controller.phase() {
        Phase::Ended(outcome) => {
            let line = format!("{} wins with {} discs", outcome.winner, outcome.score);
            println!("{}", line.as_str().color(player_color(outcome.winner)).bold());
            println!("{}", "*** Game Over ***".bright_red());
        }
        _ => println!("Game abandoned."),
    }

    if let Some(path) = &params.record {
        save_record(path, &controller.record())?;
        println!("Saved game to {}", path.display());
    }
    Ok(())
}

/// Runs a background search for the current player and submits its move.
///
/// Polls the worker the way an event loop would, so a slow search never
/// blocks the terminal.
fn run_minimax(
    controller: &mut TurnController,
    options: SearchOptions,
) -> Result<BoardIndex, String> {
    let request = controller
        .search_request(options)
        .ok_or_else(|| "the game is not running".to_string())?;
    let player = request.player;
    let start = Instant::now();
    let mut handle = SearchWorker::spawn(request);

    let outcome = loop {
        if let Some(outcome) = handle.try_recv() {
            break outcome;
        }
        thread::sleep(Duration::from_millis(5));
    };

    let SearchOutcome::Completed(result) = &outcome else {
        return Err(format!("search for {player} was cancelled"));
    };
    let Some(pos) = result.best_move else {
        return Err(format!("search found no move for {player}"));
    };
    if !controller.accept_search(handle.request(), &outcome) {
        return Err(format!("search result for {player} was rejected"));
    }
    let flips = controller.drain_flip_events();
    println!(
        "{player} plays {pos} ({} flipped) score {} depth {} nodes {} in {:.2}s\n",
        flips.len(),
        result.score,
        result.depth,
        result.n_nodes.to_formatted_string(&Locale::en),
        start.elapsed().as_secs_f64()
    );
    Ok(pos)
}

enum HumanAction {
    Command(Command),
    Quit,
}

fn prompt_human(
    editor: &mut DefaultEditor,
    controller: &TurnController,
    player: PlayerId,
) -> Result<HumanAction, String> {
    loop {
        let prompt = format!("{player}> ");
        let line = match editor.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                return Ok(HumanAction::Quit);
            }
            Err(err) => return Err(err.to_string()),
        };
        let _ = editor.add_history_entry(&line);

        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            continue;
        };
        match cmd {
            "quit" | "q" => return Ok(HumanAction::Quit),
            "surrender" | "resign" => {
                return Ok(HumanAction::Command(Command::Surrender { player }));
            }
            "moves" | "m" => {
                let moves: Vec<String> = controller
                    .board()
                    .legal_moves(player)
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                println!("{}", moves.join(" "));
            }
            "board" | "b" => print!("{}", controller.board().to_string_as_board()),
            "history" | "h" => {
                for (i, command) in controller.log().iter().enumerate() {
                    println!("{i:>4}  {command}");
                }
            }
            "help" | "?" => {
                println!("<square>     play a move, e.g. d3 or 2,3");
                println!("moves        list legal moves");
                println!("board        print the board as plain text");
                println!("history      show the command log");
                println!("surrender    leave the game");
                println!("quit         stop playing");
            }
            _ => match cmd.parse::<BoardIndex>() {
                Ok(pos) if controller.board().is_legal_move(player, pos) => {
                    return Ok(HumanAction::Command(Command::Move { player, pos }));
                }
                Ok(pos) => println!("Illegal move: {pos}"),
                Err(err) => println!("Unknown command: {cmd} ({err})"),
            },
        }
    }
}

fn save_record(path: &Path, record: &GameRecord) -> Result<(), String> {
    let json = serde_json::to_string_pretty(record).map_err(|e| e.to_string())?;
    fs::write(path, json).map_err(|e| format!("cannot write {}: {e}", path.display()))
}

/// Reads a game saved with `--record`.
pub fn load_record(path: &Path) -> Result<GameRecord, String> {
    let json =
        fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&json).map_err(|e| format!("invalid game record: {e}"))
}
