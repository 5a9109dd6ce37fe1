//! Interactive viewer for saved games.

use std::path::Path;

use polyreversi_core::command::Command;
use polyreversi_core::cursor::BoardCursor;
use polyreversi_core::types::PlayerId;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::game::{load_record, print_board};

/// Steps through the game stored at `path`.
///
/// Commands: `n` (or an empty line) steps forward, `p` steps back,
/// `j <index>` jumps, `s`/`e` go to the start or end, `q` quits.
pub fn replay(path: &Path) -> Result<(), String> {
    let record = load_record(path)?;
    let log = &record.log;
    let players: Vec<PlayerId> = (0..record.settings.player_count as u8)
        .map(PlayerId::new)
        .collect();
    let mut cursor = BoardCursor::new(log).map_err(|e| e.to_string())?;
    let mut editor = DefaultEditor::new().map_err(|e| e.to_string())?;

    loop {
        show(&cursor, &players);

        let line = match editor.readline("replay> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.to_string()),
        };
        let _ = editor.add_history_entry(&line);

        let mut parts = line.split_whitespace();
        let result = match parts.next().unwrap_or("n") {
            "n" | "next" => cursor.step_forward().map(|_| ()),
            "p" | "prev" => cursor.step_backward().map(|_| ()),
            "s" | "start" => cursor.reset(),
            "e" | "end" => cursor.jump_to_end(),
            "j" | "jump" => match parts.next().map(str::parse::<usize>) {
                Some(Ok(index)) => cursor.jump_to(index),
                _ => {
                    println!("usage: j <index>");
                    Ok(())
                }
            },
            "q" | "quit" => break,
            other => {
                println!("Unknown command: {other}");
                Ok(())
            }
        };
        if let Err(err) = result {
            println!("{err}");
        }
    }
    Ok(())
}

fn show(cursor: &BoardCursor<'_>, players: &[PlayerId]) {
    let log = cursor.log();
    let last = cursor.position().and_then(|i| log.get(i).ok());
    match (cursor.position(), last) {
        (Some(i), Some(command)) => println!("[{}/{}] {command}", i + 1, log.len()),
        _ => println!("[0/{}] empty board", log.len()),
    }
    let last_move = last.filter(|c| matches!(c, Command::Move { .. })).and_then(Command::position);
    print_board(cursor.board(), None, last_move, players);
}
