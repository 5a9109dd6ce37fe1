//! Starting layouts placed by the controller when a fresh game begins.

use crate::command::Command;
use crate::error::{Error, Result};
use crate::square::BoardIndex;
use crate::types::PlayerId;

/// Cells of the four-player layout inside a 4×4 block, indexed by seat.
///
/// The block is the center 4×4 of the board without its corners. Rotating
/// it by 90° maps each seat's cells onto the next seat's, so every player
/// starts with three discs and one capture available.
///
/// ```text
/// - 0 0 -
/// 3 0 1 1
/// 3 3 2 1
/// - 2 2 -
/// ```
const FOUR_PLAYER_CELLS: [[(usize, usize); 3]; 4] = [
    [(0, 1), (0, 2), (1, 1)],
    [(1, 3), (2, 3), (1, 2)],
    [(3, 2), (3, 1), (2, 2)],
    [(2, 0), (1, 0), (2, 1)],
];

/// Returns the `Set` commands of the standard starting position, in
/// row-major order.
///
/// Two players get the classic diagonal 2×2 square in the center, four
/// players the 12-cell layout of [`FOUR_PLAYER_CELLS`].
///
/// # Errors
/// Returns `ContractViolation` for any other player count, or for a board
/// too small to hold the layout.
pub fn starting_layout(board_size: usize, players: &[PlayerId]) -> Result<Vec<Command>> {
    let mut commands = match *players {
        [a, b] => {
            if board_size < 2 {
                return Err(Error::ContractViolation(format!(
                    "a two-player layout needs a board of at least 2x2, got {board_size}"
                )));
            }
            let c = board_size / 2;
            vec![
                set(a, c - 1, c - 1),
                set(b, c - 1, c),
                set(b, c, c - 1),
                set(a, c, c),
            ]
        }
        [_, _, _, _] => {
            if board_size < 4 {
                return Err(Error::ContractViolation(format!(
                    "a four-player layout needs a board of at least 4x4, got {board_size}"
                )));
            }
            let origin = board_size / 2 - 2;
            players
                .iter()
                .zip(FOUR_PLAYER_CELLS)
                .flat_map(|(&player, cells)| {
                    cells.map(|(row, col)| set(player, origin + row, origin + col))
                })
                .collect()
        }
        _ => {
            return Err(Error::ContractViolation(format!(
                "no starting layout for {} players",
                players.len()
            )));
        }
    };
    commands.sort_by_key(|c| c.position());
    Ok(commands)
}

fn set(player: PlayerId, row: usize, col: usize) -> Command {
    Command::Set {
        player,
        pos: BoardIndex::new(row, col),
    }
}
