use crate::board::Board;
use crate::error::Result;
use crate::layout;
use crate::turn_order::Rotation;
use crate::types::{Depth, PlayerId};

/// Executes a perft run from the standard starting position.
///
/// # Arguments
///
/// * `board_size` - Edge length of the board.
/// * `player_count` - Number of players; must have a starting layout.
/// * `depth` - Number of plies to expand. A depth of `1` counts the
///   immediate legal moves; larger values walk the tree recursively.
///
/// # Returns
///
/// The number of leaf nodes visited.
pub fn perft_root(board_size: usize, player_count: usize, depth: Depth) -> Result<u64> {
    let rotation = Rotation::with_players(player_count);
    let mut board = Board::new(board_size)?;
    for command in layout::starting_layout(board_size, rotation.players())? {
        board.apply(&command)?;
    }
    Ok(perft(&board, PlayerId::new(0), &rotation, depth))
}

/// Counts the leaf nodes of the move tree below `board` with `player` to
/// move.
///
/// A player without moves passes to the next one in `rotation` without
/// consuming depth. A position where nobody can move, or where the mover is
/// stuck and skipping is disabled, counts as a single leaf.
pub fn perft(board: &Board, player: PlayerId, rotation: &Rotation, depth: Depth) -> u64 {
    let moves = board.legal_moves(player);

    if moves.is_empty() {
        if !rotation.allow_skipping() {
            return 1;
        }
        let mut next = player;
        for _ in 1..rotation.len() {
            next = rotation.next(next);
            if board.has_legal_moves(next) {
                return perft(board, next, rotation, depth);
            }
        }
        return 1;
    }

    let next_player = rotation.next(player);
    let mut nodes = 0;
    for pos in moves {
        if depth <= 1 {
            nodes += 1;
        } else {
            let mut next = board.clone();
            next.apply_move(player, pos);
            nodes += perft(&next, next_player, rotation, depth - 1);
        }
    }
    nodes
}
