//! Static evaluation of a position from one player's point of view.
//!
//! Material is the player's disc count minus everyone else's combined.
//! Mid-game positions add a bonus per owned corner and a penalty per corner
//! held by an opponent; finished positions scale the material so that a
//! decided outcome always outweighs any heuristic score.

use crate::board::Board;
use crate::constants::{CORNER_WEIGHT, ENDGAME_SCALE};
use crate::disc::Disc;
use crate::square::BoardIndex;
use crate::types::{PlayerId, Score};

/// Returns the disc count of `player` minus the discs of all other players.
#[inline]
pub fn material(board: &Board, player: PlayerId) -> Score {
    2 * board.score(player) as Score - board.total_pieces() as Score
}

/// Heuristic value of a position that is not known to be final.
pub fn evaluate(board: &Board, player: PlayerId) -> Score {
    material(board, player) + corner_bonus(board, player)
}

/// Value of a finished position.
pub fn evaluate_endgame(board: &Board, player: PlayerId) -> Score {
    material(board, player) * ENDGAME_SCALE
}

fn corner_bonus(board: &Board, player: PlayerId) -> Score {
    BoardIndex::corners(board.size())
        .into_iter()
        .map(|corner| match board.at(corner) {
            Ok(Disc::Player(p)) if p == player => CORNER_WEIGHT,
            Ok(Disc::Player(_)) => -CORNER_WEIGHT,
            _ => 0,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: PlayerId = PlayerId::new(0);
    const B: PlayerId = PlayerId::new(1);
    const C: PlayerId = PlayerId::new(2);

    #[test]
    fn test_material() {
        let board = Board::from_rows(&["0-1", "-0-", "2--"]).unwrap();
        assert_eq!(material(&board, A), 0);
        assert_eq!(material(&board, B), -2);
        assert_eq!(material(&board, C), -2);
    }

    #[test]
    fn test_corner_bonus() {
        let board = Board::from_rows(&["0-1", "-0-", "2--"]).unwrap();
        // A holds one corner, opponents hold two.
        assert_eq!(evaluate(&board, A), -CORNER_WEIGHT);
        assert_eq!(evaluate(&board, B), -2 - CORNER_WEIGHT);
    }

    #[test]
    fn test_opening_evaluation() {
        let board = Board::from_rows(&[
            "--------", "--------", "----0---", "---00---", "---10---", "--------",
            "--------", "--------",
        ])
        .unwrap();
        assert_eq!(evaluate(&board, A), 3);
        assert_eq!(evaluate(&board, B), -3);
    }

    #[test]
    fn test_endgame_scaling() {
        let board = Board::from_rows(&["00", "01"]).unwrap();
        assert_eq!(evaluate_endgame(&board, A), 2 * ENDGAME_SCALE);
        assert_eq!(evaluate_endgame(&board, B), -2 * ENDGAME_SCALE);
    }
}
