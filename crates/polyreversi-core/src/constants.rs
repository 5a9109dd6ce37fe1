//! Global constants

use crate::types::{Depth, Score};

/// Row/column deltas of the eight scan directions, in the order captures are
/// reported.
pub const DIRECTIONS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Maximum number of participants; each must fit in one base-36 digit.
pub const MAX_PLAYERS: usize = 36;

/// Largest supported board edge length.
pub const MAX_BOARD_SIZE: usize = 1024;

/// Edge length of the default board.
pub const DEFAULT_BOARD_SIZE: usize = 8;

/// Default maximum search depth.
pub const DEFAULT_SEARCH_DEPTH: Depth = 4;

/// Bonus for each corner held by the maximizing player, penalty for each
/// corner held by an opponent.
pub const CORNER_WEIGHT: Score = 4;

/// Multiplier applied to the material term when no side can continue.
pub const ENDGAME_SCALE: Score = 16;

/// Lower bound for alpha-beta windows.
pub const SCORE_MIN: Score = Score::MIN;

/// Upper bound for alpha-beta windows.
pub const SCORE_MAX: Score = Score::MAX;
