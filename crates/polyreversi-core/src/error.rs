//! Error types for the engine.
//!
//! Routine outcomes are not errors here: a rejected submission is reported
//! through [`SubmitError`](crate::game_state::SubmitError) and "no legal move"
//! is an ordinary `None`.

use crate::square::BoardIndex;
use crate::types::PlayerId;

/// Errors surfaced by the board, the command log and the turn controller.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Error {
    /// A cell coordinate outside the board.
    #[display("cell {pos:?} is outside a {size}x{size} board")]
    CellOutOfRange { pos: BoardIndex, size: usize },
    /// A command log index outside its valid range.
    #[display("log index {index} is outside 0..={len}")]
    LogIndexOutOfRange { index: usize, len: usize },
    /// A rule-checked placement that does not capture anything.
    #[display("illegal move by {player} at {pos}")]
    IllegalMove { player: PlayerId, pos: BoardIndex },
    /// The surrounding application misused the engine.
    #[display("contract violation: {_0}")]
    ContractViolation(String),
}

impl std::error::Error for Error {}

/// Convenience alias for results carrying [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
