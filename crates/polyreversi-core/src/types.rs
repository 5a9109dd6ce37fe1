//! Common types used throughout the engine.

use serde::{Deserialize, Serialize};

/// Search depth.
pub type Depth = u32;

/// Heuristic score (net material plus positional bonuses).
pub type Score = i32;

/// Identifier handed out to a participant when it registers with the
/// [`TurnController`](crate::game_state::TurnController).
///
/// Ids are small, dense and assigned in registration order starting at 0,
/// so the derived ordering is also the turn order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("P{_0}")]
#[serde(transparent)]
pub struct PlayerId(u8);

impl PlayerId {
    /// Creates a player id from its raw value.
    #[inline]
    pub const fn new(id: u8) -> PlayerId {
        PlayerId(id)
    }

    /// Returns the id as a `usize` index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the single-character form used by textual boards (`0`-`9`,
    /// then `a`-`z`).
    pub fn to_char(self) -> char {
        char::from_digit(self.0 as u32, 36).unwrap_or('?')
    }

    /// Parses the single-character form produced by [`PlayerId::to_char`].
    pub fn from_char(c: char) -> Option<PlayerId> {
        c.to_digit(36).map(|d| PlayerId(d as u8))
    }
}
