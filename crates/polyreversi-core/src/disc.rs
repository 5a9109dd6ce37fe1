use serde::{Deserialize, Serialize};

use crate::types::PlayerId;

/// Contents of a single board cell.
///
/// The `Disc` enum has two variants:
///
/// * `Empty` - Nobody has placed a disc here.
/// * `Player` - The cell is held by the given player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Disc {
    #[default]
    Empty,
    Player(PlayerId),
}

impl Disc {
    /// Converts the disc to its character representation.
    ///
    /// # Returns
    ///
    /// * `'-'` for `Disc::Empty`
    /// * the owner's base-36 digit for `Disc::Player`
    pub fn to_char(self) -> char {
        match self {
            Disc::Empty => '-',
            Disc::Player(p) => p.to_char(),
        }
    }

    /// Returns the owning player, if any.
    #[inline]
    pub fn owner(self) -> Option<PlayerId> {
        match self {
            Disc::Empty => None,
            Disc::Player(p) => Some(p),
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Disc::Empty
    }
}
