//! Game settings bag.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE, MAX_PLAYERS};
use crate::error::{Error, Result};

/// Rule options fixed when a game is initialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Edge length of the square board.
    pub board_size: usize,
    /// Number of players that must register before the game starts.
    pub player_count: usize,
    /// Whether a player without a legal move is passed over. When `false`
    /// the game ends as soon as the player to move cannot move.
    pub allow_turn_skipping: bool,
}

impl GameSettings {
    /// Creates the default settings: an 8×8 board, two players, skipping
    /// allowed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_board_size(mut self, board_size: usize) -> Self {
        self.board_size = board_size;
        self
    }

    #[must_use]
    pub fn with_player_count(mut self, player_count: usize) -> Self {
        self.player_count = player_count;
        self
    }

    #[must_use]
    pub fn with_turn_skipping(mut self, allow: bool) -> Self {
        self.allow_turn_skipping = allow;
        self
    }

    /// Checks that the settings describe a playable game.
    ///
    /// # Errors
    /// Returns `ContractViolation` for a board size outside
    /// `1..=MAX_BOARD_SIZE` or a player count outside `2..=MAX_PLAYERS`.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_BOARD_SIZE).contains(&self.board_size) {
            return Err(Error::ContractViolation(format!(
                "board size {} is outside 1..={MAX_BOARD_SIZE}",
                self.board_size
            )));
        }
        if !(2..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(Error::ContractViolation(format!(
                "player count {} is outside 2..={MAX_PLAYERS}",
                self.player_count
            )));
        }
        Ok(())
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            board_size: DEFAULT_BOARD_SIZE,
            player_count: 2,
            allow_turn_skipping: true,
        }
    }
}
