//! Serializable record of a game, used to save and resume games.

use serde::{Deserialize, Serialize};

use crate::command::CommandLog;
use crate::settings::GameSettings;

/// Settings plus the full command history of one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub settings: GameSettings,
    pub log: CommandLog,
}

impl GameRecord {
    pub fn new(settings: GameSettings, log: CommandLog) -> GameRecord {
        GameRecord { settings, log }
    }
}
