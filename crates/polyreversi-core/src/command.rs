//! Placement commands and the append-only log that records them.

use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::square::BoardIndex;
use crate::types::PlayerId;

/// One recorded game event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Unconditional assignment of a cell, used for the starting layout.
    Set { player: PlayerId, pos: BoardIndex },
    /// Rule-checked placement that captures sandwiched runs.
    Move { player: PlayerId, pos: BoardIndex },
    /// The player leaves the turn rotation. Does not touch the board.
    Surrender { player: PlayerId },
}

impl Command {
    /// Returns the player who issued the command.
    #[inline]
    pub fn player(&self) -> PlayerId {
        match *self {
            Command::Set { player, .. }
            | Command::Move { player, .. }
            | Command::Surrender { player } => player,
        }
    }

    /// Returns the target cell, if the command places a disc.
    #[inline]
    pub fn position(&self) -> Option<BoardIndex> {
        match *self {
            Command::Set { pos, .. } | Command::Move { pos, .. } => Some(pos),
            Command::Surrender { .. } => None,
        }
    }

    #[inline]
    pub fn is_move(&self) -> bool {
        matches!(self, Command::Move { .. })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Set { player, pos } => write!(f, "set {player} {pos}"),
            Command::Move { player, pos } => write!(f, "move {player} {pos}"),
            Command::Surrender { player } => write!(f, "surrender {player}"),
        }
    }
}

/// Ordered, append-only history of the commands of one game.
///
/// The log also records the board size its commands were issued against,
/// so a replay always starts from an empty board of the right size.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLog {
    board_size: usize,
    commands: Vec<Command>,
}

impl CommandLog {
    /// Creates an empty log for a board of edge length `board_size`.
    pub fn new(board_size: usize) -> CommandLog {
        CommandLog {
            board_size,
            commands: Vec::new(),
        }
    }

    /// Creates a log holding `commands` in order.
    pub fn from_commands(board_size: usize, commands: Vec<Command>) -> CommandLog {
        CommandLog {
            board_size,
            commands,
        }
    }

    /// Returns the board size declared for this log.
    #[inline]
    pub fn board_size(&self) -> usize {
        self.board_size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Appends a command. Committed entries are never changed afterwards.
    #[inline]
    pub fn append(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Returns the command at `index`.
    ///
    /// # Errors
    /// Returns `LogIndexOutOfRange` if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<&Command> {
        self.commands.get(index).ok_or(Error::LogIndexOutOfRange {
            index,
            len: self.commands.len(),
        })
    }

    fn check_split(&self, index: usize) -> Result<()> {
        if index > self.commands.len() {
            return Err(Error::LogIndexOutOfRange {
                index,
                len: self.commands.len(),
            });
        }
        Ok(())
    }

    /// Returns the commands strictly before `index`, i.e. `[0, index)`.
    ///
    /// # Errors
    /// Returns `LogIndexOutOfRange` if `index > len()`.
    pub fn before(&self, index: usize) -> Result<&[Command]> {
        self.check_split(index)?;
        Ok(&self.commands[..index])
    }

    /// Returns the commands from `index` onward, i.e. `[index, len)`.
    ///
    /// `before(i)` followed by `after(i)` is the whole log.
    ///
    /// # Errors
    /// Returns `LogIndexOutOfRange` if `index > len()`.
    pub fn after(&self, index: usize) -> Result<&[Command]> {
        self.check_split(index)?;
        Ok(&self.commands[index..])
    }

    /// Returns the whole log as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[Command] {
        &self.commands
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// Returns the last rule-checked `Move`, if any.
    pub fn last_move(&self) -> Option<&Command> {
        self.commands.iter().rev().find(|c| c.is_move())
    }
}

impl Index<usize> for CommandLog {
    type Output = Command;

    fn index(&self, index: usize) -> &Command {
        &self.commands[index]
    }
}

impl<'a> IntoIterator for &'a CommandLog {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: PlayerId = PlayerId::new(0);
    const B: PlayerId = PlayerId::new(1);

    fn sample_log() -> CommandLog {
        let mut log = CommandLog::new(8);
        log.append(Command::Set {
            player: A,
            pos: BoardIndex::new(3, 3),
        });
        log.append(Command::Set {
            player: B,
            pos: BoardIndex::new(3, 4),
        });
        log.append(Command::Move {
            player: A,
            pos: BoardIndex::new(3, 5),
        });
        log.append(Command::Surrender { player: B });
        log
    }

    #[test]
    fn test_append_and_get() {
        let log = sample_log();
        assert_eq!(log.len(), 4);
        assert!(!log.is_empty());
        assert_eq!(log.board_size(), 8);
        assert_eq!(log.get(3), Ok(&Command::Surrender { player: B }));
        assert_eq!(
            log.get(4),
            Err(Error::LogIndexOutOfRange { index: 4, len: 4 })
        );
        assert_eq!(log[0].player(), A);
    }

    #[test]
    fn test_before_after() {
        let log = sample_log();
        assert!(log.before(0).unwrap().is_empty());
        assert_eq!(log.before(2).unwrap().len(), 2);
        assert_eq!(log.after(2).unwrap()[0], log[2]);
        assert_eq!(log.before(4).unwrap().len(), 4);
        assert!(log.after(4).unwrap().is_empty());
        assert!(log.before(5).is_err());
        assert!(log.after(5).is_err());

        for i in 0..=log.len() {
            let mut joined = log.before(i).unwrap().to_vec();
            joined.extend_from_slice(log.after(i).unwrap());
            assert_eq!(joined, log.as_slice());
        }
    }

    #[test]
    fn test_last_move() {
        let log = sample_log();
        assert_eq!(
            log.last_move(),
            Some(&Command::Move {
                player: A,
                pos: BoardIndex::new(3, 5)
            })
        );
        assert_eq!(CommandLog::new(4).last_move(), None);
    }

    #[test]
    fn test_command_accessors() {
        let cmd = Command::Move {
            player: B,
            pos: BoardIndex::new(2, 3),
        };
        assert_eq!(cmd.player(), B);
        assert_eq!(cmd.position(), Some(BoardIndex::new(2, 3)));
        assert_eq!(cmd.to_string(), "move P1 d3");
        assert_eq!(Command::Surrender { player: A }.position(), None);
    }
}
