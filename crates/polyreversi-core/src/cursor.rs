//! Replay cursor over a [`CommandLog`].
//!
//! A cursor pairs a position in the log with the board obtained by applying
//! every command up to and including that position to an empty board.
//! Stepping forward applies one command incrementally; every other movement
//! rebuilds from scratch, since captures cannot be undone locally.

use crate::board::{Board, FlipEvent};
use crate::command::CommandLog;
use crate::error::{Error, Result};

/// A movable replay position over a borrowed command log.
///
/// Cloning a cursor forks an independent replay position over the same log.
#[derive(Clone, Debug)]
pub struct BoardCursor<'a> {
    log: &'a CommandLog,
    /// Index of the last applied command; `None` before the first one.
    position: Option<usize>,
    board: Board,
}

impl<'a> BoardCursor<'a> {
    /// Creates a cursor positioned before the first command.
    ///
    /// # Errors
    /// Returns `ContractViolation` if the log declares a zero board size.
    pub fn new(log: &'a CommandLog) -> Result<BoardCursor<'a>> {
        Ok(BoardCursor {
            log,
            position: None,
            board: Board::new(log.board_size())?,
        })
    }

    /// Creates a cursor positioned after the last command.
    pub fn at_end(log: &'a CommandLog) -> Result<BoardCursor<'a>> {
        let mut cursor = BoardCursor::new(log)?;
        cursor.jump_to_end()?;
        Ok(cursor)
    }

    /// Returns the log this cursor walks over.
    #[inline]
    pub fn log(&self) -> &'a CommandLog {
        self.log
    }

    /// Returns the board after every command up to the current position.
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the index of the last applied command, or `None` if the cursor
    /// has not started.
    #[inline]
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Returns how many commands have been applied, in `[0, log.len()]`.
    #[inline]
    pub fn applied(&self) -> usize {
        self.position.map_or(0, |p| p + 1)
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.applied() == self.log.len()
    }

    /// Rebuilds the board from an empty one by replaying the first `count`
    /// commands.
    ///
    /// # Errors
    /// Returns `LogIndexOutOfRange` if `count > log.len()`, or the board error
    /// raised by a command that does not replay.
    pub fn seek(&mut self, count: usize) -> Result<()> {
        let prefix = self.log.before(count)?;
        let mut board = Board::new(self.log.board_size())?;
        for command in prefix {
            board.apply(command)?;
        }
        self.board = board;
        self.position = count.checked_sub(1);
        Ok(())
    }

    /// Moves the cursor to `index`, so the board reflects commands
    /// `0..=index`. Costs a full replay of the prefix.
    ///
    /// # Errors
    /// Returns `LogIndexOutOfRange` if `index >= log.len()`.
    pub fn jump_to(&mut self, index: usize) -> Result<()> {
        if index >= self.log.len() {
            return Err(Error::LogIndexOutOfRange {
                index,
                len: self.log.len(),
            });
        }
        self.seek(index + 1)
    }

    /// Moves the cursor back before the first command.
    pub fn reset(&mut self) -> Result<()> {
        self.seek(0)
    }

    /// Moves the cursor past the last command.
    pub fn jump_to_end(&mut self) -> Result<()> {
        self.seek(self.log.len())
    }

    /// Applies the next command incrementally.
    ///
    /// # Returns
    /// The flips caused by the command (empty for `Set` and `Surrender`).
    ///
    /// # Errors
    /// Returns `LogIndexOutOfRange` if the cursor is already at the end; the
    /// cursor does not move on error.
    pub fn step_forward(&mut self) -> Result<Vec<FlipEvent>> {
        let next = self.applied();
        let command = self.log.get(next)?;
        let flips = self.board.apply(command)?;
        self.position = Some(next);
        Ok(flips)
    }

    /// Steps back one command by rebuilding the shorter prefix.
    ///
    /// # Returns
    /// `true` if the cursor moved, `false` if it had not started.
    pub fn step_backward(&mut self) -> Result<bool> {
        match self.position {
            Some(index) => {
                self.seek(index)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::square::BoardIndex;
    use crate::types::PlayerId;

    const A: PlayerId = PlayerId::new(0);
    const B: PlayerId = PlayerId::new(1);

    fn sample_log() -> CommandLog {
        let set = |player, row, col| Command::Set {
            player,
            pos: BoardIndex::new(row, col),
        };
        let mv = |player, row, col| Command::Move {
            player,
            pos: BoardIndex::new(row, col),
        };
        CommandLog::from_commands(
            8,
            vec![
                set(A, 3, 3),
                set(B, 3, 4),
                set(B, 4, 3),
                set(A, 4, 4),
                mv(A, 2, 4),
                mv(B, 2, 5),
                mv(A, 3, 5),
            ],
        )
    }

    #[test]
    fn test_new_cursor() {
        let log = sample_log();
        let cursor = BoardCursor::new(&log).unwrap();
        assert_eq!(cursor.position(), None);
        assert_eq!(cursor.applied(), 0);
        assert_eq!(cursor.board().total_pieces(), 0);
        assert!(!cursor.is_at_end());
    }

    #[test]
    fn test_jump_to() {
        let log = sample_log();
        let mut cursor = BoardCursor::new(&log).unwrap();
        cursor.jump_to(4).unwrap();
        assert_eq!(cursor.position(), Some(4));
        assert_eq!(cursor.board().total_pieces(), 5);
        assert_eq!(cursor.board().score(A), 4);
        assert_eq!(cursor.board().score(B), 1);
        assert_eq!(
            cursor.jump_to(7),
            Err(Error::LogIndexOutOfRange { index: 7, len: 7 })
        );
        assert_eq!(cursor.position(), Some(4));
    }

    #[test]
    fn test_step_forward_matches_jump() {
        let log = sample_log();
        let mut stepped = BoardCursor::new(&log).unwrap();
        for i in 0..log.len() {
            stepped.step_forward().unwrap();
            let mut jumped = BoardCursor::new(&log).unwrap();
            jumped.jump_to(i).unwrap();
            assert_eq!(stepped.board(), jumped.board());
            assert_eq!(stepped.position(), jumped.position());
        }
        assert!(stepped.is_at_end());
        assert!(stepped.step_forward().is_err());
    }

    #[test]
    fn test_step_forward_reports_flips() {
        let log = sample_log();
        let mut cursor = BoardCursor::new(&log).unwrap();
        cursor.jump_to(3).unwrap();
        let flips = cursor.step_forward().unwrap();
        assert_eq!(flips.len(), 1);
        assert_eq!(flips[0].affected, BoardIndex::new(3, 4));
    }

    #[test]
    fn test_step_backward() {
        let log = sample_log();
        let mut cursor = BoardCursor::at_end(&log).unwrap();
        let end_board = cursor.board().clone();
        assert!(cursor.step_backward().unwrap());
        assert_eq!(cursor.position(), Some(5));
        cursor.step_forward().unwrap();
        assert_eq!(cursor.board(), &end_board);

        cursor.jump_to(0).unwrap();
        assert!(cursor.step_backward().unwrap());
        assert_eq!(cursor.position(), None);
        assert_eq!(cursor.board().total_pieces(), 0);
        assert!(!cursor.step_backward().unwrap());
    }

    #[test]
    fn test_fork() {
        let log = sample_log();
        let mut cursor = BoardCursor::new(&log).unwrap();
        cursor.jump_to(4).unwrap();
        let mut fork = cursor.clone();
        fork.jump_to_end().unwrap();
        assert_eq!(cursor.position(), Some(4));
        assert_eq!(fork.position(), Some(6));
        assert_ne!(cursor.board(), fork.board());
    }

    #[test]
    fn test_corrupt_log_fails_replay() {
        let log = CommandLog::from_commands(
            4,
            vec![Command::Move {
                player: A,
                pos: BoardIndex::new(0, 0),
            }],
        );
        let mut cursor = BoardCursor::new(&log).unwrap();
        assert!(matches!(
            cursor.step_forward(),
            Err(Error::IllegalMove { .. })
        ));
        assert_eq!(cursor.position(), None);
        assert!(cursor.jump_to_end().is_err());
    }
}
