//! Reversi board of arbitrary size shared by any number of players.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::constants::{DIRECTIONS, MAX_BOARD_SIZE};
use crate::disc::Disc;
use crate::error::{Error, Result};
use crate::square::BoardIndex;
use crate::types::PlayerId;

/// A single ownership change caused by a capture.
///
/// `origin` is the cell where the capturing disc was placed and `affected`
/// the cell that changed hands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipEvent {
    pub origin: BoardIndex,
    pub affected: BoardIndex,
    pub new_owner: PlayerId,
}

/// Per-player disc counts. A player missing from the map has no valid
/// count and is recounted on the next lookup.
#[derive(Debug, Default)]
struct ScoreCache {
    counts: BTreeMap<PlayerId, u32>,
}

impl ScoreCache {
    #[inline]
    fn get(&self, player: PlayerId) -> Option<u32> {
        self.counts.get(&player).copied()
    }

    #[inline]
    fn store(&mut self, player: PlayerId, count: u32) {
        self.counts.insert(player, count);
    }

    #[inline]
    fn invalidate(&mut self, player: PlayerId) {
        self.counts.remove(&player);
    }

    #[inline]
    fn invalidate_all(&mut self) {
        self.counts.clear();
    }
}

/// An N×N grid where every cell is empty or held by one player.
///
/// Boards have value semantics: cloning copies the grid but not the score
/// cache, and equality compares only size and cell ownership.
#[derive(Debug)]
pub struct Board {
    size: usize,
    cells: Vec<Disc>,
    scores: RefCell<ScoreCache>,
}

impl Clone for Board {
    fn clone(&self) -> Self {
        Board {
            size: self.size,
            cells: self.cells.clone(),
            scores: RefCell::default(),
        }
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.cells == other.cells
    }
}

impl Eq for Board {}

impl Board {
    /// Creates an empty board with edge length `size`.
    ///
    /// # Errors
    /// Returns `ContractViolation` if `size` is zero or larger than
    /// [`MAX_BOARD_SIZE`].
    pub fn new(size: usize) -> Result<Board> {
        if !(1..=MAX_BOARD_SIZE).contains(&size) {
            return Err(Error::ContractViolation(format!(
                "board size {size} is outside 1..={MAX_BOARD_SIZE}"
            )));
        }
        Ok(Board {
            size,
            cells: vec![Disc::Empty; size * size],
            scores: RefCell::default(),
        })
    }

    /// Creates a board from rows of text.
    ///
    /// Each row must have one character per column: `-` or `.` for an empty
    /// cell, otherwise the owner's base-36 digit (see [`PlayerId::to_char`]).
    /// The number of rows determines the board size.
    ///
    /// # Errors
    /// Returns `ContractViolation` if the rows do not form a non-empty square
    /// or contain an unknown character.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Board> {
        let mut board = Board::new(rows.len())?;
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            if line.chars().count() != board.size {
                return Err(Error::ContractViolation(format!(
                    "row {row} has {} cells, expected {}",
                    line.chars().count(),
                    board.size
                )));
            }
            for (col, c) in line.chars().enumerate() {
                let disc = match c {
                    '-' | '.' => Disc::Empty,
                    _ => PlayerId::from_char(c).map(Disc::Player).ok_or_else(|| {
                        Error::ContractViolation(format!("unknown cell character {c:?}"))
                    })?,
                };
                board.cells[row * board.size + col] = disc;
            }
        }
        Ok(board)
    }

    /// Returns the edge length of the board.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    fn offset_of(&self, pos: BoardIndex) -> usize {
        pos.row * self.size + pos.col
    }

    #[inline]
    fn check_bounds(&self, pos: BoardIndex) -> Result<()> {
        if pos.is_on_board(self.size) {
            Ok(())
        } else {
            Err(Error::CellOutOfRange {
                pos,
                size: self.size,
            })
        }
    }

    /// Returns the contents of the cell at `pos`.
    ///
    /// # Errors
    /// Returns `CellOutOfRange` if `pos` is not on the board.
    pub fn at(&self, pos: BoardIndex) -> Result<Disc> {
        self.check_bounds(pos)?;
        Ok(self.cells[self.offset_of(pos)])
    }

    /// Iterates over every cell and its contents in row-major order.
    pub fn discs(&self) -> impl Iterator<Item = (BoardIndex, Disc)> + '_ {
        BoardIndex::all(self.size).zip(self.cells.iter().copied())
    }

    /// Counts the opponent discs `player` would capture from `pos` in
    /// direction `dir`.
    ///
    /// The run must be a contiguous line of opponent discs closed by a disc
    /// of `player`; anything else (an empty cell, the board edge, or an
    /// immediate own disc) captures nothing.
    fn capture_length(&self, player: PlayerId, pos: BoardIndex, dir: (isize, isize)) -> usize {
        let mut run = 0;
        let mut cur = pos;
        loop {
            let Some(next) = cur.offset(dir, self.size) else {
                return 0;
            };
            match self.cells[self.offset_of(next)] {
                Disc::Empty => return 0,
                Disc::Player(p) if p == player => return run,
                Disc::Player(_) => {
                    run += 1;
                    cur = next;
                }
            }
        }
    }

    /// Checks if placing a disc of `player` at `pos` is a legal move.
    ///
    /// # Returns
    /// `true` if `pos` is on the board, empty, and captures at least one
    /// opponent disc in some direction.
    pub fn is_legal_move(&self, player: PlayerId, pos: BoardIndex) -> bool {
        if !pos.is_on_board(self.size) || !self.cells[self.offset_of(pos)].is_empty() {
            return false;
        }
        DIRECTIONS
            .iter()
            .any(|&dir| self.capture_length(player, pos, dir) > 0)
    }

    /// Returns every legal move for `player`, ordered row-major.
    pub fn legal_moves(&self, player: PlayerId) -> BTreeSet<BoardIndex> {
        BoardIndex::all(self.size)
            .filter(|&pos| self.is_legal_move(player, pos))
            .collect()
    }

    /// Checks if `player` has at least one legal move.
    pub fn has_legal_moves(&self, player: PlayerId) -> bool {
        BoardIndex::all(self.size).any(|pos| self.is_legal_move(player, pos))
    }

    /// Places a disc of `player` at `pos` and flips every captured run.
    ///
    /// The move must be legal; use [`Board::try_apply_move`] when that has
    /// not been checked already.
    ///
    /// # Returns
    /// The ownership changes in capture order: directions in
    /// [`DIRECTIONS`] order, nearest cell first within a direction.
    pub fn apply_move(&mut self, player: PlayerId, pos: BoardIndex) -> Vec<FlipEvent> {
        debug_assert!(
            self.is_legal_move(player, pos),
            "illegal move by {player} at {pos}"
        );

        // Captures can change the counts of every player with a disc in a
        // captured run, not just the mover.
        self.scores.get_mut().invalidate_all();

        let runs: ArrayVec<((isize, isize), usize), 8> = DIRECTIONS
            .iter()
            .filter_map(|&dir| {
                let len = self.capture_length(player, pos, dir);
                (len > 0).then_some((dir, len))
            })
            .collect();

        let offset = self.offset_of(pos);
        self.cells[offset] = Disc::Player(player);

        let mut flips = Vec::with_capacity(runs.iter().map(|&(_, len)| len).sum());
        for (dir, len) in runs {
            let mut cur = pos;
            for _ in 0..len {
                let Some(next) = cur.offset(dir, self.size) else {
                    break;
                };
                let offset = self.offset_of(next);
                self.cells[offset] = Disc::Player(player);
                flips.push(FlipEvent {
                    origin: pos,
                    affected: next,
                    new_owner: player,
                });
                cur = next;
            }
        }
        flips
    }

    /// Checked variant of [`Board::apply_move`].
    ///
    /// # Errors
    /// Returns `CellOutOfRange` if `pos` is off the board and `IllegalMove`
    /// if the placement captures nothing or the cell is taken. The board is
    /// unchanged on error.
    pub fn try_apply_move(&mut self, player: PlayerId, pos: BoardIndex) -> Result<Vec<FlipEvent>> {
        self.check_bounds(pos)?;
        if !self.is_legal_move(player, pos) {
            return Err(Error::IllegalMove { player, pos });
        }
        Ok(self.apply_move(player, pos))
    }

    /// Assigns the cell at `pos` to `player` without any rule check or
    /// capture.
    ///
    /// # Errors
    /// Returns `CellOutOfRange` if `pos` is not on the board.
    pub fn apply_set(&mut self, player: PlayerId, pos: BoardIndex) -> Result<()> {
        self.check_bounds(pos)?;
        let offset = self.offset_of(pos);
        let scores = self.scores.get_mut();
        if let Some(previous) = self.cells[offset].owner() {
            scores.invalidate(previous);
        }
        scores.invalidate(player);
        self.cells[offset] = Disc::Player(player);
        Ok(())
    }

    /// Applies a logged command to the board.
    ///
    /// `Set` and `Move` go through [`Board::apply_set`] and
    /// [`Board::try_apply_move`]; `Surrender` leaves the board untouched.
    pub fn apply(&mut self, command: &Command) -> Result<Vec<FlipEvent>> {
        match *command {
            Command::Set { player, pos } => self.apply_set(player, pos).map(|()| Vec::new()),
            Command::Move { player, pos } => self.try_apply_move(player, pos),
            Command::Surrender { .. } => Ok(Vec::new()),
        }
    }

    /// Returns the number of discs held by `player`.
    ///
    /// Counts are cached per player and recounted on demand after a
    /// mutation invalidates them.
    pub fn score(&self, player: PlayerId) -> u32 {
        let cached = self.scores.borrow().get(player);
        if let Some(count) = cached {
            return count;
        }
        let count = self
            .cells
            .iter()
            .filter(|&&disc| disc == Disc::Player(player))
            .count() as u32;
        self.scores.borrow_mut().store(player, count);
        count
    }

    /// Returns the number of occupied cells.
    pub fn total_pieces(&self) -> u32 {
        self.cells.iter().filter(|disc| !disc.is_empty()).count() as u32
    }

    /// Returns a framed, labelled rendering of the board for terminals.
    ///
    /// Column letters are only printed for boards of up to 26 columns.
    pub fn to_string_as_board(&self) -> String {
        let mut s = String::new();
        s.push_str("    ");
        for col in 0..self.size {
            let label = if col < 26 {
                (b'a' + col as u8) as char
            } else {
                ' '
            };
            s.push(label);
            s.push(' ');
        }
        s.push('\n');
        for row in 0..self.size {
            s.push_str(&format!("{:>3} ", row + 1));
            for col in 0..self.size {
                s.push(self.cells[row * self.size + col].to_char());
                s.push(' ');
            }
            s.push('\n');
        }
        s
    }
}

impl fmt::Display for Board {
    /// Formats the board in the row format accepted by [`Board::from_rows`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, line) in self.cells.chunks(self.size).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for disc in line {
                write!(f, "{}", disc.to_char())?;
            }
        }
        Ok(())
    }
}
