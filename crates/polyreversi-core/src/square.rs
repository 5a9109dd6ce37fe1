use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies one cell of an N×N board by row and column.
///
/// The derived ordering is row-major, which is the order used whenever the
/// engine iterates cells or legal moves, so iteration is deterministic.
///
/// In text a cell is written in algebraic notation, a column letter followed
/// by a 1-based row number (`d3` is row 2, column 3), or as `row,col`:
///
/// ```text
///     a  b  c  d
/// 1  0,0 0,1 0,2 0,3
/// 2  1,0 1,1 1,2 1,3
/// 3  2,0 2,1 2,2 2,3
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BoardIndex {
    pub row: usize,
    pub col: usize,
}

/// Number of column letters available for algebraic notation.
const FILE_LETTERS: usize = 26;

impl BoardIndex {
    /// Creates a new index.
    #[inline]
    pub const fn new(row: usize, col: usize) -> BoardIndex {
        BoardIndex { row, col }
    }

    /// Returns `true` if the index lies on a board of edge length `size`.
    #[inline]
    pub fn is_on_board(self, size: usize) -> bool {
        self.row < size && self.col < size
    }

    /// Steps one cell in direction `dir`, returning `None` when the step
    /// leaves a board of edge length `size`.
    #[inline]
    pub fn offset(self, dir: (isize, isize), size: usize) -> Option<BoardIndex> {
        let row = self.row.checked_add_signed(dir.0)?;
        let col = self.col.checked_add_signed(dir.1)?;
        let next = BoardIndex { row, col };
        next.is_on_board(size).then_some(next)
    }

    /// Returns the four corner cells of a board of edge length `size`.
    ///
    /// On a 1×1 board all four entries are the same cell.
    pub fn corners(size: usize) -> [BoardIndex; 4] {
        let last = size.saturating_sub(1);
        [
            BoardIndex::new(0, 0),
            BoardIndex::new(0, last),
            BoardIndex::new(last, 0),
            BoardIndex::new(last, last),
        ]
    }

    /// Iterates every cell of a board of edge length `size` in row-major order.
    pub fn all(size: usize) -> impl Iterator<Item = BoardIndex> {
        (0..size).flat_map(move |row| (0..size).map(move |col| BoardIndex { row, col }))
    }
}

/// Error returned when a string cannot be parsed as a [`BoardIndex`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ParseBoardIndexError {
    #[display("invalid cell format {_0:?}: expected e.g. 'd3' or '2,3'")]
    InvalidFormat(String),
    #[display("invalid column {_0:?}")]
    InvalidColumn(String),
    #[display("invalid row {_0:?}")]
    InvalidRow(String),
}

impl std::error::Error for ParseBoardIndexError {}

impl FromStr for BoardIndex {
    type Err = ParseBoardIndexError;

    /// Parses either algebraic notation (`d3`, case-insensitive) or a
    /// zero-based `row,col` pair.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some((row, col)) = s.split_once(',') {
            let row = row
                .trim()
                .parse::<usize>()
                .map_err(|_| ParseBoardIndexError::InvalidRow(row.to_string()))?;
            let col = col
                .trim()
                .parse::<usize>()
                .map_err(|_| ParseBoardIndexError::InvalidColumn(col.to_string()))?;
            return Ok(BoardIndex { row, col });
        }

        let mut chars = s.chars();
        let file = chars
            .next()
            .ok_or_else(|| ParseBoardIndexError::InvalidFormat(s.to_string()))?;
        if !file.is_ascii_alphabetic() {
            return Err(ParseBoardIndexError::InvalidColumn(file.to_string()));
        }
        let col = (file.to_ascii_lowercase() as u8 - b'a') as usize;

        let rank = chars.as_str();
        let row = rank
            .parse::<usize>()
            .ok()
            .filter(|&r| r >= 1)
            .ok_or_else(|| ParseBoardIndexError::InvalidRow(rank.to_string()))?;

        Ok(BoardIndex { row: row - 1, col })
    }
}

impl fmt::Display for BoardIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.col < FILE_LETTERS {
            let file = (self.col as u8 + b'a') as char;
            write!(f, "{}{}", file, self.row + 1)
        } else {
            write!(f, "{},{}", self.row, self.col)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_ordering() {
        let mut cells = vec![
            BoardIndex::new(1, 0),
            BoardIndex::new(0, 2),
            BoardIndex::new(0, 1),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![
                BoardIndex::new(0, 1),
                BoardIndex::new(0, 2),
                BoardIndex::new(1, 0)
            ]
        );
    }

    #[test]
    fn test_offset() {
        let idx = BoardIndex::new(0, 0);
        assert_eq!(idx.offset((-1, 0), 8), None);
        assert_eq!(idx.offset((1, 1), 8), Some(BoardIndex::new(1, 1)));
        assert_eq!(BoardIndex::new(7, 7).offset((0, 1), 8), None);
    }

    #[test]
    fn test_all_is_row_major() {
        let cells: Vec<_> = BoardIndex::all(2).collect();
        assert_eq!(
            cells,
            vec![
                BoardIndex::new(0, 0),
                BoardIndex::new(0, 1),
                BoardIndex::new(1, 0),
                BoardIndex::new(1, 1)
            ]
        );
    }

    #[test]
    fn test_corners() {
        let corners = BoardIndex::corners(8);
        assert!(corners.contains(&BoardIndex::new(0, 7)));
        assert!(corners.contains(&BoardIndex::new(7, 0)));
        assert_eq!(BoardIndex::corners(1), [BoardIndex::new(0, 0); 4]);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("d3".parse::<BoardIndex>(), Ok(BoardIndex::new(2, 3)));
        assert_eq!("D3".parse::<BoardIndex>(), Ok(BoardIndex::new(2, 3)));
        assert_eq!("a12".parse::<BoardIndex>(), Ok(BoardIndex::new(11, 0)));
        assert_eq!("2, 3".parse::<BoardIndex>(), Ok(BoardIndex::new(2, 3)));
        assert!("".parse::<BoardIndex>().is_err());
        assert!("a0".parse::<BoardIndex>().is_err());
        assert!("3d".parse::<BoardIndex>().is_err());
        assert!("x,1".parse::<BoardIndex>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(BoardIndex::new(2, 3).to_string(), "d3");
        assert_eq!(BoardIndex::new(0, 30).to_string(), "0,30");
    }
}
