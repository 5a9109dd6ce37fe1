//! Search result types.

use crate::square::BoardIndex;
use crate::types::{Depth, Score};

/// Result of a completed search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// The chosen move, or `None` when the searching player has no legal
    /// move in the root position.
    pub best_move: Option<BoardIndex>,
    pub score: Score,
    pub n_nodes: u64,
    pub depth: Depth,
}

impl SearchResult {
    /// Creates the result reported when the root player cannot move.
    pub fn no_move(score: Score, depth: Depth) -> Self {
        SearchResult {
            best_move: None,
            score,
            n_nodes: 1,
            depth,
        }
    }
}

/// What a background search reports back to its caller. Exactly one
/// outcome is delivered per search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The search ran to completion.
    Completed(SearchResult),
    /// The search was cancelled before it finished.
    Cancelled,
}

impl SearchOutcome {
    /// Returns the chosen move, if the search completed with one.
    pub fn best_move(&self) -> Option<BoardIndex> {
        match self {
            SearchOutcome::Completed(result) => result.best_move,
            SearchOutcome::Cancelled => None,
        }
    }
}
