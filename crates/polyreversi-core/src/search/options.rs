//! Search configuration.

use crate::constants::DEFAULT_SEARCH_DEPTH;
use crate::types::Depth;

/// Options for a single search run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOptions {
    /// Number of plies to look ahead. Positions at this depth are scored
    /// with the heuristic evaluation.
    pub max_depth: Depth,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            max_depth: DEFAULT_SEARCH_DEPTH,
        }
    }
}

impl SearchOptions {
    pub fn new(max_depth: Depth) -> Self {
        SearchOptions { max_depth }
    }
}
