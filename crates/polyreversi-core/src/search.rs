//! Game tree search.
//!
//! A plain depth-limited minimax with alpha-beta pruning over any number of
//! players. The searching player maximizes and every other player is
//! assumed to minimize the searching player's evaluation. Passes follow the
//! snapshot [`Rotation`]: a player without moves hands the turn on at the
//! same depth when skipping is allowed, and the position is scored as final
//! otherwise.

pub mod eval;
pub mod options;
pub mod search_result;
pub mod worker;

use tracing::debug;

use crate::board::Board;
use crate::constants::{SCORE_MAX, SCORE_MIN};
use crate::search::options::SearchOptions;
use crate::search::search_result::SearchResult;
use crate::search::worker::CancelToken;
use crate::square::BoardIndex;
use crate::turn_order::Rotation;
use crate::types::{Depth, PlayerId, Score};

/// Runs a search to completion.
///
/// # Arguments
///
/// * `board` - Position to search from.
/// * `player` - The player to move, whose evaluation is maximized.
/// * `rotation` - Active players and skip policy used to pick the next mover.
/// * `options` - Search limits.
///
/// # Returns
///
/// The best move and its score. Among equally scored moves the first one
/// in row-major order wins.
pub fn search(
    board: &Board,
    player: PlayerId,
    rotation: &Rotation,
    options: &SearchOptions,
) -> SearchResult {
    let mut search = Search::new(player, rotation, options.max_depth, None);
    search.run(board).unwrap_or_else(|| SearchResult::no_move(0, options.max_depth))
}

/// Runs a search that stops early once `cancel` is triggered.
///
/// # Returns
///
/// `None` if the search was cancelled before it completed.
pub fn search_with_cancel(
    board: &Board,
    player: PlayerId,
    rotation: &Rotation,
    options: &SearchOptions,
    cancel: &CancelToken,
) -> Option<SearchResult> {
    let mut search = Search::new(player, rotation, options.max_depth, Some(cancel));
    search.run(board)
}

/// State of one search run.
struct Search<'a> {
    maximizer: PlayerId,
    rotation: &'a Rotation,
    max_depth: Depth,
    cancel: Option<&'a CancelToken>,
    n_nodes: u64,
}

impl<'a> Search<'a> {
    fn new(
        maximizer: PlayerId,
        rotation: &'a Rotation,
        max_depth: Depth,
        cancel: Option<&'a CancelToken>,
    ) -> Self {
        Search {
            maximizer,
            rotation,
            max_depth,
            cancel,
            n_nodes: 0,
        }
    }

    #[inline]
    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(CancelToken::is_cancelled)
    }

    fn run(&mut self, board: &Board) -> Option<SearchResult> {
        let moves = board.legal_moves(self.maximizer);
        if moves.is_empty() {
            let score = if self.rotation.allow_skipping() {
                eval::evaluate(board, self.maximizer)
            } else {
                eval::evaluate_endgame(board, self.maximizer)
            };
            return Some(SearchResult::no_move(score, self.max_depth));
        }

        let next = self.rotation.next(self.maximizer);
        let mut alpha = SCORE_MIN;
        let mut best: Option<(BoardIndex, Score)> = None;
        for pos in moves {
            let mut child = board.clone();
            child.apply_move(self.maximizer, pos);
            let score = self.value(&child, next, alpha, SCORE_MAX, 1);
            if self.is_cancelled() {
                debug!(n_nodes = self.n_nodes, "search cancelled");
                return None;
            }
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((pos, score));
            }
            alpha = alpha.max(score);
        }

        let (best_move, score) = best?;
        debug!(
            player = %self.maximizer,
            best_move = %best_move,
            score,
            n_nodes = self.n_nodes,
            "search finished"
        );
        Some(SearchResult {
            best_move: Some(best_move),
            score,
            n_nodes: self.n_nodes + 1,
            depth: self.max_depth,
        })
    }

    /// Returns the minimax value of `board` with `player` to move.
    fn value(
        &mut self,
        board: &Board,
        player: PlayerId,
        mut alpha: Score,
        mut beta: Score,
        depth: Depth,
    ) -> Score {
        self.n_nodes += 1;
        if self.is_cancelled() {
            return 0;
        }
        if depth >= self.max_depth {
            return eval::evaluate(board, self.maximizer);
        }

        let mut mover = player;
        let mut moves = board.legal_moves(mover);
        let mut tried = 1;
        while moves.is_empty() {
            if !self.rotation.allow_skipping() || tried >= self.rotation.len() {
                return eval::evaluate_endgame(board, self.maximizer);
            }
            mover = self.rotation.next(mover);
            moves = board.legal_moves(mover);
            tried += 1;
        }

        let next = self.rotation.next(mover);
        if mover == self.maximizer {
            let mut best = SCORE_MIN;
            for pos in moves {
                let mut child = board.clone();
                child.apply_move(mover, pos);
                best = best.max(self.value(&child, next, alpha, beta, depth + 1));
                alpha = alpha.max(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        } else {
            let mut best = SCORE_MAX;
            for pos in moves {
                let mut child = board.clone();
                child.apply_move(mover, pos);
                best = best.min(self.value(&child, next, alpha, beta, depth + 1));
                beta = beta.min(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        }
    }
}
