//! Background search worker.
//!
//! A search runs on its own thread against a snapshot of the game. The
//! caller keeps a [`SearchHandle`] and polls it for the single outcome, or
//! cancels it when the result is no longer wanted.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::board::Board;
use crate::search::options::SearchOptions;
use crate::search::search_result::SearchOutcome;
use crate::search::search_with_cancel;
use crate::turn_order::Rotation;
use crate::types::PlayerId;

/// Shared flag telling a running search to stop.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Everything a search needs, copied out of the game so the search never
/// observes later changes.
#[derive(Clone, Debug)]
pub struct SearchRequest {
    pub board: Board,
    pub player: PlayerId,
    pub rotation: Rotation,
    pub options: SearchOptions,
    /// Length of the command log when the snapshot was taken. A result is
    /// stale once the log has grown past it.
    pub log_len: usize,
}

impl SearchRequest {
    /// Runs the search on the current thread.
    pub fn run(&self, cancel: &CancelToken) -> SearchOutcome {
        match search_with_cancel(
            &self.board,
            self.player,
            &self.rotation,
            &self.options,
            cancel,
        ) {
            Some(result) => SearchOutcome::Completed(result),
            None => SearchOutcome::Cancelled,
        }
    }
}

/// Spawns searches on background threads.
pub struct SearchWorker;

impl SearchWorker {
    /// Starts searching `request` on a new thread.
    pub fn spawn(request: SearchRequest) -> SearchHandle {
        let cancel = CancelToken::new();
        let (tx, rx) = mpsc::channel();

        let thread_request = request.clone();
        let thread_cancel = cancel.clone();
        let thread = thread::spawn(move || {
            let outcome = thread_request.run(&thread_cancel);
            let _ = tx.send(outcome);
        });

        SearchHandle {
            request,
            receiver: Some(rx),
            cancel,
            thread: Some(thread),
        }
    }
}

/// Owner side of a running search.
///
/// Dropping the handle cancels the search.
pub struct SearchHandle {
    request: SearchRequest,
    receiver: Option<Receiver<SearchOutcome>>,
    cancel: CancelToken,
    thread: Option<JoinHandle<()>>,
}

impl SearchHandle {
    /// Returns the snapshot this search was started from.
    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    /// Asks the search to stop. The outcome is still delivered, as
    /// [`SearchOutcome::Cancelled`] unless the search had already finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns `true` once the outcome has been taken from this handle.
    pub fn is_finished(&self) -> bool {
        self.receiver.is_none()
    }

    /// Takes the outcome if the search has finished.
    ///
    /// Returns `None` while the search is running and after the outcome has
    /// already been taken.
    pub fn try_recv(&mut self) -> Option<SearchOutcome> {
        let rx = self.receiver.as_ref()?;
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => SearchOutcome::Cancelled,
        };
        self.finish();
        Some(outcome)
    }

    /// Blocks until the search delivers its outcome.
    pub fn wait(mut self) -> SearchOutcome {
        let outcome = match self.receiver.take() {
            Some(rx) => rx.recv().unwrap_or(SearchOutcome::Cancelled),
            None => SearchOutcome::Cancelled,
        };
        self.finish();
        outcome
    }

    fn finish(&mut self) {
        self.receiver = None;
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for SearchHandle {
    fn drop(&mut self) {
        if !self.is_finished() {
            self.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::BoardIndex;

    fn opening_request(max_depth: u32) -> SearchRequest {
        SearchRequest {
            board: Board::from_rows(&[
                "--------", "--------", "--------", "---01---", "---10---", "--------",
                "--------", "--------",
            ])
            .unwrap(),
            player: PlayerId::new(0),
            rotation: Rotation::with_players(2),
            options: SearchOptions::new(max_depth),
            log_len: 4,
        }
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        let shared = token.clone();
        assert!(!shared.is_cancelled());
        token.cancel();
        assert!(shared.is_cancelled());
    }

    #[test]
    fn test_worker_delivers_one_outcome() {
        let handle = SearchWorker::spawn(opening_request(1));
        let outcome = handle.wait();
        assert_eq!(outcome.best_move(), Some(BoardIndex::new(2, 4)));
    }

    #[test]
    fn test_try_recv_yields_once() {
        let mut handle = SearchWorker::spawn(opening_request(2));
        let outcome = loop {
            if let Some(outcome) = handle.try_recv() {
                break outcome;
            }
            thread::yield_now();
        };
        assert!(matches!(outcome, SearchOutcome::Completed(_)));
        assert!(handle.is_finished());
        assert_eq!(handle.try_recv(), None);
    }

    #[test]
    fn test_cancelled_worker() {
        let request = opening_request(1);
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(request.run(&cancel), SearchOutcome::Cancelled);
    }
}
