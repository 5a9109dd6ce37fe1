//! Authoritative game state for a running match.
//!
//! This module provides [`TurnController`], which owns the board and the
//! command log of one game, keeps track of the registered players and whose
//! turn it is, and detects the end of the game. All submissions go through
//! the controller, which serializes them: accept, apply, log, advance.

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, info, instrument, warn};

use crate::board::{Board, FlipEvent};
use crate::command::{Command, CommandLog};
use crate::constants::MAX_PLAYERS;
use crate::cursor::BoardCursor;
use crate::error::{Error, Result};
use crate::layout;
use crate::record::GameRecord;
use crate::search::options::SearchOptions;
use crate::search::search_result::SearchOutcome;
use crate::search::worker::SearchRequest;
use crate::settings::GameSettings;
use crate::square::BoardIndex;
use crate::turn_order::{Rotation, TurnOrder};
use crate::types::PlayerId;

/// Callbacks a registered participant receives from the controller.
///
/// Both methods default to doing nothing, so a participant only overrides
/// what it cares about.
pub trait PlayerListener: Send {
    /// Called on every registered player whenever the turn changes.
    fn on_turn_changed(&mut self, _is_current: bool) {}

    /// Called on every registered player once the game has ended.
    fn on_game_over(&mut self, _winner: PlayerId, _score: u32) {}
}

/// A participant that ignores all notifications.
impl PlayerListener for () {}

/// Final result of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub winner: PlayerId,
    pub score: u32,
}

/// Lifecycle of a [`TurnController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Accepting settings, history and player registrations.
    Uninitialized,
    /// Accepting submissions.
    Running,
    /// Finished. Nothing is accepted any more.
    Ended(Outcome),
}

/// Reason a submission was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_more::Display)]
pub enum SubmitError {
    #[display("the game is not running")]
    NotRunning,
    #[display("{_0} is not a registered player")]
    UnknownPlayer(PlayerId),
    #[display("it is not {player}'s turn")]
    NotYourTurn { player: PlayerId },
    #[display("{player} cannot move at {pos}")]
    IllegalMove { player: PlayerId, pos: BoardIndex },
    #[display("set commands are reserved for the starting layout")]
    SetNotAllowed,
    #[display("{_0} has already surrendered")]
    AlreadySurrendered(PlayerId),
}

impl std::error::Error for SubmitError {}

/// Owns the board and command log of one game and enforces turn order.
pub struct TurnController {
    settings: GameSettings,
    order: TurnOrder,
    listeners: Vec<Box<dyn PlayerListener>>,
    board: Board,
    log: CommandLog,
    /// Whether `log` was loaded from a previous game.
    preloaded: bool,
    current: Option<PlayerId>,
    surrendered: BTreeSet<PlayerId>,
    phase: Phase,
    pending_flips: Vec<FlipEvent>,
}

impl fmt::Debug for TurnController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnController")
            .field("settings", &self.settings)
            .field("players", &self.order.players())
            .field("phase", &self.phase)
            .field("current", &self.current)
            .field("surrendered", &self.surrendered)
            .field("log_len", &self.log.len())
            .finish_non_exhaustive()
    }
}

impl TurnController {
    /// Creates an uninitialized controller.
    ///
    /// # Errors
    /// Returns `ContractViolation` if `settings` fail validation.
    pub fn new(settings: GameSettings) -> Result<TurnController> {
        settings.validate()?;
        Ok(TurnController {
            settings,
            order: TurnOrder::new(),
            listeners: Vec::new(),
            board: Board::new(settings.board_size)?,
            log: CommandLog::new(settings.board_size),
            preloaded: false,
            current: None,
            surrendered: BTreeSet::new(),
            phase: Phase::Uninitialized,
            pending_flips: Vec::new(),
        })
    }

    /// Creates an uninitialized controller preloaded with a saved game.
    ///
    /// Players still have to register before [`initialize`](Self::initialize)
    /// replays the log.
    pub fn from_record(record: &GameRecord) -> Result<TurnController> {
        let mut controller = TurnController::new(record.settings)?;
        controller.load_history(record.log.clone())?;
        Ok(controller)
    }

    /// Returns the settings and full history of this game.
    pub fn record(&self) -> GameRecord {
        GameRecord::new(self.settings, self.log.clone())
    }

    fn ensure_uninitialized(&self, what: &str) -> Result<()> {
        if self.phase != Phase::Uninitialized {
            return Err(Error::ContractViolation(format!(
                "cannot {what} after the game has been initialized"
            )));
        }
        Ok(())
    }

    /// Changes the board size.
    ///
    /// # Errors
    /// Returns `ContractViolation` after initialization, once a history
    /// has been loaded, or for a zero size.
    pub fn set_board_size(&mut self, board_size: usize) -> Result<()> {
        self.ensure_uninitialized("change the board size")?;
        if self.preloaded {
            return Err(Error::ContractViolation(
                "the board size is fixed by the loaded history".to_string(),
            ));
        }
        let settings = self.settings.with_board_size(board_size);
        settings.validate()?;
        self.board = Board::new(board_size)?;
        self.log = CommandLog::new(board_size);
        self.settings = settings;
        Ok(())
    }

    /// Changes whether players without a legal move are passed over.
    pub fn set_allow_turn_skipping(&mut self, allow: bool) -> Result<()> {
        self.ensure_uninitialized("change the turn-skip policy")?;
        self.settings.allow_turn_skipping = allow;
        Ok(())
    }

    /// Changes how many players must register before the game starts.
    pub fn set_player_count(&mut self, player_count: usize) -> Result<()> {
        self.ensure_uninitialized("change the player count")?;
        if player_count < self.order.len() {
            return Err(Error::ContractViolation(format!(
                "{} players are already registered",
                self.order.len()
            )));
        }
        let settings = self.settings.with_player_count(player_count);
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Loads the history of a game to resume. The board size follows the
    /// log.
    pub fn load_history(&mut self, log: CommandLog) -> Result<()> {
        self.ensure_uninitialized("load a history")?;
        self.board = Board::new(log.board_size())?;
        self.settings.board_size = log.board_size();
        self.log = log;
        self.preloaded = true;
        Ok(())
    }

    /// Registers a participant and returns its id.
    ///
    /// Ids are handed out in registration order starting at 0.
    ///
    /// # Errors
    /// Returns `ContractViolation` after initialization or once the
    /// configured player count has been reached.
    pub fn register_player(&mut self, listener: Box<dyn PlayerListener>) -> Result<PlayerId> {
        self.ensure_uninitialized("register a player")?;
        if self.order.len() >= self.settings.player_count || self.order.len() >= MAX_PLAYERS {
            return Err(Error::ContractViolation(format!(
                "all {} seats are taken",
                self.settings.player_count
            )));
        }
        let id = self.order.register();
        self.listeners.push(listener);
        debug!(player = %id, "registered player");
        Ok(id)
    }

    /// Starts the game.
    ///
    /// A fresh game gets the starting layout and the lowest id moves first.
    /// A resumed game replays its history and continues with the player
    /// after whoever made the last recorded move.
    ///
    /// # Errors
    /// Returns `ContractViolation` if not every seat is taken, if there is
    /// no starting layout for the player count, or if the loaded history
    /// does not replay.
    #[instrument(skip(self))]
    pub fn initialize(&mut self) -> Result<()> {
        self.ensure_uninitialized("initialize")?;
        if self.order.len() != self.settings.player_count {
            return Err(Error::ContractViolation(format!(
                "{} of {} players registered",
                self.order.len(),
                self.settings.player_count
            )));
        }

        if self.preloaded {
            self.replay_history()?;
            self.phase = Phase::Running;
            if self.active_count() < 2 {
                self.end_game();
            } else {
                let last_mover = self.log.last_move().map(Command::player);
                self.advance_turn(last_mover);
            }
        } else {
            for command in layout::starting_layout(self.settings.board_size, self.order.players())? {
                self.board.apply(&command)?;
                self.log.append(command);
            }
            self.phase = Phase::Running;
            self.advance_turn(None);
        }
        debug!(current = ?self.current, "game initialized");
        Ok(())
    }

    /// Rebuilds the board and the surrendered set from the loaded log.
    ///
    /// The log must describe a game that could have been played: commands
    /// come from registered players, nobody acts after surrendering and
    /// nothing follows the surrender that left fewer than two players.
    fn replay_history(&mut self) -> Result<()> {
        let mut board = Board::new(self.log.board_size())?;
        let mut surrendered = BTreeSet::new();
        for (index, command) in self.log.iter().enumerate() {
            let player = command.player();
            if !self.order.contains(player) {
                return Err(Error::ContractViolation(format!(
                    "history refers to unregistered player {player}"
                )));
            }
            if self.order.len() - surrendered.len() < 2 {
                return Err(Error::ContractViolation(format!(
                    "history continues after the game ended at command {index}"
                )));
            }
            if surrendered.contains(&player) && !matches!(command, Command::Set { .. }) {
                return Err(Error::ContractViolation(format!(
                    "{player} acts after surrendering at command {index}"
                )));
            }
            board.apply(command)?;
            if let Command::Surrender { player } = *command {
                surrendered.insert(player);
            }
        }
        self.board = board;
        self.surrendered = surrendered;
        Ok(())
    }

    /// Submits a command, returning whether it was accepted.
    pub fn submit(&mut self, command: Command) -> bool {
        match self.try_submit(command) {
            Ok(()) => true,
            Err(err) => {
                debug!(%command, %err, "rejected command");
                false
            }
        }
    }

    /// Submits a command.
    ///
    /// A `Move` must come from the current player and be legal. A
    /// `Surrender` is accepted from any active player; it hands the turn on
    /// if the surrendering player was to move and ends the game once fewer
    /// than two players remain. Rejected commands leave the state untouched.
    #[instrument(skip(self))]
    pub fn try_submit(&mut self, command: Command) -> std::result::Result<(), SubmitError> {
        if self.phase != Phase::Running {
            return Err(SubmitError::NotRunning);
        }
        match command {
            Command::Set { .. } => Err(SubmitError::SetNotAllowed),
            Command::Move { player, pos } => {
                self.check_registered(player)?;
                if self.current != Some(player) {
                    return Err(SubmitError::NotYourTurn { player });
                }
                let flips = self
                    .board
                    .try_apply_move(player, pos)
                    .map_err(|_| SubmitError::IllegalMove { player, pos })?;
                debug!(flips = flips.len(), "move applied");
                self.pending_flips = flips;
                self.log.append(command);
                self.advance_turn(Some(player));
                Ok(())
            }
            Command::Surrender { player } => {
                self.check_registered(player)?;
                if !self.surrendered.insert(player) {
                    return Err(SubmitError::AlreadySurrendered(player));
                }
                self.log.append(command);
                debug!(remaining = self.active_count(), "player surrendered");
                if self.active_count() < 2 {
                    self.end_game();
                } else if self.current == Some(player) {
                    self.advance_turn(Some(player));
                }
                Ok(())
            }
        }
    }

    fn check_registered(&self, player: PlayerId) -> std::result::Result<(), SubmitError> {
        if self.order.contains(player) {
            Ok(())
        } else {
            Err(SubmitError::UnknownPlayer(player))
        }
    }

    /// Hands the turn to the next active player after `after` who can move.
    ///
    /// Tries each active player at most once. A player without moves is
    /// passed over when skipping is allowed; otherwise the game ends. If
    /// nobody can move the game ends as well.
    fn advance_turn(&mut self, after: Option<PlayerId>) {
        let mut candidate = after;
        for _ in 0..self.active_count() {
            let surrendered = &self.surrendered;
            candidate = self
                .order
                .next_active(candidate, |p| !surrendered.contains(&p));
            let Some(player) = candidate else {
                break;
            };
            if self.board.has_legal_moves(player) {
                self.set_current(player);
                return;
            }
            if !self.settings.allow_turn_skipping {
                debug!(player = %player, "player cannot move and skipping is disabled");
                self.end_game();
                return;
            }
            debug!(player = %player, "skipping player without legal moves");
        }
        self.end_game();
    }

    fn set_current(&mut self, player: PlayerId) {
        self.current = Some(player);
        debug!(current = %player, "turn changed");
        for (&id, listener) in self.order.players().iter().zip(self.listeners.iter_mut()) {
            listener.on_turn_changed(id == player);
        }
    }

    /// Ends the game in favour of the active player with the most discs.
    ///
    /// At least one player is always active here: the game ends as soon as
    /// a surrender leaves a single player and replay rejects anything after
    /// that. Should that ever not hold, every registered player competes.
    fn end_game(&mut self) {
        let mut contenders: Vec<PlayerId> = self.active_players().collect();
        if contenders.is_empty() {
            contenders = self.order.players().to_vec();
        }
        let mut outcome: Option<Outcome> = None;
        for player in contenders {
            let score = self.board.score(player);
            if outcome.is_none_or(|b| score > b.score) {
                outcome = Some(Outcome {
                    winner: player,
                    score,
                });
            }
        }
        let Some(outcome) = outcome else {
            return;
        };

        self.current = None;
        self.phase = Phase::Ended(outcome);
        info!(winner = %outcome.winner, score = outcome.score, "game over");
        for listener in &mut self.listeners {
            listener.on_game_over(outcome.winner, outcome.score);
        }
    }

    #[inline]
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Returns the final result once the game has ended.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Ended(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Returns the player to move while the game is running.
    #[inline]
    pub fn current_player(&self) -> Option<PlayerId> {
        self.current
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    /// Returns a replay cursor over the authoritative log, positioned at the
    /// end.
    pub fn cursor(&self) -> Result<BoardCursor<'_>> {
        BoardCursor::at_end(&self.log)
    }

    /// Returns every registered player in registration order.
    #[inline]
    pub fn players(&self) -> &[PlayerId] {
        self.order.players()
    }

    #[inline]
    pub fn is_surrendered(&self, player: PlayerId) -> bool {
        self.surrendered.contains(&player)
    }

    /// Returns the players still taking turns.
    pub fn active_players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.order
            .players()
            .iter()
            .copied()
            .filter(|p| !self.surrendered.contains(p))
    }

    fn active_count(&self) -> usize {
        self.active_players().count()
    }

    /// Returns the current turn rotation for use by a search.
    pub fn rotation(&self) -> Rotation {
        self.order.rotation(
            |p| !self.surrendered.contains(&p),
            self.settings.allow_turn_skipping,
        )
    }

    /// Takes the flip events of the most recent move.
    ///
    /// Only the latest move is kept, so events that nobody takes are
    /// replaced by the next move's.
    pub fn drain_flip_events(&mut self) -> Vec<FlipEvent> {
        std::mem::take(&mut self.pending_flips)
    }

    /// Snapshots the position for a search on behalf of the current player.
    ///
    /// Returns `None` unless the game is running.
    pub fn search_request(&self, options: SearchOptions) -> Option<SearchRequest> {
        let player = self.current.filter(|_| self.is_running())?;
        Some(SearchRequest {
            board: self.board.clone(),
            player,
            rotation: self.rotation(),
            options,
            log_len: self.log.len(),
        })
    }

    /// Submits the move found by a search started from `request`.
    ///
    /// Results are dropped when the game has moved on since the snapshot,
    /// when the search was cancelled, or when it found no move. A fresh
    /// result goes through the normal legality check.
    ///
    /// # Returns
    ///
    /// `true` if the move was accepted.
    pub fn accept_search(&mut self, request: &SearchRequest, outcome: &SearchOutcome) -> bool {
        if self.log.len() != request.log_len || self.current != Some(request.player) {
            warn!(
                player = %request.player,
                snapshot = request.log_len,
                log_len = self.log.len(),
                "discarding stale search result"
            );
            return false;
        }
        match outcome.best_move() {
            Some(pos) => self.submit(Command::Move {
                player: request.player,
                pos,
            }),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    const A: PlayerId = PlayerId::new(0);
    const B: PlayerId = PlayerId::new(1);

    #[derive(Debug, Default)]
    struct Events {
        turns: Vec<bool>,
        game_over: Option<(PlayerId, u32)>,
    }

    struct Recorder(Arc<Mutex<Events>>);

    impl PlayerListener for Recorder {
        fn on_turn_changed(&mut self, is_current: bool) {
            self.0.lock().unwrap().turns.push(is_current);
        }

        fn on_game_over(&mut self, winner: PlayerId, score: u32) {
            self.0.lock().unwrap().game_over = Some((winner, score));
        }
    }

    fn two_player_game() -> TurnController {
        let mut game = TurnController::new(GameSettings::new()).unwrap();
        game.register_player(Box::new(())).unwrap();
        game.register_player(Box::new(())).unwrap();
        game.initialize().unwrap();
        game
    }

    fn mv(player: PlayerId, row: usize, col: usize) -> Command {
        Command::Move {
            player,
            pos: BoardIndex::new(row, col),
        }
    }

    #[test]
    fn test_initialize_places_layout() {
        let game = two_player_game();
        assert_eq!(game.phase(), Phase::Running);
        assert_eq!(game.current_player(), Some(A));
        assert_eq!(game.log().len(), 4);
        assert!(game.log().iter().all(|c| matches!(c, Command::Set { .. })));
        assert_eq!(game.board().score(A), 2);
        assert_eq!(game.board().score(B), 2);
    }

    #[test]
    fn test_registration_contract() {
        let mut game = TurnController::new(GameSettings::new()).unwrap();
        assert_eq!(game.register_player(Box::new(())).unwrap(), A);
        assert!(matches!(
            game.initialize(),
            Err(Error::ContractViolation(_))
        ));
        assert_eq!(game.register_player(Box::new(())).unwrap(), B);
        assert!(game.register_player(Box::new(())).is_err());
        game.initialize().unwrap();
        assert!(game.register_player(Box::new(())).is_err());
        assert!(game.set_board_size(10).is_err());
        assert!(game.initialize().is_err());
    }

    #[test]
    fn test_three_players_have_no_layout() {
        let mut game = TurnController::new(GameSettings::new().with_player_count(3)).unwrap();
        for _ in 0..3 {
            game.register_player(Box::new(())).unwrap();
        }
        assert!(matches!(
            game.initialize(),
            Err(Error::ContractViolation(_))
        ));
    }

    #[test]
    fn test_move_submission() {
        let mut game = two_player_game();
        assert_eq!(
            game.try_submit(mv(B, 2, 3)),
            Err(SubmitError::NotYourTurn { player: B })
        );
        assert_eq!(
            game.try_submit(mv(A, 0, 0)),
            Err(SubmitError::IllegalMove {
                player: A,
                pos: BoardIndex::new(0, 0)
            })
        );
        assert_eq!(
            game.try_submit(Command::Set {
                player: A,
                pos: BoardIndex::new(0, 0)
            }),
            Err(SubmitError::SetNotAllowed)
        );
        assert_eq!(
            game.try_submit(mv(PlayerId::new(7), 2, 4)),
            Err(SubmitError::UnknownPlayer(PlayerId::new(7)))
        );
        assert_eq!(game.log().len(), 4);

        assert!(game.submit(mv(A, 2, 4)));
        assert_eq!(game.current_player(), Some(B));
        assert_eq!(game.board().score(A), 4);
        assert_eq!(game.board().score(B), 1);
        assert_eq!(game.log().len(), 5);

        let flips = game.drain_flip_events();
        assert_eq!(flips.len(), 1);
        assert_eq!(flips[0].affected, BoardIndex::new(3, 4));
        assert!(game.drain_flip_events().is_empty());
    }

    #[test]
    fn test_notifications() {
        let events_a = Arc::new(Mutex::new(Events::default()));
        let events_b = Arc::new(Mutex::new(Events::default()));
        let mut game = TurnController::new(GameSettings::new()).unwrap();
        game.register_player(Box::new(Recorder(events_a.clone())))
            .unwrap();
        game.register_player(Box::new(Recorder(events_b.clone())))
            .unwrap();
        game.initialize().unwrap();
        game.submit(mv(A, 2, 4));

        assert_eq!(events_a.lock().unwrap().turns, vec![true, false]);
        assert_eq!(events_b.lock().unwrap().turns, vec![false, true]);

        game.submit(Command::Surrender { player: B });
        assert_eq!(game.outcome(), Some(Outcome { winner: A, score: 4 }));
        assert_eq!(events_a.lock().unwrap().game_over, Some((A, 4)));
        assert_eq!(events_b.lock().unwrap().game_over, Some((A, 4)));
    }

    #[test]
    fn test_no_submissions_after_end() {
        let mut game = two_player_game();
        assert!(game.submit(Command::Surrender { player: A }));
        assert_eq!(game.outcome().map(|o| o.winner), Some(B));
        assert_eq!(game.current_player(), None);
        assert_eq!(game.try_submit(mv(B, 2, 3)), Err(SubmitError::NotRunning));
        assert_eq!(
            game.try_submit(Command::Surrender { player: B }),
            Err(SubmitError::NotRunning)
        );
    }

    #[test]
    fn test_resume_from_record() {
        let mut game = two_player_game();
        game.submit(mv(A, 2, 4));
        game.submit(mv(B, 2, 5));
        let record = game.record();

        let mut resumed = TurnController::from_record(&record).unwrap();
        assert_eq!(resumed.phase(), Phase::Uninitialized);
        resumed.register_player(Box::new(())).unwrap();
        resumed.register_player(Box::new(())).unwrap();
        resumed.initialize().unwrap();

        assert_eq!(resumed.board(), game.board());
        assert_eq!(resumed.current_player(), Some(A));
        assert_eq!(resumed.log(), game.log());
    }

    #[test]
    fn test_cursor_over_log() {
        let mut game = two_player_game();
        game.submit(mv(A, 2, 4));
        let mut cursor = game.cursor().unwrap();
        assert_eq!(cursor.board(), game.board());
        cursor.jump_to(3).unwrap();
        assert_eq!(cursor.board().total_pieces(), 4);
    }

    #[test]
    fn test_flip_events_keep_latest_move() {
        let mut game = two_player_game();
        game.submit(mv(A, 2, 4));
        game.submit(mv(B, 2, 5));
        let flips = game.drain_flip_events();
        assert!(!flips.is_empty());
        assert!(flips.iter().all(|f| f.new_owner == B));
        assert!(flips.iter().all(|f| f.origin == BoardIndex::new(2, 5)));
    }

    #[test]
    fn test_stale_search_is_discarded() {
        let mut game = two_player_game();
        let request = game.search_request(SearchOptions::new(1)).unwrap();
        let outcome = request.run(&crate::search::worker::CancelToken::new());
        game.submit(Command::Surrender { player: A });
        assert!(!game.accept_search(&request, &outcome));
    }
}
