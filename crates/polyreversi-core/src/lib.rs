//! Multi-player Reversi engine.
//!
//! The board rules live in [`board`], the history of a game in [`command`]
//! and [`cursor`], and the turn state machine in [`game_state`]. The
//! [`search`] module provides a minimax player that can run on a background
//! thread.

pub mod board;
pub mod command;
pub mod constants;
pub mod cursor;
pub mod disc;
pub mod error;
pub mod game_state;
pub mod layout;
pub mod perft;
pub mod record;
pub mod search;
pub mod settings;
pub mod square;
pub mod turn_order;
pub mod types;

pub use error::{Error, Result};
