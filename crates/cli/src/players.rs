//! Seats at the table and how each one picks its moves.

use clap::ValueEnum;
use polyreversi_core::game_state::PlayerListener;
use polyreversi_core::types::PlayerId;
use tracing::debug;

/// Kind of participant occupying a seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Seat {
    /// Moves are typed at the prompt.
    Human,
    /// Moves come from the minimax search worker.
    Minimax,
    /// Moves are drawn uniformly from the legal moves.
    Random,
}

impl Seat {
    pub fn label(self) -> &'static str {
        match self {
            Seat::Human => "human",
            Seat::Minimax => "minimax",
            Seat::Random => "random",
        }
    }
}

/// Listener registered for every seat. The terminal loop polls the
/// controller, so notifications only go to the log.
pub struct SeatListener {
    seat: Seat,
    id: PlayerId,
}

impl SeatListener {
    pub fn new(seat: Seat, id: PlayerId) -> Self {
        SeatListener { seat, id }
    }
}

impl PlayerListener for SeatListener {
    fn on_turn_changed(&mut self, is_current: bool) {
        if is_current {
            debug!(player = %self.id, seat = self.seat.label(), "seat to move");
        }
    }

    fn on_game_over(&mut self, winner: PlayerId, score: u32) {
        debug!(player = %self.id, %winner, score, won = self.id == winner, "game over");
    }
}

/// Fills `seats` up to `player_count` with minimax players.
///
/// # Errors
/// Returns an error when more seats than players are given.
pub fn seat_table(seats: &[Seat], player_count: usize) -> Result<Vec<Seat>, String> {
    if seats.len() > player_count {
        return Err(format!(
            "{} seats given for a {player_count}-player game",
            seats.len()
        ));
    }
    let mut table = seats.to_vec();
    table.resize(player_count, Seat::Minimax);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_table() {
        assert_eq!(
            seat_table(&[Seat::Human], 4).unwrap(),
            vec![Seat::Human, Seat::Minimax, Seat::Minimax, Seat::Minimax]
        );
        assert!(seat_table(&[Seat::Human, Seat::Human, Seat::Random], 2).is_err());
    }
}
