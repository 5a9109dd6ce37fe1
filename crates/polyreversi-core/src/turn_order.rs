//! Cyclic turn order over the registered players.
//!
//! Turn order is a plain list of ids in registration order; who is still in
//! the game is decided by a separate predicate, so surrenders never rewrite
//! the order itself.

use crate::types::PlayerId;

/// Registered players in registration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnOrder {
    players: Vec<PlayerId>,
}

impl TurnOrder {
    pub fn new() -> TurnOrder {
        TurnOrder::default()
    }

    /// Registers a new player and returns its id, the next free small
    /// integer.
    pub fn register(&mut self) -> PlayerId {
        let id = PlayerId::new(self.players.len() as u8);
        self.players.push(id);
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    #[inline]
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    #[inline]
    pub fn contains(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }

    /// Returns the player after `current`, wrapping around, or the first
    /// player when `current` is `None`.
    pub fn next(&self, current: Option<PlayerId>) -> Option<PlayerId> {
        let Some(current) = current else {
            return self.players.first().copied();
        };
        self.players
            .iter()
            .copied()
            .find(|&p| p > current)
            .or_else(|| self.players.first().copied())
    }

    /// Returns the first player after `current` (wrapping, possibly
    /// `current` itself) for which `is_active` holds.
    pub fn next_active(
        &self,
        current: Option<PlayerId>,
        is_active: impl Fn(PlayerId) -> bool,
    ) -> Option<PlayerId> {
        let mut candidate = current;
        for _ in 0..self.players.len() {
            candidate = self.next(candidate);
            if let Some(p) = candidate
                && is_active(p)
            {
                return Some(p);
            }
        }
        None
    }

    /// Snapshots the players for which `is_active` holds as a [`Rotation`].
    pub fn rotation(&self, is_active: impl Fn(PlayerId) -> bool, allow_skipping: bool) -> Rotation {
        Rotation::new(
            self.players.iter().copied().filter(|&p| is_active(p)).collect(),
            allow_skipping,
        )
    }
}

/// Immutable snapshot of the players still taking turns, together with the
/// turn-skip policy. This is what the search uses to decide who moves next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rotation {
    active: Vec<PlayerId>,
    allow_skipping: bool,
}

impl Rotation {
    /// Creates a rotation over `active`, which is sorted into turn order.
    pub fn new(mut active: Vec<PlayerId>, allow_skipping: bool) -> Rotation {
        active.sort_unstable();
        active.dedup();
        Rotation {
            active,
            allow_skipping,
        }
    }

    /// Creates a rotation over players `0..count` with skipping allowed.
    pub fn with_players(count: usize) -> Rotation {
        Rotation::new((0..count as u8).map(PlayerId::new).collect(), true)
    }

    /// Returns the active player after `player`, wrapping around.
    ///
    /// `player` need not be active itself; the next active id above it is
    /// returned. An empty rotation returns `player` unchanged.
    pub fn next(&self, player: PlayerId) -> PlayerId {
        self.active
            .iter()
            .copied()
            .find(|&p| p > player)
            .or_else(|| self.active.first().copied())
            .unwrap_or(player)
    }

    /// Returns the number of active players.
    #[inline]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    #[inline]
    pub fn players(&self) -> &[PlayerId] {
        &self.active
    }

    #[inline]
    pub fn allow_skipping(&self) -> bool {
        self.allow_skipping
    }
}
