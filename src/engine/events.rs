//! Notifications a `Game` sends to its listeners.
//!
//! A rendering layer subscribes to stay in sync with the board without
//! rescanning it. Events serialize with a `type` discriminator.

use serde::Serialize;

use crate::engine::types::Piece;

/// Something that changed on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A piece changed square. Sent once for the mover and once for a
    /// captured piece, whose `square` is then `None`.
    PiecePlaced { piece: Piece },
    /// The side to move is in check after the last move.
    Check { attacker: Piece, king: Piece },
}

/// Receives `GameEvent`s from a `Game`.
pub trait GameListener {
    fn on_event(&mut self, event: &GameEvent);
}

impl<F> GameListener for F
where
    F: FnMut(&GameEvent),
{
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}
