pub mod attacks;
pub mod board;
pub mod events;
pub mod fen;
pub mod game;
pub mod movegen;
pub mod types;

pub use board::{AppliedMove, Position};
pub use events::{GameEvent, GameListener};
pub use fen::START_FEN;
pub use game::{Game, MoveOutcome, MoveRecord};
pub use movegen::{candidate_moves, candidates_from};
pub use types::*;
