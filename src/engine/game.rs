//! Stateful game controller wrapping Position.
//!
//! `Game` validates move requests given as coordinate text, applies them,
//! keeps the move history and notifies listeners about placement changes and
//! checks. It is the type front ends interact with.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::engine::board::{AppliedMove, Position};
use crate::engine::events::{GameEvent, GameListener};
use crate::engine::movegen;
use crate::engine::types::{
    Candidate, ChessError, Color, MoveTag, Piece, PieceId, PieceType, Square,
};

// =========================================================================
// MoveOutcome / MoveRecord
// =========================================================================

/// What `Game::do_move` did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOutcome {
    /// The moved piece on its new square.
    pub moved: Piece,
    /// The piece taken on the destination square.
    pub captured: Option<Piece>,
    /// The piece now attacking the opponent's king.
    pub check: Option<Piece>,
}

/// A recorded move in the game history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub piece: PieceId,
    pub kind: PieceType,
    pub color: Color,
    pub captured: Option<Piece>,
}

// =========================================================================
// Game
// =========================================================================

/// A position plus move history and listeners.
pub struct Game {
    position: Position,
    move_history: Vec<MoveRecord>,
    listeners: Vec<Box<dyn GameListener>>,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Create a new game from the standard starting position.
    pub fn new() -> Self {
        Self::with_position(Position::starting())
    }

    /// Create a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        Ok(Self::with_position(Position::from_fen(fen)?))
    }

    /// Create a game from the configured start position.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ChessError> {
        Self::from_fen(&config.start_fen)
    }

    fn with_position(position: Position) -> Self {
        Self {
            position,
            move_history: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Register a listener for placement and check events.
    pub fn subscribe(&mut self, listener: impl GameListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Current board position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Side to move.
    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move
    }

    /// Completed move history.
    pub fn move_history(&self) -> &[MoveRecord] {
        &self.move_history
    }

    /// Current position as FEN.
    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    /// The piece on a square given in coordinate text, e.g. `"e2"`.
    pub fn piece_at(&self, square: &str) -> Result<Option<&Piece>, ChessError> {
        let sq: Square = square.parse()?;
        Ok(self.position.piece_at(sq))
    }

    /// Candidate destinations for the piece on `square`.
    pub fn candidate_moves(&self, square: &str) -> Result<Vec<Candidate>, ChessError> {
        let sq: Square = square.parse()?;
        Ok(movegen::candidates_from(&self.position, sq))
    }

    // -----------------------------------------------------------------
    // Load a new FEN into an existing game (reset).
    // -----------------------------------------------------------------

    /// Load a FEN position, resetting all history. Listeners are kept.
    /// On error the current position is left as it was.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), ChessError> {
        self.position = Position::from_fen(fen)?;
        self.move_history.clear();
        Ok(())
    }

    // -----------------------------------------------------------------
    // Make move
    // -----------------------------------------------------------------

    /// Validate and play a move given as two coordinate texts.
    ///
    /// All checks run before the board is touched, so an error leaves the
    /// game unchanged. Moves that expose the mover's own king are accepted.
    pub fn do_move(&mut self, from: &str, to: &str) -> Result<MoveOutcome, ChessError> {
        let from: Square = from.parse()?;
        let to: Square = to.parse()?;

        let piece = self
            .position
            .piece_at(from)
            .ok_or(ChessError::NoPieceAt(from))?;
        if piece.color != self.position.side_to_move {
            return Err(ChessError::WrongTurn {
                color: piece.color,
                square: from,
            });
        }

        if !self.accepts(piece, to) {
            return Err(ChessError::IllegalMove { from, to });
        }

        let AppliedMove { moved, captured } = self
            .position
            .make_move(from, to)
            .ok_or(ChessError::NoPieceAt(from))?;

        debug!(%from, %to, piece = %moved, "move applied");

        let check = self.position.checker_of(!moved.color).cloned();

        self.move_history.push(MoveRecord {
            from,
            to,
            piece: moved.id,
            kind: moved.kind,
            color: moved.color,
            captured: captured.clone(),
        });

        self.emit(GameEvent::PiecePlaced {
            piece: moved.clone(),
        });
        if let Some(victim) = &captured {
            self.emit(GameEvent::PiecePlaced {
                piece: victim.clone(),
            });
        }
        if let Some(attacker) = &check
            && let Some(king) = self.position.king(!moved.color).cloned()
        {
            info!(attacker = %attacker, king = %king, "check");
            self.emit(GameEvent::Check {
                attacker: attacker.clone(),
                king,
            });
        }

        Ok(MoveOutcome {
            moved,
            captured,
            check,
        })
    }

    /// Whether `piece` may go to `to` according to its candidates.
    ///
    /// Pawn candidates carry a tag: pushes need an empty destination and
    /// diagonals need an enemy there or an empty en-passant target.
    fn accepts(&self, piece: &Piece, to: Square) -> bool {
        let occupant = self.position.piece_at(to);
        let occupied = occupant.is_some();
        let enemy = occupant.is_some_and(|p| p.color != piece.color);
        let en_passant = !occupied && self.position.en_passant == Some(to);
        movegen::candidate_moves(&self.position, piece)
            .into_iter()
            .filter(|c| c.to == to)
            .any(|c| match c.tag {
                None => true,
                Some(MoveTag::MoveOnly) => !occupied,
                Some(MoveTag::AttackOnly) => enemy || en_passant,
            })
    }

    fn emit(&mut self, event: GameEvent) {
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("position", &self.position)
            .field("move_history", &self.move_history)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn placement(g: &Game) -> String {
        g.to_fen().split(' ').next().unwrap().to_string()
    }

    fn recorder(g: &mut Game) -> Rc<RefCell<Vec<GameEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        g.subscribe(move |e: &GameEvent| sink.borrow_mut().push(e.clone()));
        events
    }

    // -----------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------

    #[test]
    fn new_game_is_start_position() {
        let g = Game::new();
        assert_eq!(g.to_fen(), crate::engine::START_FEN);
        assert_eq!(g.side_to_move(), Color::White);
    }

    #[test]
    fn game_from_invalid_fen() {
        assert!(matches!(
            Game::from_fen("invalid"),
            Err(ChessError::InvalidFen(_))
        ));
    }

    #[test]
    fn game_from_config() {
        let config = EngineConfig {
            start_fen: "4k3/8/8/8/8/8/8/4K3 b - - 0 9".into(),
            ..EngineConfig::default()
        };
        let g = Game::from_config(&config).unwrap();
        assert_eq!(g.side_to_move(), Color::Black);
    }

    #[test]
    fn piece_lookup_by_text() {
        let g = Game::new();
        let king = g.piece_at("e1").unwrap().unwrap();
        assert_eq!((king.color, king.kind), (Color::White, PieceType::King));
        assert!(g.piece_at("e4").unwrap().is_none());
        assert!(matches!(g.piece_at("z1"), Err(ChessError::InvalidSquare(_))));
    }

    #[test]
    fn candidate_moves_by_text() {
        let g = Game::new();
        let mut to: Vec<Square> = g.candidate_moves("g1").unwrap().iter().map(|c| c.to).collect();
        to.sort();
        assert_eq!(to, vec![sq("f3"), sq("h3")]);
    }

    // -----------------------------------------------------------------
    // Rejections
    // -----------------------------------------------------------------

    #[test]
    fn wrong_turn() {
        let mut g = Game::new();
        assert_eq!(
            g.do_move("e7", "e5"),
            Err(ChessError::WrongTurn {
                color: Color::Black,
                square: sq("e7"),
            })
        );
    }

    #[test]
    fn invalid_coordinate() {
        let mut g = Game::new();
        assert_eq!(
            g.do_move("i9", "e4"),
            Err(ChessError::InvalidSquare("i9".into()))
        );
        assert_eq!(
            g.do_move("e2", "e9"),
            Err(ChessError::InvalidSquare("e9".into()))
        );
    }

    #[test]
    fn no_piece_at_source() {
        let mut g = Game::new();
        assert_eq!(g.do_move("e4", "e5"), Err(ChessError::NoPieceAt(sq("e4"))));
    }

    #[test]
    fn illegal_destination_leaves_board_unchanged() {
        let mut g = Game::new();
        let events = recorder(&mut g);
        let before = g.to_fen();
        assert_eq!(
            g.do_move("b1", "b3"),
            Err(ChessError::IllegalMove {
                from: sq("b1"),
                to: sq("b3"),
            })
        );
        assert_eq!(g.to_fen(), before);
        assert!(g.move_history().is_empty());
        assert!(events.borrow().is_empty());
        g.position().assert_consistent();
    }

    #[test]
    fn pawn_cannot_move_diagonally_to_empty_square() {
        let mut g = Game::new();
        assert!(matches!(
            g.do_move("e2", "d3"),
            Err(ChessError::IllegalMove { .. })
        ));
    }

    #[test]
    fn pawn_cannot_capture_straight_ahead() {
        let mut g = Game::from_fen("4k3/8/8/8/4p3/4P3/8/4K3 w - - 0 0").unwrap();
        assert!(matches!(
            g.do_move("e3", "e4"),
            Err(ChessError::IllegalMove { .. })
        ));
    }

    #[test]
    fn king_cannot_step_into_attack() {
        let mut g = Game::from_fen("4k3/8/8/8/8/8/r7/4K3 w - - 0 0").unwrap();
        assert!(matches!(
            g.do_move("e1", "e2"),
            Err(ChessError::IllegalMove { .. })
        ));
        assert!(g.do_move("e1", "f1").is_ok());
    }

    // -----------------------------------------------------------------
    // Execution and bookkeeping
    // -----------------------------------------------------------------

    #[test]
    fn e2e4_bookkeeping() {
        let mut g = Game::new();
        let outcome = g.do_move("e2", "e4").unwrap();
        assert!(outcome.captured.is_none());
        assert!(outcome.check.is_none());
        assert_eq!(outcome.moved.square, Some(sq("e4")));
        assert_eq!(outcome.moved.kind, PieceType::Pawn);

        assert_eq!(placement(&g), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR");
        assert_eq!(g.side_to_move(), Color::Black);
        assert_eq!(g.position().halfmove_clock, 0);
        assert_eq!(g.position().fullmove_number, 0);
        assert_eq!(
            g.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 0"
        );
    }

    #[test]
    fn fullmove_increments_after_black() {
        let mut g = Game::new();
        g.do_move("e2", "e4").unwrap();
        g.do_move("e7", "e5").unwrap();
        assert_eq!(g.position().fullmove_number, 1);
        assert_eq!(g.side_to_move(), Color::White);
    }

    #[test]
    fn halfmove_clock_only_increments() {
        let mut g = Game::new();
        g.do_move("g1", "f3").unwrap();
        g.do_move("g8", "f6").unwrap();
        assert_eq!(g.position().halfmove_clock, 2);
        // A pawn move leaves the clock where it was rather than resetting it.
        g.do_move("e2", "e4").unwrap();
        assert_eq!(g.position().halfmove_clock, 2);
        // So does a capture.
        g.do_move("f6", "e4").unwrap();
        assert_eq!(g.position().halfmove_clock, 2);
        g.do_move("b1", "c3").unwrap();
        assert_eq!(g.position().halfmove_clock, 3);
    }

    #[test]
    fn capture_removes_piece() {
        let mut g = Game::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 3 0").unwrap();
        let victim_id = g.piece_at("d5").unwrap().unwrap().id;

        let outcome = g.do_move("e4", "d5").unwrap();
        let captured = outcome.captured.unwrap();
        assert_eq!(captured.id, victim_id);
        assert_eq!(captured.square, None);
        assert!(g.position().piece(victim_id).is_none());
        assert_eq!(g.position().captured(), std::slice::from_ref(&captured));
        assert_eq!(placement(&g), "4k3/8/8/3P4/8/8/8/4K3");
        assert_eq!(g.position().halfmove_clock, 3);
        g.position().assert_consistent();
    }

    #[test]
    fn rook_move_clears_kingside_right() {
        let mut g = Game::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPP1/R3K2R w KQkq - 0 0").unwrap();
        g.do_move("h1", "h4").unwrap();
        assert_eq!(g.position().castling_rights.to_fen(), "Qkq");
    }

    #[test]
    fn king_move_clears_both_rights() {
        let mut g = Game::from_fen("r3k2r/pppppppp/8/8/8/8/PPPP1PPP/R3K2R w KQkq - 0 0").unwrap();
        g.do_move("e1", "e2").unwrap();
        assert_eq!(g.position().castling_rights.to_fen(), "kq");
        // Moving back does not restore anything.
        g.do_move("a7", "a6").unwrap();
        g.do_move("e2", "e1").unwrap();
        assert_eq!(g.position().castling_rights.to_fen(), "kq");
    }

    #[test]
    fn self_check_is_not_prevented() {
        // The bishop is pinned against its king, yet moving it is accepted.
        let mut g = Game::from_fen("4r2k/8/8/8/8/8/4B3/4K3 w - - 0 0").unwrap();
        let outcome = g.do_move("e2", "d3").unwrap();
        assert!(outcome.check.is_none());
        let checker = g.position().checker_of(Color::White).unwrap();
        assert_eq!(checker.square, Some(sq("e8")));
    }

    #[test]
    fn en_passant_leaves_passed_pawn() {
        let mut g = Game::new();
        for (from, to) in [("e2", "e4"), ("a7", "a6"), ("e4", "e5"), ("d7", "d5")] {
            g.do_move(from, to).unwrap();
        }
        assert_eq!(g.position().en_passant, Some(sq("d6")));

        let outcome = g.do_move("e5", "d6").unwrap();
        assert!(outcome.captured.is_none());
        let passed = g.piece_at("d5").unwrap().unwrap();
        assert_eq!((passed.color, passed.kind), (Color::Black, PieceType::Pawn));
        assert_eq!(g.position().en_passant, None);
        assert_eq!(
            placement(&g),
            "rnbqkbnr/1pp1pppp/p2P4/3p4/8/8/PPPP1PPP/RNBQKBNR"
        );
    }

    // -----------------------------------------------------------------
    // Notifications and history
    // -----------------------------------------------------------------

    #[test]
    fn placement_events_for_mover_and_victim() {
        let mut g = Game::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 0").unwrap();
        let events = recorder(&mut g);
        g.do_move("e4", "d5").unwrap();

        let events = events.borrow();
        assert_eq!(events.len(), 2);
        match (&events[0], &events[1]) {
            (GameEvent::PiecePlaced { piece: mover }, GameEvent::PiecePlaced { piece: victim }) => {
                assert_eq!(mover.square, Some(sq("d5")));
                assert_eq!(mover.color, Color::White);
                assert_eq!(victim.square, None);
                assert_eq!(victim.color, Color::Black);
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn check_notification_names_attacker() {
        let mut g = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 w Q - 0 0").unwrap();
        let events = recorder(&mut g);
        let outcome = g.do_move("a1", "a8").unwrap();

        let checker = outcome.check.unwrap();
        assert_eq!(checker.kind, PieceType::Rook);
        assert_eq!(checker.square, Some(sq("a8")));

        let events = events.borrow();
        assert_eq!(events.len(), 2);
        match &events[1] {
            GameEvent::Check { attacker, king } => {
                assert_eq!(attacker.id, checker.id);
                assert_eq!(king.square, Some(sq("e8")));
                assert_eq!(king.color, Color::Black);
            }
            other => panic!("expected check, got {other:?}"),
        }
        drop(events);
        // Check never blocks play.
        assert_eq!(g.side_to_move(), Color::Black);
        assert!(g.do_move("e8", "e7").is_ok());
    }

    #[test]
    fn history_records_moves() {
        let mut g = Game::new();
        g.do_move("e2", "e4").unwrap();
        g.do_move("d7", "d5").unwrap();
        g.do_move("e4", "d5").unwrap();

        let history = g.move_history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].from, sq("e2"));
        assert_eq!(history[0].to, sq("e4"));
        assert_eq!(history[1].color, Color::Black);
        assert_eq!(history[2].kind, PieceType::Pawn);
        assert_eq!(
            history[2].captured.as_ref().map(|p| p.color),
            Some(Color::Black)
        );
    }

    #[test]
    fn load_fen_resets_game() {
        let mut g = Game::new();
        g.do_move("e2", "e4").unwrap();
        g.load_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 0").unwrap();
        assert!(g.move_history().is_empty());
        assert_eq!(g.piece_at("e8").unwrap().unwrap().id, PieceId(0));
        assert!(g.position().captured().is_empty());
    }

    #[test]
    fn failed_load_keeps_position() {
        let mut g = Game::new();
        g.do_move("e2", "e4").unwrap();
        let before = g.to_fen();
        assert!(g.load_fen("8/8/8/8 w - - 0 0").is_err());
        assert_eq!(g.to_fen(), before);
        assert_eq!(g.move_history().len(), 1);
    }
}
