//! Mailbox board state with a piece registry.
//!
//! `Position` keeps an 8×8 grid of piece ids next to a registry that owns the
//! `Piece` values, so a piece can be found either by square or by id. It also
//! tracks at most one king per colour, the side to move, castling rights,
//! the en-passant target and both move counters.

use std::collections::HashMap;

use crate::engine::attacks;
use crate::engine::types::{CastlingRights, Color, Piece, PieceId, PieceType, Square};

// ---------------------------------------------------------------------------
// AppliedMove
// ---------------------------------------------------------------------------

/// Result of applying a move to the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedMove {
    /// The moved piece, already on its destination.
    pub moved: Piece,
    /// The piece that stood on the destination, now off the board.
    pub captured: Option<Piece>,
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A complete chess position.
///
/// Board layout follows LERF (Little-Endian Rank-File) mapping:
/// a1 = 0, b1 = 1, … h1 = 7, a2 = 8, … h8 = 63.
#[derive(Clone, Debug)]
pub struct Position {
    /// Grid of non-owning references into `pieces`.
    grid: [Option<PieceId>; Square::NUM],

    /// Live pieces by id.
    pieces: HashMap<PieceId, Piece>,

    /// Captured pieces, oldest first.
    captured: Vec<Piece>,

    /// King id per colour (`kings[color.index()]`).
    kings: [Option<PieceId>; 2],

    /// Next id to hand out.
    next_id: u32,

    /// Whose turn it is.
    pub side_to_move: Color,

    /// Castling availability (K/Q/k/q).
    pub castling_rights: CastlingRights,

    /// En-passant target square (the square *behind* the double-pushed pawn).
    pub en_passant: Option<Square>,

    /// Plies without a capture or pawn move. Only ever incremented.
    pub halfmove_clock: u32,

    /// Incremented after every Black move.
    pub fullmove_number: u32,
}

// ---------------------------------------------------------------------------
// Construction helpers
// ---------------------------------------------------------------------------

impl Position {
    /// Create an empty board with no pieces.
    pub(crate) fn empty() -> Self {
        Position {
            grid: [None; Square::NUM],
            pieces: HashMap::with_capacity(32),
            captured: Vec::new(),
            kings: [None; 2],
            next_id: 0,
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 0,
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        Self::from_fen(crate::engine::fen::START_FEN).expect("starting FEN is always valid")
    }

    // -----------------------------------------------------------------------
    // Piece manipulation (low-level)
    // -----------------------------------------------------------------------

    /// Create a new piece on an empty square and return its id.
    pub(crate) fn spawn(&mut self, sq: Square, color: Color, kind: PieceType) -> PieceId {
        debug_assert!(self.grid[sq.index()].is_none(), "{sq} already occupied");
        let id = PieceId(self.next_id);
        self.next_id += 1;
        self.pieces.insert(
            id,
            Piece {
                id,
                kind,
                color,
                square: Some(sq),
            },
        );
        self.grid[sq.index()] = Some(id);
        if kind == PieceType::King {
            self.kings[color.index()] = Some(id);
        }
        id
    }

    /// Move a live piece to `to`, capturing whatever stands there.
    ///
    /// Returns the captured piece, which is dropped from the registry and
    /// appended to the captured log.
    pub(crate) fn relocate(&mut self, id: PieceId, to: Square) -> Option<Piece> {
        let captured = self.grid[to.index()]
            .filter(|&victim| victim != id)
            .and_then(|victim| self.pieces.remove(&victim))
            .map(|mut victim| {
                victim.square = None;
                self.captured.push(victim.clone());
                victim
            });

        if let Some(piece) = self.pieces.get_mut(&id) {
            if let Some(from) = piece.square {
                self.grid[from.index()] = None;
            }
            piece.square = Some(to);
            self.grid[to.index()] = Some(id);
        }
        captured
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// What piece (if any) is on a given square?
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.grid[sq.index()].and_then(|id| self.pieces.get(&id))
    }

    /// Look up a live piece by id.
    #[inline]
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    /// All live pieces, ordered by id.
    pub fn pieces(&self) -> Vec<&Piece> {
        let mut pieces: Vec<&Piece> = self.pieces.values().collect();
        pieces.sort_by_key(|p| p.id);
        pieces
    }

    /// Captured pieces in the order they were taken.
    pub fn captured(&self) -> &[Piece] {
        &self.captured
    }

    /// The tracked king of `color`, `None` once it has been captured or if
    /// the loaded FEN had none.
    #[inline]
    pub fn king(&self, color: Color) -> Option<&Piece> {
        self.kings[color.index()].and_then(|id| self.pieces.get(&id))
    }

    /// Number of kings placed for `color` while loading.
    pub(crate) fn king_count(&self, color: Color) -> usize {
        self.pieces
            .values()
            .filter(|p| p.kind == PieceType::King && p.color == color)
            .count()
    }

    // -----------------------------------------------------------------------
    // Attack detection
    // -----------------------------------------------------------------------

    /// The first piece of colour `by` found attacking `sq`, if any.
    #[inline]
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> Option<&Piece> {
        attacks::attacker_of(self, sq, by)
    }

    /// The piece attacking `color`'s king, if that king is in check.
    pub fn checker_of(&self, color: Color) -> Option<&Piece> {
        let king_sq = self.king(color)?.square?;
        self.is_square_attacked(king_sq, !color)
    }

    // -----------------------------------------------------------------------
    // Occupancy sanity check (debug builds)
    // -----------------------------------------------------------------------

    /// Verify that the grid and the registry agree.
    /// Available in debug builds and test builds.
    #[cfg(any(debug_assertions, test))]
    pub fn assert_consistent(&self) {
        for (idx, cell) in self.grid.iter().enumerate() {
            if let Some(id) = cell {
                let piece = self
                    .pieces
                    .get(id)
                    .unwrap_or_else(|| panic!("grid cell {idx} points at dead piece {id}"));
                assert_eq!(
                    piece.square.map(Square::index),
                    Some(idx),
                    "piece {id} position disagrees with grid",
                );
            }
        }
        for piece in self.pieces.values() {
            let sq = piece
                .square
                .unwrap_or_else(|| panic!("live piece {} has no square", piece.id));
            assert_eq!(self.grid[sq.index()], Some(piece.id), "grid misses {}", piece.id);
        }
        for piece in &self.captured {
            assert!(piece.square.is_none(), "captured {} still placed", piece.id);
            assert!(!self.pieces.contains_key(&piece.id));
        }
    }

    // -----------------------------------------------------------------------
    // Make move
    // -----------------------------------------------------------------------

    /// Apply a move and update all bookkeeping.
    ///
    /// No legality checks happen here; `Game::do_move` validates first.
    /// Returns `None` if `from` is empty.
    pub fn make_move(&mut self, from: Square, to: Square) -> Option<AppliedMove> {
        let mover = self.piece_at(from)?.clone();
        let us = mover.color;

        let captured = self.relocate(mover.id, to);

        // ---- En passant target ----
        // Only a double push leaves one. The pawn passed over on the
        // en-passant square is never removed.
        self.en_passant = None;
        if mover.kind == PieceType::Pawn && from.row().abs_diff(to.row()) == 2 {
            self.en_passant = from.offset(us.forward(), 0);
        }

        // ---- Fullmove number ----
        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        // ---- Switch side ----
        self.side_to_move = !us;

        // ---- Halfmove clock ----
        if mover.kind != PieceType::Pawn && captured.is_none() {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }

        // ---- Castling rights ----
        match mover.kind {
            PieceType::King => {
                self.castling_rights
                    .remove(CastlingRights::kingside_flag(us) | CastlingRights::queenside_flag(us));
            }
            PieceType::Rook => {
                let home_row = match us {
                    Color::White => 0,
                    Color::Black => 7,
                };
                if from.row() == home_row {
                    match from.file() {
                        0 => self.castling_rights.remove(CastlingRights::queenside_flag(us)),
                        7 => self.castling_rights.remove(CastlingRights::kingside_flag(us)),
                        _ => {}
                    }
                }
            }
            _ => {}
        }

        let moved = self.pieces.get(&mover.id)?.clone();
        Some(AppliedMove { moved, captured })
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line string (rank 8 at top), useful for debugging.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for row in (0..8).rev() {
            s.push((b'1' + row) as char);
            s.push(' ');
            for file in 0..8 {
                let ch = match self.piece_at(Square::at(row, file)) {
                    Some(p) => p.fen_char(),
                    None => '.',
                };
                s.push(ch);
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
