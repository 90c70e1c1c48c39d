//! Offset tables, ray casting and the attack oracle.
//!
//! All lookups walk the mailbox grid directly: leapers try a fixed list of
//! `(row, file)` offsets and sliders step along a direction until they leave
//! the board or hit a piece.

use crate::engine::board::Position;
use crate::engine::types::{Color, Piece, PieceType, Square};

// =========================================================================
// Offset tables
// =========================================================================

/// `(d_row, d_file)` jumps of a knight.
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (1, 2),
    (2, -1),
    (1, -2),
    (-2, 1),
    (-1, 2),
    (-2, -1),
    (-1, -2),
];

/// Orthogonal ray directions (rook).
pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Diagonal ray directions (bishop).
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// All eight directions (queen, king).
pub const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

// =========================================================================
// Ray casting
// =========================================================================

/// Squares from `from` (exclusive) along `dir`, until the edge of the board.
pub fn ray(from: Square, dir: (i8, i8)) -> impl Iterator<Item = Square> {
    std::iter::successors(from.offset(dir.0, dir.1), move |sq| sq.offset(dir.0, dir.1))
}

/// First piece hit walking from `from` along `dir`.
pub fn first_piece_in_direction(pos: &Position, from: Square, dir: (i8, i8)) -> Option<&Piece> {
    ray(from, dir).find_map(|sq| pos.piece_at(sq))
}

// =========================================================================
// Attack oracle
// =========================================================================

/// The first piece of colour `by` found attacking `sq`.
///
/// Checks pawns, knights, diagonal sliders and orthogonal sliders in that
/// order and stops at the first hit. Kings are not counted as attackers.
pub fn attacker_of(pos: &Position, sq: Square, by: Color) -> Option<&Piece> {
    let is = |piece: &&Piece, kinds: &[PieceType]| piece.color == by && kinds.contains(&piece.kind);

    // Pawns of `by` sit one row behind `sq` in their direction of travel.
    let back = -by.forward();
    let pawn = [1, -1]
        .into_iter()
        .filter_map(|df| sq.offset(back, df))
        .filter_map(|from| pos.piece_at(from))
        .find(|p| is(p, &[PieceType::Pawn]));
    if pawn.is_some() {
        return pawn;
    }

    let knight = KNIGHT_OFFSETS
        .iter()
        .filter_map(|&(dr, df)| sq.offset(dr, df))
        .filter_map(|from| pos.piece_at(from))
        .find(|p| is(p, &[PieceType::Knight]));
    if knight.is_some() {
        return knight;
    }

    let diagonal = BISHOP_DIRECTIONS
        .iter()
        .filter_map(|&dir| first_piece_in_direction(pos, sq, dir))
        .find(|p| is(p, &[PieceType::Bishop, PieceType::Queen]));
    if diagonal.is_some() {
        return diagonal;
    }

    ROOK_DIRECTIONS
        .iter()
        .filter_map(|&dir| first_piece_in_direction(pos, sq, dir))
        .find(|p| is(p, &[PieceType::Rook, PieceType::Queen]))
}

// =========================================================================
// Tests
// =========================================================================
