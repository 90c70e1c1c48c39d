//! Pseudo-legal move generation.
//!
//! Every piece kind has its own generator producing candidate destinations.
//! Nothing here checks whether the mover's own king ends up attacked, except
//! the king generator, which drops squares the opponent attacks.

use crate::engine::attacks::{
    self, BISHOP_DIRECTIONS, KNIGHT_OFFSETS, QUEEN_DIRECTIONS, ROOK_DIRECTIONS,
};
use crate::engine::board::Position;
use crate::engine::types::{Candidate, Color, MoveTag, Piece, PieceType, Square};

// =========================================================================
// Public API
// =========================================================================

/// Candidate destinations for `piece`. Captured pieces have none.
pub fn candidate_moves(pos: &Position, piece: &Piece) -> Vec<Candidate> {
    let Some(from) = piece.square else {
        return Vec::new();
    };
    match piece.kind {
        PieceType::Pawn => pawn_moves(pos, from, piece.color),
        PieceType::Knight => knight_moves(pos, from, piece.color),
        PieceType::Bishop => slider_moves(pos, from, piece.color, &BISHOP_DIRECTIONS, 7),
        PieceType::Rook => slider_moves(pos, from, piece.color, &ROOK_DIRECTIONS, 7),
        PieceType::Queen => slider_moves(pos, from, piece.color, &QUEEN_DIRECTIONS, 7),
        PieceType::King => king_moves(pos, from, piece.color),
    }
}

/// Candidate destinations for whatever stands on `from`.
pub fn candidates_from(pos: &Position, from: Square) -> Vec<Candidate> {
    pos.piece_at(from)
        .map(|piece| candidate_moves(pos, piece))
        .unwrap_or_default()
}

// =========================================================================
// Pawn moves
// =========================================================================

fn pawn_moves(pos: &Position, from: Square, us: Color) -> Vec<Candidate> {
    let mut moves = Vec::with_capacity(4);
    let dir = us.forward();
    let start_row = match us {
        Color::White => 1,
        Color::Black => 6,
    };

    // --- Pushes ---
    if let Some(one) = from.offset(dir, 0)
        && pos.piece_at(one).is_none()
    {
        moves.push(Candidate::tagged(one, MoveTag::MoveOnly));

        if from.row() == start_row
            && let Some(two) = one.offset(dir, 0)
            && pos.piece_at(two).is_none()
        {
            moves.push(Candidate::tagged(two, MoveTag::MoveOnly));
        }
    }

    // --- Captures, including the en-passant target ---
    for df in [-1, 1] {
        let Some(to) = from.offset(dir, df) else {
            continue;
        };
        // The en-passant target only counts while it is empty.
        let captures = match pos.piece_at(to) {
            Some(p) => p.color != us,
            None => pos.en_passant == Some(to),
        };
        if captures {
            moves.push(Candidate::tagged(to, MoveTag::AttackOnly));
        }
    }

    moves
}

// =========================================================================
// Knight moves
// =========================================================================

fn knight_moves(pos: &Position, from: Square, us: Color) -> Vec<Candidate> {
    KNIGHT_OFFSETS
        .iter()
        .filter_map(|&(dr, df)| from.offset(dr, df))
        .filter(|&to| pos.piece_at(to).is_none_or(|p| p.color != us))
        .map(Candidate::new)
        .collect()
}

// =========================================================================
// Slider moves (bishop, rook, queen) and the king's single steps
// =========================================================================

fn slider_moves(
    pos: &Position,
    from: Square,
    us: Color,
    directions: &[(i8, i8)],
    max_dist: usize,
) -> Vec<Candidate> {
    let mut moves = Vec::new();
    for &dir in directions {
        for to in attacks::ray(from, dir).take(max_dist) {
            match pos.piece_at(to) {
                None => moves.push(Candidate::new(to)),
                Some(p) => {
                    if p.color != us {
                        moves.push(Candidate::new(to));
                    }
                    break;
                }
            }
        }
    }
    moves
}

fn king_moves(pos: &Position, from: Square, us: Color) -> Vec<Candidate> {
    let mut moves = slider_moves(pos, from, us, &QUEEN_DIRECTIONS, 1);
    moves.retain(|c| pos.is_square_attacked(c.to, !us).is_none());
    moves
}

// =========================================================================
// Tests
// =========================================================================
