//! FEN parsing & generation for `Position`.

use crate::engine::board::Position;
use crate::engine::types::{CastlingRights, ChessError, Color, PieceType, Square};

/// Standard starting position. The full-move field starts at 0.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 0";

impl Position {
    /// Parse a FEN string into a `Position`.
    ///
    /// Validates all 6 fields and allows at most one king per side, so a
    /// position whose king was captured still loads. Piece
    /// ids are handed out from 0 in the order pieces appear in the text.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fields: Vec<&str> = fen.split(' ').collect();
        if fields.len() != 6 {
            return Err(ChessError::InvalidFen(format!(
                "expected 6 fields, got {}",
                fields.len()
            )));
        }

        let mut pos = Position::empty();

        // ----- Field 1: Piece placement -----
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidFen(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let row = 7 - rank_idx as u8; // FEN starts from rank 8
            parse_rank(&mut pos, row, rank_str)?;
        }

        for color in [Color::White, Color::Black] {
            let kings = pos.king_count(color);
            if kings > 1 {
                return Err(ChessError::InvalidFen(format!(
                    "{color} has {kings} kings (expected at most 1)"
                )));
            }
        }

        // ----- Field 2: Side to move -----
        pos.side_to_move = match fields[1].to_ascii_lowercase().as_str() {
            "w" => Color::White,
            "b" => Color::Black,
            _ => {
                return Err(ChessError::InvalidFen(format!(
                    "invalid active colour: '{}'",
                    fields[1]
                )));
            }
        };

        // ----- Field 3: Castling availability -----
        pos.castling_rights = CastlingRights::from_fen(fields[2]).ok_or_else(|| {
            ChessError::InvalidFen(format!("invalid castling field: '{}'", fields[2]))
        })?;

        // ----- Field 4: En passant target square -----
        if fields[3] != "-" {
            let ep_sq = Square::from_algebraic(fields[3]).ok_or_else(|| {
                ChessError::InvalidFen(format!("invalid en passant square: '{}'", fields[3]))
            })?;
            pos.en_passant = Some(ep_sq);
        }

        // ----- Fields 5 & 6: clocks -----
        pos.halfmove_clock = parse_counter(fields[4], "halfmove clock")?;
        pos.fullmove_number = parse_counter(fields[5], "fullmove number")?;

        #[cfg(debug_assertions)]
        pos.assert_consistent();

        tracing::debug!(fen, pieces = pos.pieces().len(), "loaded position");
        Ok(pos)
    }

    /// Export the position as a FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(80);

        // ----- Field 1: Piece placement -----
        for row in (0..8).rev() {
            let mut empty_count = 0u8;
            for file in 0..8 {
                match self.piece_at(Square::at(row, file)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        fen.push(piece.fen_char());
                    }
                    None => {
                        empty_count += 1;
                    }
                }
            }
            if empty_count > 0 {
                fen.push((b'0' + empty_count) as char);
            }
            if row > 0 {
                fen.push('/');
            }
        }

        // ----- Field 2: Side to move -----
        fen.push(' ');
        fen.push(self.side_to_move.to_fen());

        // ----- Field 3: Castling -----
        fen.push(' ');
        fen.push_str(&self.castling_rights.to_fen());

        // ----- Field 4: En passant -----
        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }

        // ----- Fields 5 & 6: clocks -----
        fen.push(' ');
        fen.push_str(&self.halfmove_clock.to_string());
        fen.push(' ');
        fen.push_str(&self.fullmove_number.to_string());

        fen
    }
}

/// Fill one row of the grid from its FEN rank string.
fn parse_rank(pos: &mut Position, row: u8, rank_str: &str) -> Result<(), ChessError> {
    let rank = row + 1;
    let mut file: u8 = 0;
    let mut after_digit = false;
    for ch in rank_str.chars() {
        if let Some(digit) = ch.to_digit(10) {
            if !(1..=8).contains(&digit) {
                return Err(ChessError::InvalidFen(format!(
                    "invalid empty count '{ch}' in rank {rank}"
                )));
            }
            // Split runs like "53" have no canonical rendering.
            if after_digit {
                return Err(ChessError::InvalidFen(format!(
                    "consecutive empty counts in rank {rank}: '{rank_str}'"
                )));
            }
            file += digit as u8;
            after_digit = true;
        } else {
            let (color, kind) =
                PieceType::from_char(ch).ok_or(ChessError::UnknownPieceKind(ch))?;
            if file > 7 {
                return Err(ChessError::InvalidFen(format!(
                    "too many files in rank {rank}: '{rank_str}'"
                )));
            }
            pos.spawn(Square::at(row, file), color, kind);
            file += 1;
            after_digit = false;
        }
    }
    if file != 8 {
        return Err(ChessError::InvalidFen(format!(
            "rank {rank} has {file} files instead of 8: '{rank_str}'"
        )));
    }
    Ok(())
}

/// Parse a non-negative decimal counter, rejecting signs and leading zeros.
fn parse_counter(field: &str, what: &str) -> Result<u32, ChessError> {
    let canonical = !field.is_empty()
        && field.bytes().all(|b| b.is_ascii_digit())
        && (field == "0" || !field.starts_with('0'));
    if !canonical {
        return Err(ChessError::InvalidFen(format!("invalid {what}: '{field}'")));
    }
    field
        .parse::<u32>()
        .map_err(|_| ChessError::InvalidFen(format!("invalid {what}: '{field}'")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
