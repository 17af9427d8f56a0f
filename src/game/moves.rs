//! Candidate move generation.
//!
//! Everything here is pseudo-legal: moves are produced from piece movement
//! alone, without regard to whose turn it is or whether the mover's king is
//! left in check. Filtering happens in [`crate::game::rules`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::board::{Board, Color, Piece, PieceKind, Position};

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KING_STEPS: [(i8, i8); 8] = [
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
];
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// A move from `start` to `end`, carrying the promotion kind for pawns that
/// reach the far rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChessMove {
    #[serde(alias = "startPosition")]
    pub start: Position,
    #[serde(alias = "endPosition")]
    pub end: Position,
    #[serde(default, alias = "promotionPiece", skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceKind>,
}

impl ChessMove {
    pub fn new(start: Position, end: Position, promotion: Option<PieceKind>) -> Self {
        Self {
            start,
            end,
            promotion,
        }
    }

    /// Parses long algebraic notation, e.g. `e2e4` or `e7e8q`.
    pub fn from_long_algebraic(text: &str) -> Option<ChessMove> {
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return None;
        }
        let start = Position::from_algebraic(&text[0..2])?;
        let end = Position::from_algebraic(&text[2..4])?;
        let promotion = match text[4..].chars().next() {
            None => None,
            Some('q') => Some(PieceKind::Queen),
            Some('r') => Some(PieceKind::Rook),
            Some('b') => Some(PieceKind::Bishop),
            Some('n') => Some(PieceKind::Knight),
            Some(_) => return None,
        };
        Some(ChessMove::new(start, end, promotion))
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.start, self.end)?;
        if let Some(kind) = self.promotion {
            let suffix = match kind {
                PieceKind::Queen => "q",
                PieceKind::Rook => "r",
                PieceKind::Bishop => "b",
                PieceKind::Knight => "n",
                PieceKind::King | PieceKind::Pawn => "?",
            };
            f.write_str(suffix)?;
        }
        Ok(())
    }
}

/// Candidate moves of the piece standing on `position`; empty when the square
/// is empty.
pub fn piece_moves(board: &Board, position: Position) -> Vec<ChessMove> {
    let Some(piece) = board.piece_at(position) else {
        return Vec::new();
    };

    match piece.kind {
        PieceKind::Rook => sliding_moves(board, position, piece, &ROOK_DIRECTIONS),
        PieceKind::Bishop => sliding_moves(board, position, piece, &BISHOP_DIRECTIONS),
        PieceKind::Queen => {
            let mut moves = sliding_moves(board, position, piece, &ROOK_DIRECTIONS);
            moves.extend(sliding_moves(board, position, piece, &BISHOP_DIRECTIONS));
            moves
        }
        PieceKind::King => stepping_moves(board, position, piece, &KING_STEPS),
        PieceKind::Knight => stepping_moves(board, position, piece, &KNIGHT_JUMPS),
        PieceKind::Pawn => pawn_moves(board, position, piece.color),
    }
}

fn sliding_moves(
    board: &Board,
    position: Position,
    piece: Piece,
    directions: &[(i8, i8)],
) -> Vec<ChessMove> {
    let mut moves = Vec::new();
    for &(d_row, d_col) in directions {
        let mut current = position;
        while let Some(next) = current.offset(d_row, d_col) {
            match board.piece_at(next) {
                None => moves.push(ChessMove::new(position, next, None)),
                Some(other) => {
                    if other.color != piece.color {
                        moves.push(ChessMove::new(position, next, None));
                    }
                    break;
                }
            }
            current = next;
        }
    }
    moves
}

fn stepping_moves(
    board: &Board,
    position: Position,
    piece: Piece,
    offsets: &[(i8, i8)],
) -> Vec<ChessMove> {
    offsets
        .iter()
        .filter_map(|&(d_row, d_col)| position.offset(d_row, d_col))
        .filter(|target| {
            board
                .piece_at(*target)
                .map_or(true, |other| other.color != piece.color)
        })
        .map(|target| ChessMove::new(position, target, None))
        .collect()
}

fn pawn_moves(board: &Board, position: Position, color: Color) -> Vec<ChessMove> {
    let mut moves = Vec::new();
    let forward = color.forward();

    if let Some(one_step) = position.offset(forward, 0) {
        if board.piece_at(one_step).is_none() {
            push_pawn_move(&mut moves, position, one_step, color);

            if position.row() == color.pawn_start_row() {
                if let Some(two_step) = position.offset(2 * forward, 0) {
                    if board.piece_at(two_step).is_none() {
                        moves.push(ChessMove::new(position, two_step, None));
                    }
                }
            }
        }
    }

    for d_col in [-1, 1] {
        let Some(target) = position.offset(forward, d_col) else {
            continue;
        };
        if matches!(board.piece_at(target), Some(other) if other.color != color) {
            push_pawn_move(&mut moves, position, target, color);
        }
    }

    moves
}

fn push_pawn_move(moves: &mut Vec<ChessMove>, start: Position, end: Position, color: Color) {
    if end.row() == color.promotion_row() {
        moves.extend(
            PieceKind::PROMOTIONS
                .iter()
                .map(|kind| ChessMove::new(start, end, Some(*kind))),
        );
    } else {
        moves.push(ChessMove::new(start, end, None));
    }
}
