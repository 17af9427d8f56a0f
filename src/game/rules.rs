//! Legality filtering, move application and terminal-state detection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::board::{Board, Color, Piece, Position};
use super::moves::{piece_moves, ChessMove};

/// Reasons the engine rejects a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidMove {
    #[error("no piece at start position")]
    NoPieceAtStart,
    #[error("not your turn")]
    WrongTurn,
    #[error("illegal move")]
    IllegalMove,
    #[error("game is over")]
    GameOver,
}

/// State of the game from the point of view of the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Check,
    Checkmate,
    Stalemate,
    /// Ended without a board verdict, i.e. by resignation.
    Over,
}

/// One match: the board, the side to move and whether the game has ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessGame {
    board: Board,
    turn: Color,
    game_over: bool,
}

impl Default for ChessGame {
    fn default() -> Self {
        Self::new()
    }
}

impl ChessGame {
    /// A fresh game: standard layout, White to move.
    pub fn new() -> Self {
        Self {
            board: Board::standard(),
            turn: Color::White,
            game_over: false,
        }
    }

    /// A game continuing from an arbitrary position.
    pub fn from_board(board: Board, turn: Color) -> Self {
        Self {
            board,
            turn,
            game_over: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn set_over(&mut self) {
        self.game_over = true;
    }

    /// Legal moves of the piece on `position`, or `None` if the square is
    /// empty. Turn order is not considered.
    pub fn valid_moves(&self, position: Position) -> Option<Vec<ChessMove>> {
        let piece = self.board.piece_at(position)?;
        Some(
            piece_moves(&self.board, position)
                .into_iter()
                .filter(|mv| !leaves_king_in_check(&self.board, *mv, piece))
                .collect(),
        )
    }

    /// Applies `mv` for the side to move.
    ///
    /// When the move leaves the opponent checkmated or stalemated the game is
    /// marked over, so no further moves are accepted.
    pub fn make_move(&mut self, mv: ChessMove) -> Result<(), InvalidMove> {
        if self.game_over {
            return Err(InvalidMove::GameOver);
        }
        let piece = self
            .board
            .piece_at(mv.start)
            .ok_or(InvalidMove::NoPieceAtStart)?;
        if piece.color != self.turn {
            return Err(InvalidMove::WrongTurn);
        }
        let legal = self.valid_moves(mv.start).unwrap_or_default();
        if !legal.contains(&mv) {
            return Err(InvalidMove::IllegalMove);
        }

        apply(&mut self.board, mv, piece);
        self.turn = self.turn.opponent();

        if !self.has_any_valid_moves(self.turn) {
            self.game_over = true;
        }
        Ok(())
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        is_king_in_check(&self.board, color)
    }

    pub fn is_in_checkmate(&self, color: Color) -> bool {
        self.is_in_check(color) && !self.has_any_valid_moves(color)
    }

    /// Only the side to move can be stalemated.
    pub fn is_in_stalemate(&self, color: Color) -> bool {
        self.turn == color && !self.is_in_check(color) && !self.has_any_valid_moves(color)
    }

    pub fn has_any_valid_moves(&self, color: Color) -> bool {
        self.board
            .pieces()
            .filter(|(_, piece)| piece.color == color)
            .any(|(pos, _)| self.valid_moves(pos).is_some_and(|moves| !moves.is_empty()))
    }

    pub fn status(&self) -> GameStatus {
        if self.is_in_checkmate(self.turn) {
            GameStatus::Checkmate
        } else if self.is_in_stalemate(self.turn) {
            GameStatus::Stalemate
        } else if self.game_over {
            GameStatus::Over
        } else if self.is_in_check(self.turn) {
            GameStatus::Check
        } else {
            GameStatus::InProgress
        }
    }
}

/// True when any opposing piece's candidate moves reach `color`'s king. A side
/// without a king is never in check.
pub fn is_king_in_check(board: &Board, color: Color) -> bool {
    let Some(king) = board.find_king(color) else {
        return false;
    };
    board
        .pieces()
        .filter(|(_, piece)| piece.color != color)
        .any(|(pos, _)| piece_moves(board, pos).iter().any(|mv| mv.end == king))
}

fn leaves_king_in_check(board: &Board, mv: ChessMove, piece: Piece) -> bool {
    let mut scratch = board.clone();
    apply(&mut scratch, mv, piece);
    is_king_in_check(&scratch, piece.color)
}

fn apply(board: &mut Board, mv: ChessMove, piece: Piece) {
    let placed = match mv.promotion {
        Some(kind) => Piece::new(piece.color, kind),
        None => piece,
    };
    board.remove_piece(mv.start);
    board.set_piece(mv.end, Some(placed));
}
