pub mod board;
pub mod moves;
pub mod rules;
pub mod utils;

pub use board::{Board, Color, Piece, PieceKind, Position};
pub use moves::{piece_moves, ChessMove};
pub use rules::{is_king_in_check, ChessGame, GameStatus, InvalidMove};
