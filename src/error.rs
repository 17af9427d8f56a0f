use thiserror::Error;

use crate::game::InvalidMove;
use crate::models::GameId;

/// Failures of the identity and game-store collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("game {0} not found")]
    NotFound(GameId),
    #[error("color already taken")]
    SeatTaken,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Why a websocket command was rejected. Rendered into the `ERROR` message
/// sent back to the requester.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("game {0} not found")]
    NotFound(GameId),
    #[error("not your turn")]
    WrongTurn,
    #[error("that piece is not on your team")]
    WrongSide,
    #[error("illegal move")]
    IllegalMove,
    #[error("no piece at start position")]
    NoPieceAtStart,
    #[error("game is over")]
    GameOver,
    #[error("observers cannot resign")]
    ObserverCannotResign,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<InvalidMove> for CommandError {
    fn from(err: InvalidMove) -> Self {
        match err {
            InvalidMove::NoPieceAtStart => CommandError::NoPieceAtStart,
            InvalidMove::WrongTurn => CommandError::WrongTurn,
            InvalidMove::IllegalMove => CommandError::IllegalMove,
            InvalidMove::GameOver => CommandError::GameOver,
        }
    }
}

impl From<StoreError> for CommandError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unauthorized => CommandError::Unauthorized,
            StoreError::NotFound(id) => CommandError::NotFound(id),
            other => CommandError::Storage(other.to_string()),
        }
    }
}
