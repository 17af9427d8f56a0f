use serde::{Deserialize, Serialize};

use crate::game::{ChessGame, Color};

pub type GameId = i32;

/// A game as the store keeps it: the seats plus the game itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    pub game_name: String,
    pub white_username: Option<String>,
    pub black_username: Option<String>,
    pub game: ChessGame,
}

impl GameRecord {
    pub fn new(game_id: GameId, game_name: impl Into<String>) -> Self {
        Self {
            game_id,
            game_name: game_name.into(),
            white_username: None,
            black_username: None,
            game: ChessGame::new(),
        }
    }

    pub fn username_for(&self, color: Color) -> Option<&str> {
        match color {
            Color::White => self.white_username.as_deref(),
            Color::Black => self.black_username.as_deref(),
        }
    }

    pub fn seat_mut(&mut self, color: Color) -> &mut Option<String> {
        match color {
            Color::White => &mut self.white_username,
            Color::Black => &mut self.black_username,
        }
    }

    pub fn plays(&self, username: &str, color: Color) -> bool {
        self.username_for(color) == Some(username)
    }

    /// Seats held by `username`; empty for observers. A user may hold both.
    pub fn seats_of(&self, username: &str) -> Vec<Color> {
        [Color::White, Color::Black]
            .into_iter()
            .filter(|color| self.plays(username, *color))
            .collect()
    }

    /// Opens every seat held by `username`. Returns whether anything changed.
    pub fn vacate(&mut self, username: &str) -> bool {
        let seats = self.seats_of(username);
        for color in &seats {
            *self.seat_mut(*color) = None;
        }
        !seats.is_empty()
    }
}
