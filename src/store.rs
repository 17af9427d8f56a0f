//! Collaborators the session core talks to: token lookup and game storage.
//!
//! The traits are the seam; the in-memory implementations back the binary
//! and the tests.

use log::info;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::config::SeedData;
use crate::error::StoreError;
use crate::game::Color;
use crate::models::{GameId, GameRecord};

pub trait IdentityLookup: Send + Sync {
    /// Username behind `auth_token`.
    fn lookup(&self, auth_token: &str) -> Result<String, StoreError>;
}

pub trait GameStore: Send + Sync {
    fn load(&self, game_id: GameId) -> Result<GameRecord, StoreError>;
    fn save(&self, game_id: GameId, record: &GameRecord) -> Result<(), StoreError>;
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
}

#[derive(Default)]
pub struct MemoryAuthStore {
    tokens: Mutex<HashMap<String, String>>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh token for `username`.
    pub fn create_auth(&self, username: &str) -> Result<String, StoreError> {
        let token = Uuid::new_v4().to_string();
        self.insert_auth(&token, username)?;
        Ok(token)
    }

    pub fn insert_auth(&self, token: &str, username: &str) -> Result<(), StoreError> {
        lock(&self.tokens)?.insert(token.to_string(), username.to_string());
        Ok(())
    }

    pub fn delete_auth(&self, token: &str) -> Result<(), StoreError> {
        lock(&self.tokens)?
            .remove(token)
            .map(|_| ())
            .ok_or(StoreError::Unauthorized)
    }
}

impl IdentityLookup for MemoryAuthStore {
    fn lookup(&self, auth_token: &str) -> Result<String, StoreError> {
        lock(&self.tokens)?
            .get(auth_token)
            .cloned()
            .ok_or(StoreError::Unauthorized)
    }
}

pub struct MemoryGameStore {
    games: Mutex<HashMap<GameId, GameRecord>>,
    next_id: AtomicI32,
}

impl Default for MemoryGameStore {
    fn default() -> Self {
        Self {
            games: Mutex::new(HashMap::new()),
            next_id: AtomicI32::new(1),
        }
    }
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_game(&self, game_name: &str) -> Result<GameId, StoreError> {
        let game_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        lock(&self.games)?.insert(game_id, GameRecord::new(game_id, game_name));
        Ok(game_id)
    }

    /// All games ordered by id.
    pub fn list_games(&self) -> Result<Vec<GameRecord>, StoreError> {
        let mut games: Vec<GameRecord> = lock(&self.games)?.values().cloned().collect();
        games.sort_by_key(|record| record.game_id);
        Ok(games)
    }

    /// Seats `username` as `color`. Joining without a color (as an observer)
    /// only checks that the game exists.
    pub fn join_game(
        &self,
        game_id: GameId,
        username: &str,
        color: Option<Color>,
    ) -> Result<(), StoreError> {
        let mut games = lock(&self.games)?;
        let record = games
            .get_mut(&game_id)
            .ok_or(StoreError::NotFound(game_id))?;
        let Some(color) = color else {
            return Ok(());
        };
        let seat = record.seat_mut(color);
        if seat.is_some() {
            return Err(StoreError::SeatTaken);
        }
        *seat = Some(username.to_string());
        Ok(())
    }
}

impl GameStore for MemoryGameStore {
    fn load(&self, game_id: GameId) -> Result<GameRecord, StoreError> {
        lock(&self.games)?
            .get(&game_id)
            .cloned()
            .ok_or(StoreError::NotFound(game_id))
    }

    fn save(&self, game_id: GameId, record: &GameRecord) -> Result<(), StoreError> {
        let mut games = lock(&self.games)?;
        match games.get_mut(&game_id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(game_id)),
        }
    }
}

/// Loads fixture users and games into fresh stores.
pub fn apply_seed(
    seed: &SeedData,
    auth: &MemoryAuthStore,
    games: &MemoryGameStore,
) -> Result<(), StoreError> {
    for user in &seed.users {
        auth.insert_auth(&user.token, &user.username)?;
    }
    for game in &seed.games {
        let game_id = games.create_game(&game.name)?;
        if let Some(white) = &game.white {
            games.join_game(game_id, white, Some(Color::White))?;
        }
        if let Some(black) = &game.black {
            games.join_game(game_id, black, Some(Color::Black))?;
        }
        info!("Seeded game {} ({})", game_id, game.name);
    }
    Ok(())
}
