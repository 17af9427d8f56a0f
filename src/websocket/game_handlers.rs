use dashmap::DashMap;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

use crate::error::CommandError;
use crate::game::utils::{color_to_string, describe_move, get_game_status};
use crate::game::ChessMove;
use crate::models::{GameId, ServerMessage, UserGameCommand};
use crate::store::{GameStore, IdentityLookup};
use crate::websocket::connections::{send_message, Connection, ConnectionRegistry, Transport};

/// The socket a command arrived on.
#[derive(Clone)]
pub struct Requester {
    pub connection_id: Uuid,
    pub transport: Arc<dyn Transport>,
}

impl Requester {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            connection_id: Uuid::new_v4(),
            transport,
        }
    }

    /// Sends `message` to this socket alone, logging a failed delivery.
    pub fn reply(&self, message: &ServerMessage) {
        if let Err(e) = send_message(self.transport.as_ref(), message) {
            warn!("Reply to connection {} failed: {}", self.connection_id, e);
        }
    }
}

/// One mutex per game id. Holding the guard serializes the whole
/// load, validate, save and broadcast sequence of a command.
#[derive(Default)]
struct GameLocks {
    locks: DashMap<GameId, Arc<Mutex<()>>>,
}

impl GameLocks {
    fn for_game(&self, game_id: GameId) -> Arc<Mutex<()>> {
        self.locks.entry(game_id).or_default().value().clone()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

/// Turns inbound commands into validated state transitions and the messages
/// that follow from them.
pub struct CommandDispatcher {
    identities: Arc<dyn IdentityLookup>,
    games: Arc<dyn GameStore>,
    registry: Arc<ConnectionRegistry>,
    locks: GameLocks,
}

impl CommandDispatcher {
    pub fn new(
        identities: Arc<dyn IdentityLookup>,
        games: Arc<dyn GameStore>,
        registry: Arc<ConnectionRegistry>,
    ) -> Self {
        Self {
            identities,
            games,
            registry,
            locks: GameLocks::default(),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Runs `command`. Any failure is reported to the requester alone as an
    /// `ERROR` message and handed back to the caller.
    pub fn dispatch(&self, command: UserGameCommand, requester: &Requester) -> Result<(), CommandError> {
        let name = command.name();
        let game_id = command.game_id();
        let result = match command {
            UserGameCommand::Connect {
                auth_token,
                game_id,
            } => self.handle_connect(&auth_token, game_id, requester),
            UserGameCommand::MakeMove {
                auth_token,
                game_id,
                chess_move,
            } => self.handle_move(&auth_token, game_id, chess_move),
            UserGameCommand::Leave {
                auth_token,
                game_id,
            } => self.handle_leave(&auth_token, game_id),
            UserGameCommand::Resign {
                auth_token,
                game_id,
            } => self.handle_resign(&auth_token, game_id),
        };

        if let Err(e) = &result {
            warn!("{} on game {} rejected: {}", name, game_id, e);
            requester.reply(&ServerMessage::error(e));
        }
        result
    }

    /// Drops the registry entry of a socket that went away, unless a newer
    /// socket has since connected under the same token.
    pub fn disconnect(&self, auth_token: &str, connection_id: Uuid) {
        if self.registry.remove_if_current(auth_token, connection_id) {
            info!("Connection {} closed and unregistered", connection_id);
        }
    }

    /// Checks the token and the game id, then hands out the game's lock.
    /// Locks exist only for games the store knows about.
    fn lock_for(&self, auth_token: &str, game_id: GameId) -> Result<(String, Arc<Mutex<()>>), CommandError> {
        let username = self.identities.lookup(auth_token)?;
        self.games.load(game_id)?;
        Ok((username, self.locks.for_game(game_id)))
    }

    fn handle_connect(
        &self,
        auth_token: &str,
        game_id: GameId,
        requester: &Requester,
    ) -> Result<(), CommandError> {
        let (username, lock) = self.lock_for(auth_token, game_id)?;
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let record = self.games.load(game_id)?;
        self.registry.add(
            auth_token,
            Connection {
                connection_id: requester.connection_id,
                auth_token: auth_token.to_string(),
                username: username.clone(),
                game_id,
                transport: requester.transport.clone(),
            },
        );
        info!("{} connected to game {}", username, game_id);

        requester.reply(&ServerMessage::LoadGame {
            game: record.game.clone(),
        });

        let role = match record.seats_of(&username).as_slice() {
            [] => "an observer".to_string(),
            [color] => color.to_string(),
            _ => "both colors".to_string(),
        };
        self.registry.broadcast(
            &ServerMessage::notification(format!("{} joined the game as {}", username, role)),
            Some(auth_token),
            game_id,
        );
        Ok(())
    }

    fn handle_move(
        &self,
        auth_token: &str,
        game_id: GameId,
        chess_move: Option<ChessMove>,
    ) -> Result<(), CommandError> {
        let mv = chess_move
            .ok_or_else(|| CommandError::BadRequest("MAKE_MOVE requires a move".to_string()))?;

        let (username, lock) = self.lock_for(auth_token, game_id)?;
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut record = self.games.load(game_id)?;
        if record.game.is_over() {
            return Err(CommandError::GameOver);
        }
        let piece = record
            .game
            .board()
            .piece_at(mv.start)
            .ok_or(CommandError::NoPieceAtStart)?;
        if !record.plays(&username, piece.color) {
            return Err(CommandError::WrongSide);
        }

        record.game.make_move(mv)?;
        self.games.save(game_id, &record)?;
        info!(
            "{} played {} in game {} ({})",
            username,
            mv,
            game_id,
            get_game_status(&record.game)
        );
        debug!("Game {} board: {}", game_id, record.game.board().fen_placement());

        self.registry.broadcast(
            &ServerMessage::LoadGame {
                game: record.game.clone(),
            },
            None,
            game_id,
        );
        self.registry.broadcast(
            &ServerMessage::notification(describe_move(&username, piece.kind, &mv)),
            Some(auth_token),
            game_id,
        );

        let opponent = record.game.turn();
        let opponent_name = record
            .username_for(opponent)
            .map(str::to_string)
            .unwrap_or_else(|| color_to_string(opponent));
        let verdict = if record.game.is_in_checkmate(opponent) {
            Some(format!("{} is in checkmate, {} wins", opponent_name, username))
        } else if record.game.is_in_stalemate(opponent) {
            Some(format!("{} is in stalemate, the game is a draw", opponent_name))
        } else if record.game.is_in_check(opponent) {
            Some(format!("{} is in check", opponent_name))
        } else {
            None
        };
        if let Some(text) = verdict {
            self.registry
                .broadcast(&ServerMessage::notification(text), None, game_id);
        }

        Ok(())
    }

    fn handle_leave(&self, auth_token: &str, game_id: GameId) -> Result<(), CommandError> {
        let (username, lock) = self.lock_for(auth_token, game_id)?;
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut record = self.games.load(game_id)?;
        if record.vacate(&username) {
            self.games.save(game_id, &record)?;
            info!("{} gave up their seat in game {}", username, game_id);
        }
        self.registry.remove(auth_token);
        info!("{} left game {}", username, game_id);

        self.registry.broadcast(
            &ServerMessage::notification(format!("{} left the game", username)),
            Some(auth_token),
            game_id,
        );
        Ok(())
    }

    fn handle_resign(&self, auth_token: &str, game_id: GameId) -> Result<(), CommandError> {
        let (username, lock) = self.lock_for(auth_token, game_id)?;
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut record = self.games.load(game_id)?;
        let Some(&color) = record.seats_of(&username).first() else {
            return Err(CommandError::ObserverCannotResign);
        };
        if record.game.is_over() {
            return Err(CommandError::GameOver);
        }

        record.game.set_over();
        self.games.save(game_id, &record)?;
        info!("{} resigned game {}", username, game_id);

        let winner = record
            .username_for(color.opponent())
            .map(str::to_string)
            .unwrap_or_else(|| color_to_string(color.opponent()));
        self.registry.broadcast(
            &ServerMessage::notification(format!("{} resigned, {} wins", username, winner)),
            None,
            game_id,
        );
        Ok(())
    }
}
