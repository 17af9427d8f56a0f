//! Registry of live websocket connections and fan-out to the connections of
//! one game.

use actix::Recipient;
use dashmap::DashMap;
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ChessWebSocketMessage, GameId, ServerMessage};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,
    #[error("message could not be encoded: {0}")]
    Encode(String),
}

/// Outbound half of a client connection.
pub trait Transport: Send + Sync {
    fn send(&self, text: &str) -> Result<(), TransportError>;
    fn is_open(&self) -> bool;
}

/// Delivers text frames through the mailbox of a websocket actor.
pub struct ActorTransport {
    recipient: Recipient<ChessWebSocketMessage>,
}

impl ActorTransport {
    pub fn new(recipient: Recipient<ChessWebSocketMessage>) -> Self {
        Self { recipient }
    }
}

impl Transport for ActorTransport {
    fn send(&self, text: &str) -> Result<(), TransportError> {
        if !self.recipient.connected() {
            return Err(TransportError::Closed);
        }
        // `do_send` ignores the mailbox capacity.
        self.recipient.do_send(ChessWebSocketMessage(text.to_string()));
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.recipient.connected()
    }
}

/// A participant attached to a game.
#[derive(Clone)]
pub struct Connection {
    /// Distinguishes successive sockets registered under the same token.
    pub connection_id: Uuid,
    pub auth_token: String,
    pub username: String,
    pub game_id: GameId,
    pub transport: Arc<dyn Transport>,
}

fn encode<T: Serialize>(value: &T) -> Result<String, TransportError> {
    serde_json::to_string(value).map_err(|e| TransportError::Encode(e.to_string()))
}

/// Serializes `message` and writes it to a single transport.
pub fn send_message(transport: &dyn Transport, message: &ServerMessage) -> Result<(), TransportError> {
    let text = encode(message).map_err(|e| {
        warn!("Error serializing {} message: {}", message.kind(), e);
        e
    })?;
    transport.send(&text)
}

/// Live connections keyed by auth token.
///
/// Built once at start-up and shared through [`crate::models::AppState`].
/// Backed by a sharded concurrent map so adds and removes from many sockets
/// never wait on a broadcast in progress.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<String, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `connection`, replacing any previous one for the same token.
    pub fn add(&self, auth_token: &str, connection: Connection) {
        if let Some(previous) = self.connections.insert(auth_token.to_string(), connection) {
            info!(
                "Replaced connection {} for {} (game {})",
                previous.connection_id, previous.username, previous.game_id
            );
        }
    }

    pub fn remove(&self, auth_token: &str) -> Option<Connection> {
        self.connections.remove(auth_token).map(|(_, conn)| conn)
    }

    /// Removes the entry for `auth_token` only while it still belongs to
    /// `connection_id`.
    pub fn remove_if_current(&self, auth_token: &str, connection_id: Uuid) -> bool {
        self.connections
            .remove_if(auth_token, |_, conn| conn.connection_id == connection_id)
            .is_some()
    }

    pub fn get(&self, auth_token: &str) -> Option<Connection> {
        self.connections.get(auth_token).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Tokens registered on `game_id`, sorted.
    pub fn connections_for(&self, game_id: GameId) -> Vec<String> {
        let mut tokens: Vec<String> = self
            .connections
            .iter()
            .filter(|entry| entry.game_id == game_id)
            .map(|entry| entry.key().clone())
            .collect();
        tokens.sort();
        tokens
    }

    /// Sends `message` to every connection on `game_id` except `exclude`.
    ///
    /// Connections found closed, or whose send fails, are dropped from the
    /// registry once the sweep is over; the remaining recipients are still
    /// served. Returns how many connections the message reached.
    pub fn broadcast(&self, message: &ServerMessage, exclude: Option<&str>, game_id: GameId) -> usize {
        let text = match encode(message) {
            Ok(text) => text,
            Err(e) => {
                warn!("Error serializing {} message: {}", message.kind(), e);
                return 0;
            }
        };

        let mut dead: Vec<(String, Uuid)> = Vec::new();
        let mut targets: Vec<(String, Uuid, Arc<dyn Transport>)> = Vec::new();

        // Collect recipients first so no shard lock is held while sending.
        for entry in self.connections.iter() {
            let conn = entry.value();
            if !conn.transport.is_open() {
                dead.push((entry.key().clone(), conn.connection_id));
            } else if conn.game_id == game_id && exclude != Some(entry.key().as_str()) {
                targets.push((entry.key().clone(), conn.connection_id, conn.transport.clone()));
            }
        }

        let mut delivered = 0;
        for (token, connection_id, transport) in targets {
            match transport.send(&text) {
                Ok(()) => {
                    debug!("Sent {} to connection {}", message.kind(), connection_id);
                    delivered += 1;
                }
                Err(e) => {
                    warn!("Send to connection {} failed: {}", connection_id, e);
                    dead.push((token, connection_id));
                }
            }
        }

        for (token, connection_id) in dead {
            if self.remove_if_current(&token, connection_id) {
                info!("Dropped dead connection {}", connection_id);
            }
        }

        info!(
            "Broadcast {} to {} connection(s) of game {}",
            message.kind(),
            delivered,
            game_id
        );
        delivered
    }
}
