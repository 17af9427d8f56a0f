use std::sync::Arc;

use crate::store::{GameStore, IdentityLookup};
use crate::websocket::connections::ConnectionRegistry;
use crate::websocket::game_handlers::CommandDispatcher;

/// Application state shared between connections
pub struct AppState {
    pub registry: Arc<ConnectionRegistry>,
    pub dispatcher: CommandDispatcher,
}

impl AppState {
    /// Wires a fresh connection registry into a dispatcher over the given
    /// collaborators.
    pub fn new(identities: Arc<dyn IdentityLookup>, games: Arc<dyn GameStore>) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher = CommandDispatcher::new(identities, games, registry.clone());
        Self {
            registry,
            dispatcher,
        }
    }
}
