pub mod connections;
pub mod game_handlers;
pub mod handler;

pub use connections::{
    send_message, ActorTransport, Connection, ConnectionRegistry, Transport, TransportError,
};
pub use game_handlers::{CommandDispatcher, Requester};
pub use handler::{ws_index, ChessWebSocket};
