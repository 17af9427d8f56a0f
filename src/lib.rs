//! Server-side chess for remote players and observers: a rules engine plus
//! the websocket protocol that keeps every participant of a game in sync.

pub mod config;
pub mod error;
pub mod game;
pub mod models;
pub mod routes;
pub mod store;
pub mod websocket;

pub use error::{CommandError, StoreError};
