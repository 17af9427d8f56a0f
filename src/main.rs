use actix_web::{web, App, HttpServer};
use log::info;
use std::io;
use std::sync::Arc;

use chess_live_server::config::ServerConfig;
use chess_live_server::models::AppState;
use chess_live_server::routes::configure_routes;
use chess_live_server::store::{apply_seed, MemoryAuthStore, MemoryGameStore};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env()?;
    let seed = config.load_seed()?;

    let auth = Arc::new(MemoryAuthStore::new());
    let games = Arc::new(MemoryGameStore::new());
    apply_seed(&seed, &auth, &games)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    info!(
        "Loaded {} user(s) and {} game(s) from seed",
        seed.users.len(),
        seed.games.len()
    );

    // Create shared application state
    let app_state = web::Data::new(AppState::new(auth, games));

    info!("Starting chess server at ws://{}/ws", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(configure_routes)
    })
    .bind(config.bind_addr)?
    .run()
    .await
}
