use actix::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{AppState, ChessWebSocketMessage, ServerMessage, UserGameCommand};
use crate::websocket::connections::ActorTransport;
use crate::websocket::game_handlers::Requester;

/// WebSocket handler for one client connection
pub struct ChessWebSocket {
    pub id: Uuid,
    pub app_state: web::Data<AppState>,
    /// Token of the last successful CONNECT on this socket.
    pub auth_token: Option<String>,
    requester: Option<Requester>,
}

impl ChessWebSocket {
    pub fn new(app_state: web::Data<AppState>) -> Self {
        Self {
            id: Uuid::new_v4(),
            app_state,
            auth_token: None,
            requester: None,
        }
    }

    fn handle_command(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let command = match serde_json::from_str::<UserGameCommand>(text) {
            Ok(command) => command,
            Err(e) => {
                warn!("Error parsing client message: {}", e);
                let msg = ServerMessage::error(format!("Invalid message format: {}", e));
                if let Ok(msg_str) = serde_json::to_string(&msg) {
                    ctx.text(msg_str);
                }
                return;
            }
        };

        let Some(requester) = &self.requester else {
            warn!("Command on connection {} before it was registered", self.id);
            return;
        };

        info!("Received {} for game {}", command.name(), command.game_id());
        let token = command.auth_token().to_string();
        let is_connect = matches!(command, UserGameCommand::Connect { .. });
        let is_leave = matches!(command, UserGameCommand::Leave { .. });

        if self.app_state.dispatcher.dispatch(command, requester).is_ok() {
            if is_connect {
                self.auth_token = Some(token);
            } else if is_leave && self.auth_token.as_deref() == Some(token.as_str()) {
                self.auth_token = None;
            }
        }
    }
}

impl Actor for ChessWebSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let transport = ActorTransport::new(ctx.address().recipient());
        self.requester = Some(Requester {
            connection_id: self.id,
            transport: Arc::new(transport),
        });

        info!("WebSocket connection started: {}", self.id);
        info!("Total registered connections: {}", self.app_state.registry.len());
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        if let Some(token) = self.auth_token.take() {
            self.app_state.dispatcher.disconnect(&token, self.id);
        }
        info!("WebSocket connection closed: {}", self.id);
        info!("Total registered connections: {}", self.app_state.registry.len());

        Running::Stop
    }
}

impl Handler<ChessWebSocketMessage> for ChessWebSocket {
    type Result = ();

    fn handle(&mut self, msg: ChessWebSocketMessage, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

// WebSocket message handler
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ChessWebSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {}
            Ok(ws::Message::Text(text)) => {
                self.handle_command(text.as_ref(), ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                warn!("Binary messages are not supported");
                if let Some(requester) = &self.requester {
                    requester.reply(&ServerMessage::error("Binary messages are not supported"));
                }
            }
            Ok(ws::Message::Close(reason)) => {
                info!("Connection closed: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            _ => {
                ctx.stop();
            }
        }
    }
}

/// WebSocket connection handler
pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let ws = ChessWebSocket::new(app_state.clone());
    info!("New WebSocket connection: {}", ws.id);

    ws::start(ws, &req, stream)
}
