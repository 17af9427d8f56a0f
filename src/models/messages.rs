use actix::Message;
use serde::{Deserialize, Serialize};

use crate::game::{ChessGame, ChessMove};
use crate::models::GameId;

/// Command sent from client to server, tagged by `commandType`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "commandType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserGameCommand {
    Connect {
        #[serde(rename = "authToken")]
        auth_token: String,
        #[serde(rename = "gameID")]
        game_id: GameId,
    },
    MakeMove {
        #[serde(rename = "authToken")]
        auth_token: String,
        #[serde(rename = "gameID")]
        game_id: GameId,
        #[serde(rename = "move", default)]
        chess_move: Option<ChessMove>,
    },
    Leave {
        #[serde(rename = "authToken")]
        auth_token: String,
        #[serde(rename = "gameID")]
        game_id: GameId,
    },
    Resign {
        #[serde(rename = "authToken")]
        auth_token: String,
        #[serde(rename = "gameID")]
        game_id: GameId,
    },
}

impl UserGameCommand {
    pub fn auth_token(&self) -> &str {
        match self {
            UserGameCommand::Connect { auth_token, .. }
            | UserGameCommand::MakeMove { auth_token, .. }
            | UserGameCommand::Leave { auth_token, .. }
            | UserGameCommand::Resign { auth_token, .. } => auth_token,
        }
    }

    pub fn game_id(&self) -> GameId {
        match self {
            UserGameCommand::Connect { game_id, .. }
            | UserGameCommand::MakeMove { game_id, .. }
            | UserGameCommand::Leave { game_id, .. }
            | UserGameCommand::Resign { game_id, .. } => *game_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UserGameCommand::Connect { .. } => "CONNECT",
            UserGameCommand::MakeMove { .. } => "MAKE_MOVE",
            UserGameCommand::Leave { .. } => "LEAVE",
            UserGameCommand::Resign { .. } => "RESIGN",
        }
    }
}

/// Message sent from server to client, tagged by `serverMessageType`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "serverMessageType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    LoadGame { game: ChessGame },
    Notification { message: String },
    Error { message: String },
}

impl ServerMessage {
    pub fn notification(message: impl Into<String>) -> Self {
        ServerMessage::Notification {
            message: message.into(),
        }
    }

    /// Error text always carries the `Error: ` prefix clients look for.
    pub fn error(message: impl std::fmt::Display) -> Self {
        ServerMessage::Error {
            message: format!("Error: {}", message),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::LoadGame { .. } => "LOAD_GAME",
            ServerMessage::Notification { .. } => "NOTIFICATION",
            ServerMessage::Error { .. } => "ERROR",
        }
    }
}

/// Message type for WebSocket communication
#[derive(Message)]
#[rtype(result = "()")]
pub struct ChessWebSocketMessage(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Position;
    use serde_json::{json, Value};

    #[test]
    fn parses_connect() {
        let cmd: UserGameCommand =
            serde_json::from_str(r#"{"commandType":"CONNECT","authToken":"abc","gameID":3}"#)
                .unwrap();
        assert_eq!(
            cmd,
            UserGameCommand::Connect {
                auth_token: "abc".to_string(),
                game_id: 3
            }
        );
        assert_eq!(cmd.name(), "CONNECT");
    }

    #[test]
    fn parses_make_move_with_and_without_move() {
        let text = r#"{"commandType":"MAKE_MOVE","authToken":"t","gameID":1,
            "move":{"start":{"row":7,"column":1},"end":{"row":8,"column":1},"promotion":"QUEEN"}}"#;
        let cmd: UserGameCommand = serde_json::from_str(text).unwrap();
        match cmd {
            UserGameCommand::MakeMove {
                chess_move: Some(mv),
                ..
            } => {
                assert_eq!(mv.start, Position::new(7, 1).unwrap());
                assert_eq!(mv.promotion, Some(crate::game::PieceKind::Queen));
            }
            other => panic!("unexpected command {:?}", other),
        }

        let bare: UserGameCommand =
            serde_json::from_str(r#"{"commandType":"MAKE_MOVE","authToken":"t","gameID":1}"#)
                .unwrap();
        assert!(matches!(
            bare,
            UserGameCommand::MakeMove {
                chess_move: None,
                ..
            }
        ));
    }

    #[test]
    fn rejects_unknown_command_type() {
        let res = serde_json::from_str::<UserGameCommand>(
            r#"{"commandType":"DANCE","authToken":"t","gameID":1}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn server_messages_are_tagged() {
        let note = serde_json::to_value(ServerMessage::notification("hi")).unwrap();
        assert_eq!(
            note,
            json!({"serverMessageType": "NOTIFICATION", "message": "hi"})
        );

        let err = serde_json::to_value(ServerMessage::error("game is over")).unwrap();
        assert_eq!(err["message"], Value::from("Error: game is over"));

        let load = serde_json::to_value(ServerMessage::LoadGame {
            game: ChessGame::new(),
        })
        .unwrap();
        assert_eq!(load["serverMessageType"], "LOAD_GAME");
        assert_eq!(load["game"]["turn"], "WHITE");
        assert_eq!(load["game"]["gameOver"], false);
        assert_eq!(load["game"]["board"]["squares"][0][4]["kind"], "KING");

        let back: ServerMessage = serde_json::from_value(load).unwrap();
        assert_eq!(back.kind(), "LOAD_GAME");
    }
}
