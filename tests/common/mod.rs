#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chess_live_server::error::StoreError;
use chess_live_server::game::{ChessGame, ChessMove, Color, Position};
use chess_live_server::models::{GameId, GameRecord, ServerMessage, UserGameCommand};
use chess_live_server::store::{GameStore, MemoryAuthStore, MemoryGameStore};
use chess_live_server::websocket::{CommandDispatcher, ConnectionRegistry, Requester, Transport, TransportError};
use chess_live_server::CommandError;

pub fn pos(square: &str) -> Position {
    Position::from_algebraic(square).expect("valid square")
}

pub fn mv(text: &str) -> ChessMove {
    ChessMove::from_long_algebraic(text).expect("valid move")
}

/// Plays `moves` from the starting position, panicking on the first rejection.
pub fn play(moves: &[&str]) -> ChessGame {
    let mut game = ChessGame::new();
    for text in moves {
        game.make_move(mv(text))
            .unwrap_or_else(|e| panic!("{} rejected: {}", text, e));
    }
    game
}

/// Transport that keeps every frame it is handed, decoded.
#[derive(Default)]
pub struct Recorder {
    sent: Mutex<Vec<ServerMessage>>,
    closed: AtomicBool,
}

impl Transport for Recorder {
    fn send(&self, text: &str) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        let message = serde_json::from_str(text).expect("server sent valid JSON");
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    fn is_open(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }
}

impl Recorder {
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Drains everything received so far.
    pub fn take(&self) -> Vec<ServerMessage> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }
}

/// Game store whose saves can be switched off.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryGameStore,
    pub fail_saves: AtomicBool,
}

impl GameStore for FlakyStore {
    fn load(&self, game_id: GameId) -> Result<GameRecord, StoreError> {
        self.inner.load(game_id)
    }

    fn save(&self, game_id: GameId, record: &GameRecord) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("disk on fire".to_string()));
        }
        self.inner.save(game_id, record)
    }
}

pub struct Client {
    pub username: String,
    pub token: String,
    pub requester: Requester,
    pub recorder: Arc<Recorder>,
}

impl Client {
    pub fn take(&self) -> Vec<ServerMessage> {
        self.recorder.take()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.take()
            .into_iter()
            .filter_map(|msg| match msg {
                ServerMessage::Notification { message } => Some(message),
                _ => None,
            })
            .collect()
    }
}

/// One game with alice seated as White, bob as Black and carol watching.
pub struct Table {
    pub auth: Arc<MemoryAuthStore>,
    pub store: Arc<FlakyStore>,
    pub registry: Arc<ConnectionRegistry>,
    pub dispatcher: CommandDispatcher,
    pub game_id: GameId,
    pub alice: Client,
    pub bob: Client,
    pub carol: Client,
}

impl Table {
    pub fn new() -> Self {
        let auth = Arc::new(MemoryAuthStore::new());
        let store = Arc::new(FlakyStore::default());
        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher = CommandDispatcher::new(auth.clone(), store.clone(), registry.clone());

        let game_id = store.inner.create_game("table").unwrap();
        store.inner.join_game(game_id, "alice", Some(Color::White)).unwrap();
        store.inner.join_game(game_id, "bob", Some(Color::Black)).unwrap();

        let alice = new_client(&auth, "alice");
        let bob = new_client(&auth, "bob");
        let carol = new_client(&auth, "carol");

        Self {
            auth,
            store,
            registry,
            dispatcher,
            game_id,
            alice,
            bob,
            carol,
        }
    }

    /// Connects all three clients and drains the join traffic.
    pub fn seated() -> Self {
        let table = Self::new();
        for client in [&table.alice, &table.bob, &table.carol] {
            table.connect(client).unwrap();
        }
        for client in [&table.alice, &table.bob, &table.carol] {
            client.take();
        }
        table
    }

    pub fn connect(&self, client: &Client) -> Result<(), CommandError> {
        self.dispatcher.dispatch(
            UserGameCommand::Connect {
                auth_token: client.token.clone(),
                game_id: self.game_id,
            },
            &client.requester,
        )
    }

    pub fn play(&self, client: &Client, text: &str) -> Result<(), CommandError> {
        self.dispatcher.dispatch(
            UserGameCommand::MakeMove {
                auth_token: client.token.clone(),
                game_id: self.game_id,
                chess_move: Some(mv(text)),
            },
            &client.requester,
        )
    }

    pub fn leave(&self, client: &Client) -> Result<(), CommandError> {
        self.dispatcher.dispatch(
            UserGameCommand::Leave {
                auth_token: client.token.clone(),
                game_id: self.game_id,
            },
            &client.requester,
        )
    }

    pub fn resign(&self, client: &Client) -> Result<(), CommandError> {
        self.dispatcher.dispatch(
            UserGameCommand::Resign {
                auth_token: client.token.clone(),
                game_id: self.game_id,
            },
            &client.requester,
        )
    }

    pub fn record(&self) -> GameRecord {
        self.store.inner.load(self.game_id).unwrap()
    }
}

pub fn new_client(auth: &MemoryAuthStore, username: &str) -> Client {
    let recorder = Arc::new(Recorder::default());
    Client {
        username: username.to_string(),
        token: auth.create_auth(username).unwrap(),
        requester: Requester::new(recorder.clone()),
        recorder,
    }
}
