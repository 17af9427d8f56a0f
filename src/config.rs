use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Server settings, read from the environment at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub seed_file: Option<PathBuf>,
}

/// Fixture loaded into the in-memory stores when `CHESS_SEED_FILE` is set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub games: Vec<SeedGame>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedGame {
    pub name: String,
    #[serde(default)]
    pub white: Option<String>,
    #[serde(default)]
    pub black: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> io::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> io::Result<Self> {
        let raw_addr = lookup("CHESS_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr.parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("CHESS_BIND_ADDR={:?} is not a socket address: {}", raw_addr, e),
            )
        })?;
        let seed_file = lookup("CHESS_SEED_FILE")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bind_addr,
            seed_file,
        })
    }

    /// Reads the seed fixture, or an empty one when none is configured.
    pub fn load_seed(&self) -> io::Result<SeedData> {
        let Some(path) = &self.seed_file else {
            return Ok(SeedData::default());
        };
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("CHESS_SEED_FILE {}: {}", path.display(), e),
            )
        })
    }
}
