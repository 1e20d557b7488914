//! Configuration types and structures.

use crate::types::ActorId;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Default port for the board server.
pub const DEFAULT_PORT: u16 = 31995;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub board: BoardConfig,

    #[serde(default)]
    pub client: ClientConfig,
}

/// Server-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Address to bind (default: 127.0.0.1).
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on (default: 31995).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Actor recorded in audit columns when a request names none.
    #[serde(default)]
    pub actor_id: ActorId,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            host: default_host(),
            port: default_port(),
            actor_id: ActorId::default(),
        }
    }
}

impl ServerConfig {
    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Ensure the database directory exists.
    pub fn ensure_db_dir(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".kanban/board.db")
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Board behavior.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub soft_delete: SoftDeletePolicy,
}

/// How soft-deleted rows take part in position and id lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftDeletePolicy {
    /// Count soft-deleted rows when computing the next position in a column
    /// (default: false).
    #[serde(default)]
    pub count_deleted_positions: bool,

    /// Let update and delete resolve ids of soft-deleted rows (default: true).
    /// With this set, deleting a task twice succeeds both times.
    #[serde(default = "default_match_deleted_by_id")]
    pub match_deleted_by_id: bool,
}

impl Default for SoftDeletePolicy {
    fn default() -> Self {
        Self {
            count_deleted_positions: false,
            match_deleted_by_id: default_match_deleted_by_id(),
        }
    }
}

fn default_match_deleted_by_id() -> bool {
    true
}

/// Settings for the board client subcommands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of a running board server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds (default: 10000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_base_url() -> String {
    format!("http://127.0.0.1:{}", DEFAULT_PORT)
}

fn default_timeout_ms() -> u64 {
    10_000
}
