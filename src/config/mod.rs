//! Configuration system.
//!
//! Configuration is read from the first YAML file found along:
//! 1. `--config <path>` or `KANBAN_CONFIG_PATH`
//! 2. `./kanban/config.yaml`
//! 3. `~/.kanban/config.yaml`
//!
//! ## Environment Variables
//! - `KANBAN_DB_PATH` - Database path
//! - `KANBAN_PORT` - Server port
//! - `KANBAN_ACTOR_ID` - Default actor for audit columns
//! - `KANBAN_URL` - Server URL used by the client subcommands

mod loader;
mod types;

pub use loader::{CONFIG_PATH_ENV, ConfigLoader, ConfigPaths};
pub use types::*;
