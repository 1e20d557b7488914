//! CLI command definitions for kanban-board
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod board;

use board::{AddArgs, DeleteArgs, EditArgs, MoveArgs, ShowArgs};
use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Kanban board server and client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Address to bind the server to (overrides config)
    #[arg(long, global = true)]
    pub host: Option<IpAddr>,

    /// Port for the server (overrides config)
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Server URL for client commands (overrides config)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Actor id recorded in audit columns (overrides config)
    #[arg(long, global = true)]
    pub actor: Option<i64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the board server (default if no subcommand given)
    Serve,

    /// Print the board from a running server
    Show(ShowArgs),

    /// Add a task to a column
    Add(AddArgs),

    /// Change a task's description
    Edit(EditArgs),

    /// Delete a task
    Delete(DeleteArgs),

    /// Move a task to another column or slot
    Move(MoveArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Status;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["kanban-board"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log, "2");
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["kanban-board", "serve", "--port", "8080", "-v"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Serve)));
        assert_eq!(cli.port, Some(8080));
        assert!(cli.verbose);
    }

    #[test]
    fn add_parses_column_names() {
        let cli =
            Cli::try_parse_from(["kanban-board", "add", "Write docs", "--column", "in-progress"])
                .unwrap();
        let Some(Command::Add(args)) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.description, "Write docs");
        assert_eq!(args.column, Status::InProgress);
    }

    #[test]
    fn move_requires_column() {
        assert!(Cli::try_parse_from(["kanban-board", "move", "3"]).is_err());
        let cli = Cli::try_parse_from(["kanban-board", "move", "3", "--to", "2", "--index", "0"])
            .unwrap();
        let Some(Command::Move(args)) = cli.command else {
            panic!("expected move");
        };
        assert_eq!((args.id, args.to, args.index), (3, Status::Done, Some(0)));
    }
}
