//! Client subcommands that drive a running board server.

use crate::format::OutputFormat;
use crate::types::Status;
use clap::Args;

/// Arguments for the show subcommand
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,
}

/// Arguments for the add subcommand
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Task description (max 255 characters)
    pub description: String,

    /// Column: 0/todo, 1/in-progress, 2/done
    #[arg(long, default_value = "todo")]
    pub column: Status,
}

/// Arguments for the edit subcommand
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Task id
    pub id: i64,

    /// New description
    pub description: String,
}

/// Arguments for the delete subcommand
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Task id
    pub id: i64,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the move subcommand
#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Task id
    pub id: i64,

    /// Destination column: 0/todo, 1/in-progress, 2/done
    #[arg(long)]
    pub to: Status,

    /// Slot in the destination column (default: end)
    #[arg(long)]
    pub index: Option<usize>,
}
