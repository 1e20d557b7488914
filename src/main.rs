//! Kanban Board
//!
//! Serves a three-column task board over HTTP, and drives a running board
//! from the command line.

use anyhow::Result;
use clap::Parser;
use kanban_board::cli::board::{AddArgs, DeleteArgs, EditArgs, MoveArgs, ShowArgs};
use kanban_board::cli::{Cli, Command};
use kanban_board::client::{Board, HttpBoardApi, Notifier};
use kanban_board::config::{Config, ConfigLoader};
use kanban_board::dashboard::{BoardServer, start_server};
use kanban_board::db::Database;
use kanban_board::format::format_board;
use kanban_board::logging::{self, LogTarget};
use kanban_board::types::ActorId;
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Prints server messages for the client subcommands.
struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&self, message: &str) {
        println!("{}", message);
    }
}

/// Ask on the terminal; anything but y/yes declines.
fn confirm_on_terminal(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut loader = ConfigLoader::load(cli.config.clone())?;
    if let Some(path) = loader.config_path() {
        info!("Using config file {}", path.display());
    }

    // Override settings from CLI arguments
    let config = loader.config_mut();
    if let Some(db_path) = &cli.database {
        config.server.db_path = db_path.clone();
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(url) = &cli.url {
        config.client.base_url = url.clone();
    }
    if let Some(actor) = cli.actor {
        config.server.actor_id = ActorId(actor);
    }
    let config = loader.into_config();

    match cli.command {
        Some(Command::Serve) | None => run_server(config).await?,
        Some(Command::Show(args)) => run_show(&config, args).await?,
        Some(Command::Add(args)) => run_add(&config, args).await?,
        Some(Command::Edit(args)) => run_edit(&config, args).await?,
        Some(Command::Delete(args)) => run_delete(&config, args).await?,
        Some(Command::Move(args)) => run_move(&config, args).await?,
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    config.server.ensure_db_dir()?;
    let db = Arc::new(Database::open(&config.server.db_path)?);
    info!("Database opened at {}", config.server.db_path.display());

    let state = BoardServer::new(db, config.server.actor_id, config.board.soft_delete);
    let handle = start_server(state, config.server.bind_addr()).await?;
    info!("Board available at {}", handle.base_url());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    handle.shutdown().await;
    Ok(())
}

/// Board loaded from the configured server.
async fn load_board(config: &Config) -> Result<Board<HttpBoardApi>> {
    let api = HttpBoardApi::new(
        config.client.base_url.clone(),
        Duration::from_millis(config.client.timeout_ms),
    )
    .with_actor(config.server.actor_id);
    let mut board = Board::new(api).with_notifier(Arc::new(StdoutNotifier));
    board.fetch_tasks().await?;
    Ok(board)
}

async fn run_show(config: &Config, args: ShowArgs) -> Result<()> {
    let board = load_board(config).await?;
    println!("{}", format_board(board.columns(), args.format));
    Ok(())
}

async fn run_add(config: &Config, args: AddArgs) -> Result<()> {
    let mut board = load_board(config).await?;
    board.set_adding(args.column, true);
    board.set_draft(args.column, args.description);
    match board.add_task(args.column).await? {
        Some(task) => println!("#{} {} (position {})", task.id, task.description, task.position),
        None => anyhow::bail!("description must not be blank"),
    }
    Ok(())
}

async fn run_edit(config: &Config, args: EditArgs) -> Result<()> {
    let mut board = load_board(config).await?;
    if !board.edit_task(args.id) {
        anyhow::bail!("task {} is not on the board", args.id);
    }
    board.set_edit_text(args.description);
    if !board.commit_edit().await? {
        println!("Edit cancelled");
    }
    Ok(())
}

async fn run_delete(config: &Config, args: DeleteArgs) -> Result<()> {
    let mut board = load_board(config).await?;
    let deleted = if args.yes {
        board.delete_task(args.id, &|_: &str| true).await?
    } else {
        board.delete_task(args.id, &confirm_on_terminal).await?
    };
    if !deleted {
        println!("Delete cancelled");
    }
    Ok(())
}

async fn run_move(config: &Config, args: MoveArgs) -> Result<()> {
    let mut board = load_board(config).await?;
    let index = match args.index {
        Some(index) => index,
        None => {
            let len = board.column(args.to).tasks.len();
            match board.task(args.id) {
                Some((status, _)) if status == args.to => len.saturating_sub(1),
                _ => len,
            }
        }
    };
    board.start_drag();
    board.move_task(args.id, args.to, index)?;
    board.persist_order().await?;
    println!("{}", format_board(board.columns(), Default::default()));
    Ok(())
}
