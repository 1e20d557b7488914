//! Board HTTP server module.
//!
//! Serves the board page and the JSON task API.

mod server;
pub mod templates;

pub use server::{ACTOR_HEADER, Actor, BoardHandle, BoardServer, build_router, start_server};
