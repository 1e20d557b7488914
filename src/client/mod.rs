//! Board client: the state a board UI works against, and the API it calls.

mod api;
mod http;
mod state;

pub use api::{BoardApi, ClientError};
pub use http::HttpBoardApi;
pub use state::{
    Board, BoardColumn, Confirm, DELETE_PROMPT, EditSession, Notifier, TracingNotifier, partition,
};
