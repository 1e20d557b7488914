//! HTML templates for the board page.
//!
//! Templates are embedded at compile time using `include_str!`.

/// The board page shell: three columns, rendered client-side from `/tasks`.
pub const BOARD_TEMPLATE: &str = include_str!("templates/board.html");
