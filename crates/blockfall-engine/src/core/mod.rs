pub use self::{board::*, piece::*, rotation::*};

pub(crate) mod board;
pub(crate) mod piece;
pub(crate) mod rotation;

/// Number of columns on the board.
pub const BOARD_WIDTH: usize = 10;
/// Number of rows on the board, including the hidden spawn buffer.
pub const BOARD_HEIGHT: usize = 22;
/// Rows at the top of the board that are above the visible well.
pub const HIDDEN_ROWS: usize = 2;
