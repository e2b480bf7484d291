use std::ops::RangeInclusive;

use arrayvec::ArrayVec;
use serde::Serialize;

use super::{
    BOARD_HEIGHT, BOARD_WIDTH, HIDDEN_ROWS,
    piece::{Piece, PieceKind, PiecePosition, Rgb, ShapeMatrix},
};

/// A single cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Block {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell filled by a locked piece of a specific kind.
    Filled(PieceKind),
}

impl Block {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Block::Empty
    }

    #[must_use]
    pub fn kind(self) -> Option<PieceKind> {
        match self {
            Block::Empty => None,
            Block::Filled(kind) => Some(kind),
        }
    }

    /// Color of the locked piece occupying this cell.
    #[must_use]
    pub fn color(self) -> Option<Rgb> {
        self.kind().map(PieceKind::color)
    }

    const fn as_char(self) -> char {
        match self {
            Block::Empty => '.',
            Block::Filled(kind) => kind.as_char(),
        }
    }
}

/// One board row.
pub type BoardRow = [Block; BOARD_WIDTH];

/// The playfield: 22 rows × 10 columns, rows 0 and 1 hidden above the well.
///
/// The dimensions never change; rows are filled when a piece locks and
/// removed (with empty rows inserted on top) when lines are cleared.
///
/// Every geometric query is total: coordinates outside the grid count as
/// collisions rather than being an error.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, Orientation, PieceKind, PiecePosition};
///
/// let board = Board::EMPTY;
/// let shape = PieceKind::O.shape(Orientation::Up);
/// assert!(!board.collides(PiecePosition::new(20, 0), &shape));
/// assert!(board.collides(PiecePosition::new(21, 0), &shape));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: [BoardRow; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: one string per row, "..IIII...." ('.' = empty, letter = locked kind)
        use serde::ser::SerializeSeq as _;
        let mut seq = serializer.serialize_seq(Some(BOARD_HEIGHT))?;
        for row in &self.rows {
            let line: String = row.iter().map(|block| block.as_char()).collect();
            seq.serialize_element(&line)?;
        }
        seq.end()
    }
}

impl Board {
    pub const EMPTY: Self = Self {
        rows: [[Block::Empty; BOARD_WIDTH]; BOARD_HEIGHT],
    };

    /// Lowest row index of the board.
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const BOTTOM_ROW: i32 = BOARD_HEIGHT as i32 - 1;

    #[must_use]
    pub fn rows(&self) -> &[BoardRow; BOARD_HEIGHT] {
        &self.rows
    }

    /// Rows of the visible well (excludes the hidden spawn buffer).
    pub fn visible_rows(&self) -> impl Iterator<Item = &BoardRow> {
        self.rows[HIDDEN_ROWS..].iter()
    }

    /// Colors of the visible well, `None` for empty cells.
    #[must_use]
    pub fn visible_colors(&self) -> Vec<[Option<Rgb>; BOARD_WIDTH]> {
        self.visible_rows()
            .map(|row| row.map(Block::color))
            .collect()
    }

    /// Converts signed board coordinates to indices, or `None` when outside the grid.
    #[must_use]
    pub fn index_of(row: i32, col: i32) -> Option<(usize, usize)> {
        let row = usize::try_from(row).ok().filter(|&r| r < BOARD_HEIGHT)?;
        let col = usize::try_from(col).ok().filter(|&c| c < BOARD_WIDTH)?;
        Some((row, col))
    }

    /// Returns the block at the given coordinates, or `None` when outside the grid.
    #[must_use]
    pub fn block_at(&self, row: i32, col: i32) -> Option<Block> {
        let (row, col) = Self::index_of(row, col)?;
        Some(self.rows[row][col])
    }

    /// Sets a single cell.
    ///
    /// Used to build board situations directly; coordinates outside the grid are ignored.
    pub fn fill_block_at(&mut self, row: i32, col: i32, block: Block) {
        if let Some((row, col)) = Self::index_of(row, col) {
            self.rows[row][col] = block;
        }
    }

    /// Checks whether `shape` placed at `position` leaves the board or overlaps a filled cell.
    #[must_use]
    pub fn collides(&self, position: PiecePosition, shape: &ShapeMatrix) -> bool {
        shape.cells().into_iter().any(|(d_row, d_col)| {
            self.block_at(position.row + d_row, position.col + d_col)
                .is_none_or(|block| !block.is_empty())
        })
    }

    /// Lowest row the shape reaches by dropping straight down from `position`.
    ///
    /// If `position` itself collides, the row above it is returned.
    #[must_use]
    pub fn ground_row(&self, position: PiecePosition, shape: &ShapeMatrix) -> i32 {
        (position.row..=Self::BOTTOM_ROW)
            .find(|&row| self.collides(position.with_row(row), shape))
            .map_or(Self::BOTTOM_ROW, |row| row - 1)
    }

    /// Writes the piece's in-bounds cells into the board.
    ///
    /// Returns the range of rows that were touched, or `None` if every cell
    /// was outside the grid.
    pub fn fill_piece(&mut self, piece: &Piece) -> Option<RangeInclusive<usize>> {
        let mut affected: Option<RangeInclusive<usize>> = None;
        for (row, col) in piece.occupied_cells() {
            let Some((row, col)) = Self::index_of(row, col) else {
                continue;
            };
            self.rows[row][col] = Block::Filled(piece.kind());
            affected = Some(match affected {
                None => row..=row,
                Some(range) => (*range.start()).min(row)..=(*range.end()).max(row),
            });
        }
        affected
    }

    /// Checks if every column of the row is filled.
    #[must_use]
    pub fn is_row_full(&self, row: usize) -> bool {
        self.rows[row].iter().all(|block| !block.is_empty())
    }

    /// Returns the full rows within `rows`, in ascending order.
    ///
    /// Only the rows a locked piece touched can become full, so callers pass
    /// that range rather than scanning the whole board.
    #[must_use]
    pub fn full_rows_in(&self, rows: RangeInclusive<usize>) -> ArrayVec<usize, 4> {
        let end = (*rows.end()).min(BOARD_HEIGHT - 1);
        (*rows.start()..=end)
            .filter(|&row| self.is_row_full(row))
            .take(4)
            .collect()
    }

    /// Removes the given rows and inserts the same number of empty rows on top.
    pub fn remove_rows(&mut self, rows: &[usize]) {
        let mut compacted = [[Block::Empty; BOARD_WIDTH]; BOARD_HEIGHT];
        let mut dest = BOARD_HEIGHT;
        for row in (0..BOARD_HEIGHT).rev() {
            if rows.contains(&row) {
                continue;
            }
            dest -= 1;
            compacted[dest] = self.rows[row];
        }
        self.rows = compacted;
    }
}
