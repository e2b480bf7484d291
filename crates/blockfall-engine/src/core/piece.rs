use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// Spawn cell shared by every piece kind.
///
/// Row 2 is the first visible row; the two hidden rows above it give the
/// spawn a fallback when the stack reaches the top of the well.
pub const SPAWN_POSITION: PiecePosition = PiecePosition::new(2, 4);

/// Fallback spawn cell tried when [`SPAWN_POSITION`] collides (not used for `I`).
pub const SPAWN_FALLBACK_POSITION: PiecePosition = PiecePosition::new(1, 4);

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// J-piece.
    J = 5,
    /// L-piece.
    L = 6,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All kinds, in the order a fresh bag is filled before shuffling.
    pub const ALL: [PieceKind; PieceKind::LEN] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Display color of the kind, used for locked cells too.
    #[must_use]
    pub const fn color(self) -> Rgb {
        match self {
            PieceKind::I => Rgb::new(0, 255, 255),
            PieceKind::O => Rgb::new(255, 255, 0),
            PieceKind::T => Rgb::new(128, 0, 255),
            PieceKind::S => Rgb::new(0, 192, 0),
            PieceKind::Z => Rgb::new(255, 0, 0),
            PieceKind::J => Rgb::new(64, 64, 255),
            PieceKind::L => Rgb::new(255, 128, 0),
        }
    }

    /// Returns a copy of the catalog shape for the given orientation.
    ///
    /// The returned matrix is a value; mutating a piece never touches the catalog.
    #[must_use]
    pub const fn shape(self, orientation: Orientation) -> ShapeMatrix {
        PIECE_SHAPES[self as usize][orientation.index()]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }
}

/// An RGB color triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Direction of a rotation command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// Orientation of a piece, cyclic in clockwise order starting from the spawn state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Orientation {
    const ALL: [Orientation; 4] = [
        Orientation::Up,
        Orientation::Right,
        Orientation::Down,
        Orientation::Left,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Advances by +1 (clockwise) or +3 (counter-clockwise) modulo 4.
    #[must_use]
    pub const fn rotated(self, direction: RotationDirection) -> Self {
        let step = match direction {
            RotationDirection::Clockwise => 1,
            RotationDirection::CounterClockwise => 3,
        };
        Self::ALL[(self.index() + step) % 4]
    }
}

/// Square occupancy matrix of a piece in one orientation.
///
/// Matrices are 2×2 (`O`), 4×4 (`I`) or 3×3 (everything else), stored in a
/// fixed 4×4 array with only the top-left `size × size` region in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeMatrix {
    size: usize,
    cells: [[bool; 4]; 4],
}

impl Serialize for ShapeMatrix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: ["..#", "###", "..."] ('#' = occupied)
        use serde::ser::SerializeSeq as _;
        let mut seq = serializer.serialize_seq(Some(self.size))?;
        for row in &self.cells[..self.size] {
            let line: String = row[..self.size]
                .iter()
                .map(|&filled| if filled { '#' } else { '.' })
                .collect();
            seq.serialize_element(&line)?;
        }
        seq.end()
    }
}

impl ShapeMatrix {
    const fn new(size: usize, cells: [[bool; 4]; 4]) -> Self {
        assert!(size >= 2 && size <= 4);
        Self { size, cells }
    }

    /// Side length of the matrix (2, 3 or 4).
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.cells[row][col]
    }

    /// Column shift applied when mapping the matrix onto the board.
    ///
    /// 3×3 and 4×4 matrices are shifted one column left so their visual
    /// center lines up with the spawn column; 2×2 matrices are not shifted.
    #[must_use]
    pub const fn column_correction(&self) -> i32 {
        if self.size == 2 { 0 } else { 1 }
    }

    /// Rotates the matrix by 90° (transpose and reverse), keeping its size.
    #[must_use]
    pub const fn rotated(self, direction: RotationDirection) -> Self {
        let last = self.size - 1;
        let mut cells = [[false; 4]; 4];
        let mut i = 0;
        while i < self.size {
            let mut j = 0;
            while j < self.size {
                cells[i][j] = match direction {
                    RotationDirection::Clockwise => self.cells[last - j][i],
                    RotationDirection::CounterClockwise => self.cells[j][last - i],
                };
                j += 1;
            }
            i += 1;
        }
        Self {
            size: self.size,
            cells,
        }
    }

    /// Returns the occupied cells as `(row, col)` offsets from the piece
    /// position, with the column correction already applied.
    #[must_use]
    pub fn cells(&self) -> ArrayVec<(i32, i32), 4> {
        let mut cells = ArrayVec::new();
        let correction = self.column_correction();
        for (row, line) in (0..).zip(&self.cells[..self.size]) {
            for (col, &filled) in (0..).zip(&line[..self.size]) {
                if filled {
                    cells.push((row, col - correction));
                }
            }
        }
        cells
    }
}

/// Position of a piece's shape origin on the board.
///
/// Coordinates are signed: wall kicks can legitimately place the origin one
/// column left of the board (or one row above it) when the matrix has an
/// empty leading column or row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PiecePosition {
    pub row: i32,
    pub col: i32,
}

impl PiecePosition {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    #[must_use]
    pub const fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self::new(self.row + d_row, self.col + d_col)
    }

    #[must_use]
    pub const fn down(self) -> Self {
        self.offset(1, 0)
    }

    #[must_use]
    pub const fn with_row(self, row: i32) -> Self {
        Self::new(row, self.col)
    }
}

/// The piece currently under player control.
///
/// `shape` is kept consistent with `orientation`; `ground_row` caches the
/// lowest row reachable by dropping straight down and is refreshed by the
/// game whenever the shape, column or board changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Piece {
    kind: PieceKind,
    orientation: Orientation,
    shape: ShapeMatrix,
    position: PiecePosition,
    ground_row: i32,
}

impl Piece {
    /// Creates a piece of `kind` in the spawn orientation at [`SPAWN_POSITION`].
    #[must_use]
    pub const fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            orientation: Orientation::Up,
            shape: kind.shape(Orientation::Up),
            position: SPAWN_POSITION,
            ground_row: SPAWN_POSITION.row,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[must_use]
    pub const fn shape(&self) -> &ShapeMatrix {
        &self.shape
    }

    #[must_use]
    pub const fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub const fn ground_row(&self) -> i32 {
        self.ground_row
    }

    /// Board coordinates of the occupied cells.
    #[must_use]
    pub fn occupied_cells(&self) -> ArrayVec<(i32, i32), 4> {
        self.shape
            .cells()
            .into_iter()
            .map(|(row, col)| (self.position.row + row, self.position.col + col))
            .collect()
    }

    /// Board coordinates the piece would occupy at its ground row.
    #[must_use]
    pub fn ghost_cells(&self) -> ArrayVec<(i32, i32), 4> {
        self.with_position(self.position.with_row(self.ground_row))
            .occupied_cells()
    }

    #[must_use]
    pub const fn with_position(self, position: PiecePosition) -> Self {
        Self { position, ..self }
    }

    #[must_use]
    pub(crate) const fn with_ground_row(self, ground_row: i32) -> Self {
        Self { ground_row, ..self }
    }

    /// Returns the piece rotated in place (no kick), with orientation and shape advanced together.
    #[must_use]
    pub const fn rotated(self, direction: RotationDirection) -> Self {
        Self {
            orientation: self.orientation.rotated(direction),
            shape: self.shape.rotated(direction),
            ..self
        }
    }
}

/// Generates all 4 orientations of a piece by rotating the `Up` matrix clockwise.
const fn orientations(up: ShapeMatrix) -> [ShapeMatrix; 4] {
    let mut rotates = [up; 4];
    let mut i = 1;
    while i < 4 {
        rotates[i] = rotates[i - 1].rotated(RotationDirection::Clockwise);
        i += 1;
    }
    rotates
}

// Indexed by `PieceKind as usize`.
const PIECE_SHAPES: [[ShapeMatrix; 4]; PieceKind::LEN] = {
    const C: bool = true;
    const E: bool = false;
    const EEEE: [bool; 4] = [E; 4];
    [
        // I-piece
        orientations(ShapeMatrix::new(4, [EEEE, [C, C, C, C], EEEE, EEEE])),
        // O-piece
        orientations(ShapeMatrix::new(2, [[C, C, E, E], [C, C, E, E], EEEE, EEEE])),
        // T-piece
        orientations(ShapeMatrix::new(3, [[E, C, E, E], [C, C, C, E], EEEE, EEEE])),
        // S-piece
        orientations(ShapeMatrix::new(3, [[E, C, C, E], [C, C, E, E], EEEE, EEEE])),
        // Z-piece
        orientations(ShapeMatrix::new(3, [[C, C, E, E], [E, C, C, E], EEEE, EEEE])),
        // J-piece
        orientations(ShapeMatrix::new(3, [[C, E, E, E], [C, C, C, E], EEEE, EEEE])),
        // L-piece
        orientations(ShapeMatrix::new(3, [[E, E, C, E], [C, C, C, E], EEEE, EEEE])),
    ]
};
