use serde::Serialize;

/// Base points for clearing 1-4 lines at once (index = number of lines).
///
/// Singles are worth a flat 100; doubles, triples and quads are multiplied
/// by the level in effect before the clear.
const SCORE_TABLE: [usize; 5] = [0, 100, 300, 500, 800];

/// Points awarded for clearing `lines` rows at once while at `level`.
#[must_use]
pub fn line_clear_points(lines: usize, level: usize) -> usize {
    match lines {
        0 => 0,
        1 => SCORE_TABLE[1],
        n => SCORE_TABLE[n.min(4)] * level,
    }
}

/// Game statistics tracking score, lines cleared, and piece count.
///
/// - **Score**: line clear points plus soft/hard drop points; never decreases
/// - **Level**: derived from total lines cleared, starting at 1
/// - **Completed pieces**: total number of pieces locked
/// - **Line clear distribution**: count of single, double, triple, quad clears
///
/// # Example
///
/// ```
/// use blockfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_line_clear(4); // four lines at level 1
///
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    score: usize,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    /// Creates a new game statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Returns the current level: one level per 10 lines cleared, starting at 1.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.total_cleared_lines / 10 + 1
    }

    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of line clears by count.
    ///
    /// Index 0 counts locks that cleared nothing; 1-4 count singles through quads.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Adds points earned by soft or hard dropping.
    pub const fn add_drop_points(&mut self, points: usize) {
        self.score += points;
    }

    /// Records a locked piece that cleared no lines.
    pub const fn complete_piece_lock(&mut self) {
        self.completed_pieces += 1;
        self.line_cleared_counter[0] += 1;
    }

    /// Records a finished line clear and returns the points it awarded.
    ///
    /// The locked piece that caused the clear is counted here as well.
    /// Scoring uses the level from before the cleared lines are added.
    pub fn complete_line_clear(&mut self, cleared_lines: usize) -> usize {
        let points = line_clear_points(cleared_lines, self.level());
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        if cleared_lines < self.line_cleared_counter.len() {
            self.line_cleared_counter[cleared_lines] += 1;
        }
        self.score += points;
        points
    }
}
