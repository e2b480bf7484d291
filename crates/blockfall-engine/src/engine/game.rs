use std::{collections::VecDeque, time::Duration};

use arrayvec::ArrayVec;
use rand::Rng as _;
use serde::Serialize;

use crate::{
    CommandError,
    core::{
        board::Board,
        piece::{Piece, PieceKind, RotationDirection, SPAWN_FALLBACK_POSITION},
        rotation::resolve_rotation,
    },
};

use super::{
    command::Command,
    game_stats::GameStats,
    piece_bag::{PieceBag, PieceSeed},
    timing::{self, LINE_CLEAR_DELAY, LOCK_DELAY},
};

/// Number of upcoming pieces shown in the next queue.
pub const NEXT_QUEUE_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    GameOver,
}

/// Rows waiting to be removed once the clear animation ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineClear {
    rows: ArrayVec<usize, 4>,
    deadline: Duration,
}

impl LineClear {
    /// Full row indices, ascending.
    #[must_use]
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Time at which the rows are removed.
    #[must_use]
    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

/// Complete state of one game session and the command/update API driving it.
///
/// The host calls [`Game::update`] once per frame with the elapsed session
/// time and forwards input between frames through the `try_*` methods (or
/// [`Game::handle_command`]). All timers are deadlines compared against the
/// supplied time, so a late frame simply catches up.
///
/// # Piece lifecycle
///
/// 1. A piece spawns falling; gravity moves it down at the level's interval
/// 2. Once it rests on the stack a 500 ms lock delay starts; moving or
///    rotating it off the ledge cancels the delay
/// 3. When the delay expires the piece locks into the board
/// 4. Full rows enter a 300 ms clearing window, then are removed and scored
/// 5. The next piece spawns; if it cannot be placed the game is over
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use blockfall_engine::{Command, Game};
///
/// let mut game = Game::new();
/// game.update(Duration::from_millis(16));
/// game.handle_command(Command::MoveLeft);
/// game.handle_command(Command::HardDrop);
/// game.update(Duration::from_millis(32));
///
/// assert_eq!(game.stats().completed_pieces(), 1);
/// assert!(game.stats().score() > 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    bag: PieceBag,
    next: VecDeque<PieceKind>,
    held: Option<PieceKind>,
    hold_used: bool,
    /// `None` only while a line clear is in progress.
    piece: Option<Piece>,
    /// `None` while the piece is airborne.
    lock_deadline: Option<Duration>,
    line_clear: Option<LineClear>,
    stats: GameStats,
    session_state: SessionState,
    time: Duration,
    last_fall_at: Duration,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Starts a game with a random seed at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Starts a game with a fixed piece sequence at time zero.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self::started_at(seed, Duration::ZERO)
    }

    /// Starts a game whose clock begins at `now`.
    #[must_use]
    pub fn started_at(seed: PieceSeed, now: Duration) -> Self {
        let mut bag = PieceBag::with_seed(seed);
        let next = (0..NEXT_QUEUE_LEN).map(|_| bag.pop()).collect();
        let mut game = Self {
            board: Board::EMPTY,
            bag,
            next,
            held: None,
            hold_used: false,
            piece: None,
            lock_deadline: None,
            line_clear: None,
            stats: GameStats::new(),
            session_state: SessionState::Playing,
            time: now,
            last_fall_at: now,
        };
        game.spawn(false);
        game
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The piece under control, or `None` during a line clear.
    #[must_use]
    pub fn piece(&self) -> Option<&Piece> {
        self.piece.as_ref()
    }

    /// Time at which the resting piece locks, or `None` while it is airborne.
    #[must_use]
    pub fn lock_deadline(&self) -> Option<Duration> {
        self.lock_deadline
    }

    #[must_use]
    pub fn line_clear(&self) -> Option<&LineClear> {
        self.line_clear.as_ref()
    }

    /// Progress of the running line clear animation in `[0, 1]`.
    #[must_use]
    pub fn clear_progress(&self) -> Option<f64> {
        self.line_clear
            .as_ref()
            .map(|clear| timing::clear_progress(self.time, clear.deadline))
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.held
    }

    /// Whether hold may still be used for the current piece.
    #[must_use]
    pub fn can_hold(&self) -> bool {
        !self.hold_used
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.next.iter().copied()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session_state
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session_state.is_playing()
    }

    /// Latest time supplied by the host.
    #[must_use]
    pub fn time(&self) -> Duration {
        self.time
    }

    /// Advances gravity, lock and line-clear timers to `now`.
    ///
    /// `now` is the elapsed session time and must not go backwards; an
    /// earlier value is treated as the latest one already seen.
    pub fn update(&mut self, now: Duration) {
        if self.session_state.is_game_over() {
            return;
        }
        self.time = self.time.max(now);

        if let Some(clear) = &self.line_clear {
            if self.time >= clear.deadline {
                self.finish_line_clear();
            }
            return;
        }

        match self.lock_deadline {
            Some(deadline) if self.time > deadline => self.lock_piece(),
            Some(_) => {}
            None => self.apply_gravity(),
        }
    }

    /// Applies a command, returning `true` when the state changed.
    pub fn handle_command(&mut self, command: Command) -> bool {
        let result = match command {
            Command::RotateClockwise => self.try_rotate(RotationDirection::Clockwise),
            Command::RotateCounterClockwise => {
                self.try_rotate(RotationDirection::CounterClockwise)
            }
            Command::MoveLeft => self.try_move_left(),
            Command::MoveRight => self.try_move_right(),
            Command::SoftDrop => self.try_soft_drop(),
            Command::HardDrop => self.hard_drop(),
            Command::Hold => self.try_hold(),
            Command::RestartIfGameOver => self.restart_if_game_over(),
        };
        if let Err(err) = result {
            tracing::trace!(%command, %err, "command rejected");
        }
        result.is_ok()
    }

    pub fn try_move_left(&mut self) -> Result<(), CommandError> {
        self.try_shift(-1)
    }

    pub fn try_move_right(&mut self) -> Result<(), CommandError> {
        self.try_shift(1)
    }

    pub fn try_rotate(&mut self, direction: RotationDirection) -> Result<(), CommandError> {
        let piece = self.controlled_piece()?;
        let rotated =
            resolve_rotation(&self.board, &piece, direction).ok_or(CommandError::Collision)?;
        self.piece = Some(rotated);
        self.refresh_grounding();
        Ok(())
    }

    /// Moves the piece down one row for one point.
    ///
    /// Rejected once the piece rests on the stack; gravity and the lock
    /// delay take over from there.
    pub fn try_soft_drop(&mut self) -> Result<(), CommandError> {
        let piece = self.controlled_piece()?;
        if self.lock_deadline.is_some() {
            return Err(CommandError::AlreadyGrounded);
        }
        let dropped = piece.with_position(piece.position().down());
        if self.board.collides(dropped.position(), dropped.shape()) {
            return Err(CommandError::AlreadyGrounded);
        }
        self.piece = Some(dropped);
        self.stats.add_drop_points(1);
        self.last_fall_at = self.time;
        self.refresh_grounding();
        Ok(())
    }

    /// Drops the piece to its ground row for two points per row travelled.
    ///
    /// The lock deadline is set to the current time, so the piece locks on
    /// the next update with a later time.
    pub fn hard_drop(&mut self) -> Result<(), CommandError> {
        let piece = self.controlled_piece()?;
        let rows = usize::try_from(piece.ground_row() - piece.position().row).unwrap_or(0);
        self.stats.add_drop_points(2 * rows);
        self.piece = Some(piece.with_position(piece.position().with_row(piece.ground_row())));
        self.last_fall_at = self.time;
        self.lock_deadline = Some(self.time);
        Ok(())
    }

    /// Swaps the active piece with the hold slot (or the next piece if the slot is empty).
    ///
    /// Allowed once between two pieces spawned from the queue.
    pub fn try_hold(&mut self) -> Result<(), CommandError> {
        self.controlled_piece()?;
        if self.hold_used {
            return Err(CommandError::HoldAlreadyUsed);
        }
        self.spawn(true);
        Ok(())
    }

    /// Replaces a finished game with a fresh one; rejected while still playing.
    ///
    /// The new game continues the clock and takes its seed from the old bag,
    /// so a seeded session stays reproducible across restarts.
    pub fn restart_if_game_over(&mut self) -> Result<(), CommandError> {
        if self.session_state.is_playing() {
            return Err(CommandError::GameStillActive);
        }
        let seed = self.bag.next_seed();
        *self = Self::started_at(seed, self.time);
        tracing::info!("game restarted");
        Ok(())
    }

    /// Returns the piece commands may act on.
    fn controlled_piece(&self) -> Result<Piece, CommandError> {
        if self.session_state.is_game_over() {
            return Err(CommandError::GameOver);
        }
        self.piece.ok_or(CommandError::NoActivePiece)
    }

    fn try_shift(&mut self, d_col: i32) -> Result<(), CommandError> {
        let piece = self.controlled_piece()?;
        let moved = piece.with_position(piece.position().offset(0, d_col));
        if self.board.collides(moved.position(), moved.shape()) {
            return Err(CommandError::Collision);
        }
        self.piece = Some(moved);
        self.refresh_grounding();
        Ok(())
    }

    /// Re-evaluates whether the piece rests on something.
    ///
    /// Resting starts (or restarts) the lock delay; being airborne clears it
    /// and recomputes the ground row.
    fn refresh_grounding(&mut self) {
        let Some(piece) = &mut self.piece else {
            return;
        };
        if self.board.collides(piece.position().down(), piece.shape()) {
            *piece = piece.with_ground_row(piece.position().row);
            self.lock_deadline = Some(self.time + LOCK_DELAY);
        } else {
            let ground_row = self.board.ground_row(piece.position(), piece.shape());
            *piece = piece.with_ground_row(ground_row);
            self.lock_deadline = None;
        }
    }

    fn apply_gravity(&mut self) {
        let Some(piece) = self.piece else {
            return;
        };
        let interval = timing::fall_interval(self.stats.level());
        let distance = timing::fall_distance(self.time.saturating_sub(self.last_fall_at), interval);
        if distance == 0 {
            return;
        }
        let row = piece.position().row;
        let step = (piece.ground_row() - row)
            .max(0)
            .min(i32::try_from(distance).unwrap_or(i32::MAX));
        self.piece = Some(piece.with_position(piece.position().with_row(row + step)));
        self.last_fall_at += interval * distance;
        self.refresh_grounding();
    }

    fn lock_piece(&mut self) {
        let Some(piece) = self.piece.take() else {
            return;
        };
        self.lock_deadline = None;
        let full_rows = self
            .board
            .fill_piece(&piece)
            .map(|rows| self.board.full_rows_in(rows))
            .unwrap_or_default();
        tracing::debug!(
            kind = ?piece.kind(),
            position = ?piece.position(),
            full_rows = full_rows.len(),
            "piece locked"
        );

        if full_rows.is_empty() {
            self.stats.complete_piece_lock();
            self.spawn(false);
            return;
        }
        self.line_clear = Some(LineClear {
            rows: full_rows,
            deadline: self.time + LINE_CLEAR_DELAY,
        });
    }

    fn finish_line_clear(&mut self) {
        let Some(clear) = self.line_clear.take() else {
            return;
        };
        self.board.remove_rows(&clear.rows);
        let points = self.stats.complete_line_clear(clear.rows.len());
        tracing::debug!(
            rows = ?clear.rows.as_slice(),
            points,
            level = self.stats.level(),
            "lines cleared"
        );
        self.spawn(false);
    }

    /// Brings the next piece into play.
    ///
    /// With `use_hold`, the active kind goes into the hold slot and the
    /// previously held kind comes back (or the queue is used if nothing was
    /// held). Only a spawn without hold re-enables hold.
    fn spawn(&mut self, use_hold: bool) {
        let from_hold = if use_hold {
            self.hold_used = true;
            let previous = self.piece.map(|piece| piece.kind());
            std::mem::replace(&mut self.held, previous)
        } else {
            self.hold_used = false;
            None
        };
        let kind = from_hold.unwrap_or_else(|| self.draw_next());

        let mut piece = Piece::new(kind);
        if kind != PieceKind::I && self.board.collides(piece.position(), piece.shape()) {
            piece = piece.with_position(SPAWN_FALLBACK_POSITION);
        }
        if self.board.collides(piece.position(), piece.shape()) {
            self.piece = Some(piece);
            self.lock_deadline = None;
            self.session_state = SessionState::GameOver;
            tracing::info!(
                score = self.stats.score(),
                lines = self.stats.total_cleared_lines(),
                "game over"
            );
            return;
        }

        let ground_row = self.board.ground_row(piece.position(), piece.shape());
        self.piece = Some(piece.with_ground_row(ground_row));
        self.lock_deadline = None;
        self.last_fall_at = self.time;
        tracing::debug!(?kind, use_hold, "piece spawned");
    }

    /// Pops the front of the next queue and tops it up from the bag.
    fn draw_next(&mut self) -> PieceKind {
        let kind = self.next.pop_front().unwrap_or_else(|| self.bag.pop());
        self.next.push_back(self.bag.pop());
        kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        board::Block,
        piece::{Orientation, PiecePosition, SPAWN_POSITION},
    };

    const SEED: PieceSeed = PieceSeed::from_bytes([42; 16]);

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    /// A seeded game whose active piece is replaced by `kind` at the spawn cell.
    fn game_with_piece(kind: PieceKind) -> Game {
        let mut game = Game::with_seed(SEED);
        game.set_piece(kind);
        game
    }

    impl Game {
        fn set_piece(&mut self, kind: PieceKind) {
            self.piece = Some(Piece::new(kind));
            self.lock_deadline = None;
            self.refresh_grounding();
        }

        fn fill_row_except(&mut self, row: i32, holes: &[i32]) {
            for col in 0..10 {
                if !holes.contains(&col) {
                    self.board.fill_block_at(row, col, Block::Filled(PieceKind::Z));
                }
            }
        }

        fn piece_unchecked(&self) -> Piece {
            self.piece.unwrap()
        }
    }

    #[test]
    fn test_new_game_state() {
        let game = Game::with_seed(SEED);
        assert!(game.is_active());
        assert_eq!(game.next_pieces().count(), NEXT_QUEUE_LEN);
        assert_eq!(game.held_piece(), None);
        assert!(game.can_hold());
        assert_eq!(game.lock_deadline(), None);
        assert_eq!(game.stats().level(), 1);
        let piece = game.piece_unchecked();
        assert_eq!(piece.orientation(), Orientation::Up);
        assert_eq!(piece.position(), SPAWN_POSITION);
        assert_eq!(piece.ground_row(), 20);
    }

    #[test]
    fn test_first_piece_comes_from_initial_queue() {
        let mut bag = PieceBag::with_seed(SEED);
        let drawn: Vec<_> = (0..4).map(|_| bag.pop()).collect();
        let game = Game::with_seed(SEED);
        assert_eq!(game.piece_unchecked().kind(), drawn[0]);
        assert_eq!(game.next_pieces().collect::<Vec<_>>(), &drawn[1..]);
    }

    #[test]
    fn test_hard_drop_i_on_empty_board() {
        let mut game = game_with_piece(PieceKind::I);
        assert!(game.handle_command(Command::HardDrop));
        let piece = game.piece_unchecked();
        // the I occupies local row 1, so its origin rests one above the bottom row
        assert_eq!(piece.position().row, 20);
        assert_eq!(game.stats().score(), 2 * 18);
        assert_eq!(game.lock_deadline(), Some(Duration::ZERO));

        // same time: deadline not yet passed
        game.update(Duration::ZERO);
        assert_eq!(game.stats().completed_pieces(), 0);
        game.update(ms(1));
        assert_eq!(game.stats().completed_pieces(), 1);
        for col in 3..7 {
            assert_eq!(game.board().block_at(21, col), Some(Block::Filled(PieceKind::I)));
        }
        assert_eq!(game.piece_unchecked().position(), SPAWN_POSITION);
    }

    #[test]
    fn test_gravity_falls_one_row_per_interval() {
        let mut game = game_with_piece(PieceKind::T);
        game.update(ms(999));
        assert_eq!(game.piece_unchecked().position().row, 2);
        game.update(ms(1000));
        assert_eq!(game.piece_unchecked().position().row, 3);
        // a missed frame catches up
        game.update(ms(4500));
        assert_eq!(game.piece_unchecked().position().row, 6);
        assert_eq!(game.last_fall_at, ms(4000));
    }

    #[test]
    fn test_gravity_speeds_up_with_level() {
        let mut game = game_with_piece(PieceKind::T);
        for _ in 0..3 {
            game.stats.complete_line_clear(4);
        }
        assert_eq!(game.stats().level(), 2);

        game.update(ms(792));
        assert_eq!(game.piece_unchecked().position().row, 2);
        game.update(ms(793));
        assert_eq!(game.piece_unchecked().position().row, 3);
        assert_eq!(game.last_fall_at, ms(793));
        game.update(ms(1585));
        assert_eq!(game.piece_unchecked().position().row, 3);
        game.update(ms(1586));
        assert_eq!(game.piece_unchecked().position().row, 4);
        // a missed frame catches up at the level-2 interval
        game.update(ms(4000));
        assert_eq!(game.piece_unchecked().position().row, 7);
        assert_eq!(game.last_fall_at, Duration::from_micros(793_000 * 5));
    }

    #[test]
    fn test_gravity_stops_at_ground_and_starts_lock_delay() {
        let mut game = game_with_piece(PieceKind::O);
        game.update(ms(60_000));
        let piece = game.piece_unchecked();
        assert_eq!(piece.position().row, 20);
        assert_eq!(game.lock_deadline(), Some(ms(60_500)));

        game.update(ms(60_500));
        assert_eq!(game.stats().completed_pieces(), 0);
        game.update(ms(60_501));
        assert_eq!(game.stats().completed_pieces(), 1);
        assert_eq!(game.board().block_at(21, 4), Some(Block::Filled(PieceKind::O)));
    }

    #[test]
    fn test_moving_off_ledge_cancels_lock_delay() {
        let mut game = game_with_piece(PieceKind::O);
        // a one-cell ledge under the O at columns 4-5 only
        game.board.fill_block_at(10, 4, Block::Filled(PieceKind::L));
        game.board.fill_block_at(10, 5, Block::Filled(PieceKind::L));
        game.set_piece(PieceKind::O);
        game.update(ms(10_000));
        assert_eq!(game.piece_unchecked().position().row, 8);
        assert_eq!(game.lock_deadline(), Some(ms(10_500)));

        game.time = ms(10_200);
        assert!(game.handle_command(Command::MoveLeft));
        assert_eq!(game.piece_unchecked().position().col, 3);
        // still resting on column 4 of the ledge: deadline restarts
        assert_eq!(game.lock_deadline(), Some(ms(10_700)));

        assert!(game.handle_command(Command::MoveLeft));
        assert_eq!(game.lock_deadline(), None);
        assert_eq!(game.piece_unchecked().ground_row(), 20);
    }

    #[test]
    fn test_soft_drop() {
        let mut game = game_with_piece(PieceKind::T);
        game.time = ms(300);
        assert!(game.handle_command(Command::SoftDrop));
        assert_eq!(game.piece_unchecked().position().row, 3);
        assert_eq!(game.stats().score(), 1);
        assert_eq!(game.last_fall_at, ms(300));

        for _ in 0..17 {
            assert!(game.handle_command(Command::SoftDrop));
        }
        assert_eq!(game.piece_unchecked().position().row, 20);
        assert_eq!(game.lock_deadline(), Some(ms(800)));
        assert_eq!(game.try_soft_drop(), Err(CommandError::AlreadyGrounded));
        assert_eq!(game.stats().score(), 18);
    }

    #[test]
    fn test_rejected_move_leaves_state_unchanged() {
        let mut game = game_with_piece(PieceKind::T);
        while game.try_move_left().is_ok() {}
        let before = game.clone();
        assert!(!game.handle_command(Command::MoveLeft));
        assert_eq!(game, before);
        assert_eq!(game.piece_unchecked().position().col, 1);
    }

    #[test]
    fn test_rotation_refreshes_ground_row() {
        let mut game = game_with_piece(PieceKind::I);
        assert!(game.handle_command(Command::RotateClockwise));
        let piece = game.piece_unchecked();
        assert_eq!(piece.orientation(), Orientation::Right);
        // vertical I spans 4 rows from its origin
        assert_eq!(piece.ground_row(), 18);
        assert!(game.handle_command(Command::RotateCounterClockwise));
        let piece = game.piece_unchecked();
        assert_eq!(piece.orientation(), Orientation::Up);
        assert_eq!(*piece.shape(), PieceKind::I.shape(Orientation::Up));
        assert_eq!(piece.ground_row(), 20);
    }

    #[test]
    fn test_single_line_clear() {
        let mut game = game_with_piece(PieceKind::I);
        game.fill_row_except(21, &[3, 4, 5, 6]);
        game.board.fill_block_at(20, 0, Block::Filled(PieceKind::J));
        game.set_piece(PieceKind::I);

        assert!(game.handle_command(Command::HardDrop));
        let drop_points = game.stats().score();
        assert_eq!(drop_points, 36);
        game.update(ms(10));

        let clear = game.line_clear().unwrap();
        assert_eq!(clear.rows(), &[21]);
        assert_eq!(clear.deadline(), ms(310));
        assert!(game.piece().is_none());
        assert_eq!(game.try_move_left(), Err(CommandError::NoActivePiece));
        assert_eq!(game.try_hold(), Err(CommandError::NoActivePiece));
        assert_eq!(game.clear_progress(), Some(0.0));

        game.update(ms(160));
        assert!((game.clear_progress().unwrap() - 0.5).abs() < 1e-9);
        assert!(game.line_clear().is_some());

        game.update(ms(310));
        assert!(game.line_clear().is_none());
        assert_eq!(game.stats().total_cleared_lines(), 1);
        assert_eq!(game.stats().score(), drop_points + 100);
        assert_eq!(game.stats().level(), 1);
        // row 21 is gone: the lone J block dropped into it, the top is empty
        assert_eq!(game.board().block_at(21, 0), Some(Block::Filled(PieceKind::J)));
        assert!(game.board().block_at(21, 1).unwrap().is_empty());
        assert!(game.board().rows()[0].iter().all(|b| b.is_empty()));
        assert!(game.piece().is_some());
    }

    #[test]
    fn test_tetris_at_level_one() {
        let mut game = game_with_piece(PieceKind::I);
        for row in 18..22 {
            game.fill_row_except(row, &[9]);
        }
        game.set_piece(PieceKind::I);
        assert!(game.handle_command(Command::RotateClockwise));
        while game.try_move_right().is_ok() {}
        let piece = game.piece_unchecked();
        assert_eq!(piece.ground_row(), 18);
        assert!(game.handle_command(Command::HardDrop));
        let before = game.stats().score();

        game.update(ms(1));
        assert_eq!(game.line_clear().unwrap().rows(), &[18, 19, 20, 21]);
        game.update(ms(301));
        assert_eq!(game.stats().score(), before + 800);
        assert_eq!(game.stats().total_cleared_lines(), 4);
        assert_eq!(game.stats().line_cleared_counter()[4], 1);
        assert!(game.board().rows().iter().all(|row| row.iter().all(|b| b.is_empty())));
    }

    #[test]
    fn test_hold_exactly_once() {
        let mut game = Game::with_seed(SEED);
        let first = game.piece_unchecked().kind();
        let queued: Vec<_> = game.next_pieces().collect();

        assert!(game.handle_command(Command::Hold));
        assert_eq!(game.held_piece(), Some(first));
        // empty slot: the next queued piece comes in
        assert_eq!(game.piece_unchecked().kind(), queued[0]);
        assert!(!game.can_hold());

        let before = game.clone();
        assert_eq!(game.try_hold(), Err(CommandError::HoldAlreadyUsed));
        assert_eq!(game, before);

        // a genuine spawn re-enables hold, which now swaps
        let second = game.piece_unchecked().kind();
        game.hard_drop().unwrap();
        game.update(ms(1));
        assert!(game.can_hold());
        assert!(game.handle_command(Command::Hold));
        assert_eq!(game.piece_unchecked().kind(), first);
        assert_eq!(game.held_piece(), Some(queued[1]));
        assert_ne!(second, queued[1]);
    }

    #[test]
    fn test_hold_resets_piece_to_spawn() {
        let mut game = Game::with_seed(SEED);
        game.try_move_left().unwrap();
        game.try_rotate(RotationDirection::Clockwise).unwrap();
        game.try_hold().unwrap();
        game.try_hold().unwrap_err();
        game.hard_drop().unwrap();
        game.update(ms(1));
        game.try_hold().unwrap();
        let piece = game.piece_unchecked();
        assert_eq!(piece.orientation(), Orientation::Up);
        assert_eq!(piece.position(), SPAWN_POSITION);
    }

    #[test]
    fn test_spawn_falls_back_one_row() {
        let mut game = game_with_piece(PieceKind::T);
        game.next = VecDeque::from([PieceKind::T, PieceKind::T, PieceKind::T]);
        game.hard_drop().unwrap();
        // block only the bottom row of a T spawned at row 2
        game.board.fill_block_at(3, 3, Block::Filled(PieceKind::S));
        game.update(ms(1));
        let piece = game.piece_unchecked();
        assert!(game.is_active());
        assert_eq!(piece.position(), SPAWN_FALLBACK_POSITION);
        assert_eq!(piece.ground_row(), 1);
    }

    #[test]
    fn test_game_over_on_blocked_spawn_and_restart() {
        let mut game = game_with_piece(PieceKind::O);
        for row in 0..4 {
            game.fill_row_except(row, &[0]);
        }
        game.next = VecDeque::from([PieceKind::T, PieceKind::T, PieceKind::T]);
        game.piece = Some(
            Piece::new(PieceKind::O)
                .with_position(PiecePosition::new(20, 0))
                .with_ground_row(20),
        );
        game.fill_row_except(20, &[0, 1]);
        game.fill_row_except(21, &[0, 1]);
        game.lock_deadline = Some(ms(0));
        let score = game.stats().score();

        // locking completes rows 20 and 21 which enter the clear window
        game.update(ms(1));
        assert_eq!(game.line_clear().unwrap().rows(), &[20, 21]);
        game.update(ms(301));
        // rows 0-3 moved down to 2-5: the T cannot spawn at row 2 nor row 1
        assert!(!game.is_active());
        assert_eq!(game.session_state(), SessionState::GameOver);
        assert_eq!(game.stats().score(), score + 300);

        let before = game.clone();
        game.update(ms(5000));
        assert_eq!(game, before);
        assert_eq!(game.try_move_left(), Err(CommandError::GameOver));
        assert_eq!(game.try_hold(), Err(CommandError::GameOver));

        assert!(game.handle_command(Command::RestartIfGameOver));
        assert!(game.is_active());
        assert_eq!(game.stats().score(), 0);
        assert_eq!(game.time(), ms(301));
        assert!(game.board().rows().iter().all(|row| row.iter().all(|b| b.is_empty())));
        assert_eq!(
            game.restart_if_game_over(),
            Err(CommandError::GameStillActive)
        );
    }

    #[test]
    fn test_time_never_goes_backwards() {
        let mut game = game_with_piece(PieceKind::T);
        game.update(ms(2000));
        let row = game.piece_unchecked().position().row;
        game.update(ms(100));
        assert_eq!(game.time(), ms(2000));
        assert_eq!(game.piece_unchecked().position().row, row);
    }
}
