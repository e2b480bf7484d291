use std::time::Duration;

use serde::Serialize;

use crate::core::{
    BOARD_WIDTH,
    board::Board,
    piece::{Piece, PieceKind, Rgb},
};

use super::{game::Game, game_stats::GameStats};

/// Read-only copy of everything a host needs to render one frame.
///
/// Times are milliseconds since the session started.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub time_ms: f64,
    /// Every row, hidden ones included, as kind letters.
    pub board: Board,
    /// Cell colors of the visible well, `null` for empty cells.
    pub well: Vec<[Option<Rgb>; BOARD_WIDTH]>,
    pub piece: Option<PieceSnapshot>,
    pub lock_deadline_ms: Option<f64>,
    pub line_clear: Option<LineClearSnapshot>,
    pub held: Option<KindSnapshot>,
    pub hold_available: bool,
    pub next: Vec<KindSnapshot>,
    pub stats: GameStats,
    pub level: usize,
    pub active: bool,
}

/// A piece kind together with its display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindSnapshot {
    pub kind: PieceKind,
    pub color: Rgb,
}

impl From<PieceKind> for KindSnapshot {
    fn from(kind: PieceKind) -> Self {
        Self {
            kind,
            color: kind.color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceSnapshot {
    #[serde(flatten)]
    pub piece: Piece,
    pub color: Rgb,
    pub cells: Vec<(i32, i32)>,
    pub ghost_cells: Vec<(i32, i32)>,
}

impl From<Piece> for PieceSnapshot {
    fn from(piece: Piece) -> Self {
        Self {
            piece,
            color: piece.kind().color(),
            cells: piece.occupied_cells().to_vec(),
            ghost_cells: piece.ghost_cells().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineClearSnapshot {
    pub rows: Vec<usize>,
    pub deadline_ms: f64,
    pub progress: f64,
}

fn millis(time: Duration) -> f64 {
    time.as_secs_f64() * 1000.0
}

impl From<&Game> for GameSnapshot {
    fn from(game: &Game) -> Self {
        let line_clear = game.line_clear().map(|clear| LineClearSnapshot {
            rows: clear.rows().to_vec(),
            deadline_ms: millis(clear.deadline()),
            progress: game.clear_progress().unwrap_or_default(),
        });
        Self {
            time_ms: millis(game.time()),
            board: game.board().clone(),
            well: game.board().visible_colors(),
            piece: game.piece().copied().map(PieceSnapshot::from),
            lock_deadline_ms: game.lock_deadline().map(millis),
            line_clear,
            held: game.held_piece().map(KindSnapshot::from),
            hold_available: game.can_hold(),
            next: game.next_pieces().map(KindSnapshot::from).collect(),
            stats: game.stats().clone(),
            level: game.stats().level(),
            active: game.is_active(),
        }
    }
}

impl Game {
    /// Captures the current state for rendering or serialization.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::from(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Command, PieceSeed};

    #[test]
    fn test_snapshot_json_shape() {
        let mut game = Game::with_seed(PieceSeed::from_bytes([3; 16]));
        game.update(Duration::from_millis(1500));
        let value = serde_json::to_value(game.snapshot()).unwrap();

        assert_eq!(value["time_ms"], json!(1500.0));
        assert_eq!(value["board"].as_array().unwrap().len(), 22);
        assert_eq!(value["next"].as_array().unwrap().len(), 3);
        assert_eq!(value["held"], json!(null));
        assert_eq!(value["hold_available"], json!(true));
        assert_eq!(value["active"], json!(true));
        assert_eq!(value["level"], json!(1));
        assert_eq!(value["lock_deadline_ms"], json!(null));
        assert_eq!(value["line_clear"], json!(null));

        let piece = &value["piece"];
        assert_eq!(piece["position"], json!({ "row": 3, "col": 4 }));
        assert_eq!(piece["orientation"], json!("Up"));
        assert_eq!(piece["ground_row"], json!(20));
        assert_eq!(piece["cells"].as_array().unwrap().len(), 4);
        assert!(piece["shape"].is_array());
        let kind = game.piece().unwrap().kind();
        assert_eq!(piece["color"], serde_json::to_value(kind.color()).unwrap());

        let well = value["well"].as_array().unwrap();
        assert_eq!(well.len(), 20);
        assert_eq!(well[19], json!(vec![serde_json::Value::Null; 10]));
    }

    #[test]
    fn test_snapshot_colors_for_locked_cells_and_queue() {
        let mut game = Game::with_seed(PieceSeed::from_bytes([3; 16]));
        let first = game.piece().unwrap().kind();
        game.handle_command(Command::Hold);
        game.handle_command(Command::HardDrop);
        game.update(Duration::from_millis(1));

        let snapshot = game.snapshot();
        assert_eq!(
            snapshot.held,
            Some(KindSnapshot {
                kind: first,
                color: first.color(),
            })
        );
        for next in &snapshot.next {
            assert_eq!(next.color, next.kind.color());
        }
        let locked: Vec<_> = snapshot.well.iter().flatten().flatten().collect();
        assert_eq!(locked.len(), 4);
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["held"]["kind"], json!(first));
        assert_eq!(
            value["held"]["color"],
            json!({ "r": first.color().r, "g": first.color().g, "b": first.color().b })
        );
    }
}
