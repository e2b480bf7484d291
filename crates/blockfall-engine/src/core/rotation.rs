use super::{
    board::Board,
    piece::{Piece, PieceKind, RotationDirection},
};

/// Kick offsets as `(row, col)`, tried in order after the unshifted rotation fails.
type KickTable = [[(i32, i32); 4]; 4];

/// SRS kicks for J, L, S, T and Z (O follows the same path; it never needs a kick).
const JLSTZ_CLOCKWISE: KickTable = [
    [(0, -1), (-1, -1), (2, 0), (2, -1)],
    [(0, 1), (1, 1), (-2, 0), (-2, 1)],
    [(0, 1), (-1, 1), (2, 0), (2, 1)],
    [(0, -1), (1, -1), (-2, 0), (-2, -1)],
];
const JLSTZ_COUNTER_CLOCKWISE: KickTable = [
    [(0, 1), (-1, 1), (2, 0), (2, 1)],
    [(0, 1), (1, 1), (-2, 0), (-2, 1)],
    [(0, -1), (-1, -1), (2, 0), (2, -1)],
    [(0, -1), (1, -1), (-2, 0), (-2, -1)],
];
const I_CLOCKWISE: KickTable = [
    [(0, -2), (0, 1), (1, -2), (-2, 1)],
    [(0, -1), (0, 2), (-2, -1), (1, 2)],
    [(0, 2), (0, -1), (-1, 2), (2, -1)],
    [(0, 1), (0, -2), (2, 1), (-1, -2)],
];
const I_COUNTER_CLOCKWISE: KickTable = [
    [(0, -1), (0, 2), (-2, -1), (1, 2)],
    [(0, 2), (0, -1), (-1, 2), (2, -1)],
    [(0, 1), (0, -2), (2, 1), (-1, -2)],
    [(0, -2), (0, 1), (1, -2), (-2, 1)],
];

fn kick_table(kind: PieceKind, direction: RotationDirection) -> &'static KickTable {
    match (kind, direction) {
        (PieceKind::I, RotationDirection::Clockwise) => &I_CLOCKWISE,
        (PieceKind::I, RotationDirection::CounterClockwise) => &I_COUNTER_CLOCKWISE,
        (_, RotationDirection::Clockwise) => &JLSTZ_CLOCKWISE,
        (_, RotationDirection::CounterClockwise) => &JLSTZ_COUNTER_CLOCKWISE,
    }
}

/// Rotates `piece` on `board`, resolving collisions with the Super Rotation System kicks.
///
/// The unshifted rotation is tried first; if it collides, the four kick
/// offsets for the piece's class, the direction and the *current*
/// orientation are tried in order and the first free one wins.
///
/// Returns `None` when every candidate collides; the caller keeps the
/// given piece untouched in that case. The returned piece's ground row is
/// stale and must be refreshed by the caller.
#[must_use]
pub fn resolve_rotation(
    board: &Board,
    piece: &Piece,
    direction: RotationDirection,
) -> Option<Piece> {
    let rotated = piece.rotated(direction);
    if !board.collides(rotated.position(), rotated.shape()) {
        return Some(rotated);
    }

    let kicks = &kick_table(piece.kind(), direction)[piece.orientation().index()];
    for (test, &(d_row, d_col)) in (1..).zip(kicks) {
        let position = piece.position().offset(d_row, d_col);
        if board.collides(position, rotated.shape()) {
            tracing::trace!(kind = ?piece.kind(), ?direction, test, "wall kick failed");
            continue;
        }
        tracing::debug!(
            kind = ?piece.kind(),
            ?direction,
            from = ?piece.orientation(),
            test,
            "wall kick succeeded"
        );
        return Some(rotated.with_position(position));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        board::Block,
        piece::{Orientation, PiecePosition},
    };

    #[test]
    fn test_free_rotation_needs_no_kick() {
        let board = Board::EMPTY;
        let piece = Piece::new(PieceKind::T).with_position(PiecePosition::new(10, 4));
        let rotated = resolve_rotation(&board, &piece, RotationDirection::Clockwise).unwrap();
        assert_eq!(rotated.position(), piece.position());
        assert_eq!(rotated.orientation(), Orientation::Right);
        assert_eq!(*rotated.shape(), PieceKind::T.shape(Orientation::Right));
    }

    #[test]
    fn test_vertical_i_kicks_off_left_wall() {
        let board = Board::EMPTY;
        // Vertical I hugging the left wall: occupied column 0.
        let piece = Piece::new(PieceKind::I)
            .rotated(RotationDirection::Clockwise)
            .with_position(PiecePosition::new(5, -1));
        assert!(!board.collides(piece.position(), piece.shape()));

        // Counter-clockwise from Right: unshifted Up lands at cols -2..1 (collides),
        // first kick (0, +2) moves it to cols 0..3.
        let rotated =
            resolve_rotation(&board, &piece, RotationDirection::CounterClockwise).unwrap();
        assert_eq!(rotated.orientation(), Orientation::Up);
        assert_eq!(rotated.position(), PiecePosition::new(5, 1));
    }

    #[test]
    fn test_t_kicks_off_right_wall() {
        let board = Board::EMPTY;
        // T pointing left (orientation Left) with its stem against the right wall.
        let piece = Piece::new(PieceKind::T)
            .rotated(RotationDirection::CounterClockwise)
            .with_position(PiecePosition::new(10, 9));
        assert!(!board.collides(piece.position(), piece.shape()));

        // Left -> Up clockwise: unshifted spans cols 8..10 (collides), first kick (0, -1).
        let rotated = resolve_rotation(&board, &piece, RotationDirection::Clockwise).unwrap();
        assert_eq!(rotated.orientation(), Orientation::Up);
        assert_eq!(rotated.position(), PiecePosition::new(10, 8));
    }

    #[test]
    fn test_rotation_rejected_when_all_kicks_collide() {
        let mut board = Board::EMPTY;
        for row in 0..22 {
            for col in 0..10 {
                board.fill_block_at(row, col, Block::Filled(PieceKind::O));
            }
        }
        // Carve out exactly the vertical I footprint.
        for row in 5..9 {
            board.fill_block_at(row, 4, Block::Empty);
        }
        let piece = Piece::new(PieceKind::I)
            .rotated(RotationDirection::Clockwise)
            .with_position(PiecePosition::new(5, 3));
        assert!(!board.collides(piece.position(), piece.shape()));
        assert_eq!(
            resolve_rotation(&board, &piece, RotationDirection::Clockwise),
            None
        );
        assert_eq!(
            resolve_rotation(&board, &piece, RotationDirection::CounterClockwise),
            None
        );
    }

    /// SRS kicks as `(row, col)`, one row per starting orientation (Up, Right, Down, Left).
    const EXPECTED_KICKS: [(PieceKind, RotationDirection, KickTable); 4] = [
        (
            PieceKind::T,
            RotationDirection::Clockwise,
            [
                [(0, -1), (-1, -1), (2, 0), (2, -1)],
                [(0, 1), (1, 1), (-2, 0), (-2, 1)],
                [(0, 1), (-1, 1), (2, 0), (2, 1)],
                [(0, -1), (1, -1), (-2, 0), (-2, -1)],
            ],
        ),
        (
            PieceKind::T,
            RotationDirection::CounterClockwise,
            [
                [(0, 1), (-1, 1), (2, 0), (2, 1)],
                [(0, 1), (1, 1), (-2, 0), (-2, 1)],
                [(0, -1), (-1, -1), (2, 0), (2, -1)],
                [(0, -1), (1, -1), (-2, 0), (-2, -1)],
            ],
        ),
        (
            PieceKind::I,
            RotationDirection::Clockwise,
            [
                [(0, -2), (0, 1), (1, -2), (-2, 1)],
                [(0, -1), (0, 2), (-2, -1), (1, 2)],
                [(0, 2), (0, -1), (-1, 2), (2, -1)],
                [(0, 1), (0, -2), (2, 1), (-1, -2)],
            ],
        ),
        (
            PieceKind::I,
            RotationDirection::CounterClockwise,
            [
                [(0, -1), (0, 2), (-2, -1), (1, 2)],
                [(0, 2), (0, -1), (-1, 2), (2, -1)],
                [(0, 1), (0, -2), (2, 1), (-1, -2)],
                [(0, -2), (0, 1), (1, -2), (-2, 1)],
            ],
        ),
    ];

    /// A board filled everywhere except the cells of `piece`.
    fn board_with_only_room_for(piece: &Piece) -> Board {
        let mut board = Board::EMPTY;
        for row in 0..22 {
            for col in 0..10 {
                board.fill_block_at(row, col, Block::Filled(PieceKind::O));
            }
        }
        for (row, col) in piece.occupied_cells() {
            board.fill_block_at(row, col, Block::Empty);
        }
        board
    }

    #[test]
    fn test_kick_tables_are_exact() {
        for (kind, direction, expected) in EXPECTED_KICKS {
            assert_eq!(*kick_table(kind, direction), expected, "{kind:?} {direction:?}");
        }
        for kind in [PieceKind::J, PieceKind::L, PieceKind::S, PieceKind::Z, PieceKind::O] {
            assert_eq!(kick_table(kind, RotationDirection::Clockwise), &JLSTZ_CLOCKWISE);
            assert_eq!(
                kick_table(kind, RotationDirection::CounterClockwise),
                &JLSTZ_COUNTER_CLOCKWISE
            );
        }
    }

    #[test]
    fn test_every_kick_is_taken_when_only_it_fits() {
        let origin = PiecePosition::new(10, 4);
        for (kind, direction, table) in EXPECTED_KICKS {
            let mut piece = Piece::new(kind).with_position(origin);
            for (orientation, kicks) in table.iter().enumerate() {
                assert_eq!(piece.orientation().index(), orientation);
                for (test, &(d_row, d_col)) in kicks.iter().enumerate() {
                    let target = piece
                        .rotated(direction)
                        .with_position(origin.offset(d_row, d_col));
                    let board = board_with_only_room_for(&target);

                    let rotated = resolve_rotation(&board, &piece, direction).unwrap_or_else(|| {
                        panic!("{kind:?} {direction:?} from {orientation} kick #{}", test + 1)
                    });
                    assert_eq!(rotated.position(), target.position());
                    assert_eq!(rotated.orientation(), piece.orientation().rotated(direction));
                    assert_eq!(rotated.shape(), target.shape());
                }
                piece = piece.rotated(RotationDirection::Clockwise);
            }
        }
    }

    #[test]
    fn test_t_takes_fourth_kick() {
        let piece = Piece::new(PieceKind::T).with_position(PiecePosition::new(10, 4));
        let target = piece
            .rotated(RotationDirection::Clockwise)
            .with_position(PiecePosition::new(12, 3));
        let board = board_with_only_room_for(&target);
        let rotated = resolve_rotation(&board, &piece, RotationDirection::Clockwise).unwrap();
        assert_eq!(rotated.position(), PiecePosition::new(12, 3));
        assert_eq!(rotated.orientation(), Orientation::Right);
    }

    #[test]
    fn test_o_rotation_never_moves() {
        let board = Board::EMPTY;
        let piece = Piece::new(PieceKind::O).with_position(PiecePosition::new(20, 8));
        let rotated = resolve_rotation(&board, &piece, RotationDirection::Clockwise).unwrap();
        assert_eq!(rotated.position(), piece.position());
        assert_eq!(*rotated.shape(), *piece.shape());
    }
}
