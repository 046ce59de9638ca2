//! Rotation with wall kicks
//!
//! Classic rotation: the shape matrix turns 90°, the piece is recentered by
//! half the change in matrix size, and if that spot collides a fixed list of
//! six offsets is probed. There are no per-shape kick tables.

use crate::board::Board;
use crate::piece::{Piece, Position};
use crate::types::RotationDirection;

/// Offsets probed after a colliding rotation, in order.
///
/// x varies slowest so (-1, 0), (-1, 1), (0, 0), ... is the search order.
pub const KICK_OFFSETS: [(i8, i8); 6] = [(-1, 0), (-1, 1), (0, 0), (0, 1), (1, 0), (1, 1)];

/// Outcome of a rotation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationResult {
    /// The recentered rotation fit as-is.
    Rotated,
    /// The rotation fit after shifting by one of [`KICK_OFFSETS`].
    Kicked { dx: i8, dy: i8 },
    /// Nothing fit; the piece is unchanged.
    Blocked,
}

impl RotationResult {
    pub fn succeeded(&self) -> bool {
        !matches!(self, RotationResult::Blocked)
    }
}

/// Position shift that keeps a rotated shape centered on its old footprint.
pub fn recenter_offset(old_rows: usize, old_cols: usize, new_rows: usize, new_cols: usize) -> Position {
    Position::new(
        (old_cols as f32 - new_cols as f32) / 2.0,
        (old_rows as f32 - new_rows as f32) / 2.0,
    )
}

/// Rotate `piece` in place, kicking off walls and blocks if needed.
///
/// Only the piece is mutated. On [`RotationResult::Blocked`] shape,
/// position and rotation are exactly what they were before the call.
pub fn try_rotate(board: &Board, piece: &mut Piece, direction: RotationDirection) -> RotationResult {
    let original = piece.clone();
    let origin = piece.position();
    let (old_rows, old_cols) = (piece.shape().rows(), piece.shape().cols());

    piece.rotate(direction);

    let adjustment = recenter_offset(
        old_rows,
        old_cols,
        piece.shape().rows(),
        piece.shape().cols(),
    );
    let recentered = origin + adjustment;
    piece.set_position(recentered);

    if !board.is_collision(piece) {
        return RotationResult::Rotated;
    }

    for &(dx, dy) in KICK_OFFSETS.iter() {
        piece.set_position(recentered + Position::new(dx as f32, dy as f32));
        if !board.is_collision(piece) {
            return RotationResult::Kicked { dx, dy };
        }
    }

    *piece = original;
    RotationResult::Blocked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Shape;
    use crate::types::{Rgb, Rotation, BOARD_HEIGHT, BOARD_WIDTH};

    const GRAY: Rgb = Rgb::new(128, 128, 128);

    fn bar() -> Piece {
        Piece::new(Shape::from_rows(&[&[1, 1, 1, 1]]), GRAY)
    }

    #[test]
    fn test_recenter_offset_for_bar() {
        assert_eq!(recenter_offset(1, 4, 4, 1), Position::new(1.5, -1.5));
        assert_eq!(recenter_offset(4, 1, 1, 4), Position::new(-1.5, 1.5));
        assert_eq!(recenter_offset(2, 2, 2, 2), Position::new(0.0, 0.0));
    }

    #[test]
    fn test_open_field_rotation_is_plain() {
        let board = Board::new();
        let mut piece = bar();
        piece.set_position(Position::new(3.0, 5.0));

        let result = try_rotate(&board, &mut piece, RotationDirection::Clockwise);
        assert_eq!(result, RotationResult::Rotated);
        assert_eq!(piece.position(), Position::new(4.5, 3.5));
        assert_eq!(piece.rotation(), Rotation::Deg90);
        assert_eq!(piece.shape().rows(), 4);
    }

    #[test]
    fn test_blocked_rotation_restores_piece() {
        let mut board = Board::new();
        // Wall off everything except the bar's own row.
        for y in 0..BOARD_HEIGHT as i32 {
            for x in 0..BOARD_WIDTH as i32 {
                if y != 10 {
                    board.set(x, y, Some(GRAY));
                }
            }
        }
        let mut piece = bar();
        piece.set_position(Position::new(3.0, 10.0));
        let before = piece.clone();

        let result = try_rotate(&board, &mut piece, RotationDirection::CounterClockwise);
        assert_eq!(result, RotationResult::Blocked);
        assert_eq!(piece, before);
    }

    #[test]
    fn test_kick_order_prefers_left_first() {
        let mut board = Board::new();
        let mut piece = Piece::new(Shape::from_rows(&[&[1, 1, 1], &[0, 1, 0]]), GRAY);
        piece.set_position(Position::new(4.0, 5.0));

        // Recentered to (4.5, 4.5): cells (5,4) (4,5) (5,5) (5,6).
        board.set(5, 5, Some(GRAY));

        let result = try_rotate(&board, &mut piece, RotationDirection::Clockwise);
        assert_eq!(result, RotationResult::Kicked { dx: -1, dy: 0 });
        assert_eq!(piece.position(), Position::new(3.5, 4.5));
        assert_eq!(piece.rotation(), Rotation::Deg90);
    }
}
