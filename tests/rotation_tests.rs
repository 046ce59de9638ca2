//! Rotation tests - full cycles and the wall-kick probe order

use blockfall::core::{try_rotate, Board, Catalog, Piece, Position, RotationResult, Shape};
use blockfall::types::{Rgb, Rotation, RotationDirection};

const CYAN: Rgb = Rgb::new(0, 240, 240);
const GRAY: Rgb = Rgb::new(90, 90, 90);

#[test]
fn test_four_rotations_restore_every_standard_piece() {
    let board = Board::new();
    let catalog = Catalog::standard().unwrap();

    for direction in [RotationDirection::Clockwise, RotationDirection::CounterClockwise] {
        for template in catalog.templates() {
            let mut piece = template.spawn();
            piece.set_position(Position::new(4.0, 8.0));
            let original = piece.clone();

            for _ in 0..4 {
                assert!(try_rotate(&board, &mut piece, direction).succeeded());
            }
            assert_eq!(piece.shape(), original.shape());
            assert_eq!(piece.rotation(), Rotation::Deg0);
            assert_eq!(piece.position(), original.position());
        }
    }
}

#[test]
fn test_rotation_state_follows_direction() {
    let board = Board::new();
    let mut piece = Piece::new(Shape::from_rows(&[&[1, 1, 1], &[0, 1, 0]]), CYAN);
    piece.set_position(Position::new(4.0, 8.0));

    try_rotate(&board, &mut piece, RotationDirection::CounterClockwise);
    assert_eq!(piece.rotation(), Rotation::Deg270);
    try_rotate(&board, &mut piece, RotationDirection::Clockwise);
    try_rotate(&board, &mut piece, RotationDirection::Clockwise);
    assert_eq!(piece.rotation(), Rotation::Deg90);
}

#[test]
fn test_wall_kick_takes_first_free_offset() {
    let mut board = Board::new();
    // Vertical bar against the left wall.
    let mut piece = Piece::new(Shape::from_rows(&[&[1], &[1], &[1], &[1]]), CYAN);
    piece.set_position(Position::new(0.0, 10.0));

    // Recentered to (-1.5, 11.5), which pokes through the wall. Of the six
    // offsets only (+1, 0) fits once (+1, +1) is blocked on row 12.
    for x in 1..=3 {
        board.set(x, 12, Some(GRAY));
    }

    let result = try_rotate(&board, &mut piece, RotationDirection::Clockwise);
    assert_eq!(result, RotationResult::Kicked { dx: 1, dy: 0 });
    assert_eq!(piece.position(), Position::new(-0.5, 11.5));
    assert_eq!(piece.rotation(), Rotation::Deg90);
    let cells: Vec<_> = piece.cells().collect();
    assert_eq!(cells, vec![(0, 11), (1, 11), (2, 11), (3, 11)]);
}

#[test]
fn test_kick_down_when_row_is_blocked() {
    let mut board = Board::new();
    let mut piece = Piece::new(Shape::from_rows(&[&[1], &[1], &[1], &[1]]), CYAN);
    piece.set_position(Position::new(4.0, 10.0));

    // Recentered to (2.5, 11.5): cells (2..=5, 11). Block row 11 around it
    // so every y+0 candidate fails and (-1, +1) is the first fit.
    board.set(5, 11, Some(GRAY));
    board.set(1, 11, Some(GRAY));
    board.set(6, 11, Some(GRAY));

    let result = try_rotate(&board, &mut piece, RotationDirection::Clockwise);
    assert_eq!(result, RotationResult::Kicked { dx: -1, dy: 1 });
    assert_eq!(piece.position(), Position::new(1.5, 12.5));
}

#[test]
fn test_failed_rotation_reverts_everything() {
    let mut board = Board::new();
    let mut piece = Piece::new(Shape::from_rows(&[&[1], &[1], &[1], &[1]]), CYAN);
    piece.set_position(Position::new(4.0, 10.0));
    for y in 10..=14 {
        for x in 0..10 {
            if x != 4 {
                board.set(x, y, Some(GRAY));
            }
        }
    }
    let before = piece.clone();

    let result = try_rotate(&board, &mut piece, RotationDirection::CounterClockwise);
    assert_eq!(result, RotationResult::Blocked);
    assert_eq!(piece, before);
}
