//! Piece module - shape matrices and the falling piece entity
//!
//! A [`Shape`] is a small row-major matrix of occupied/empty cells. A [`Piece`]
//! pairs a shape with a color, a position and a rotation state.
//!
//! Positions are stored as `f32` because rotation recentering moves a piece by
//! half cells (a 1x4 bar becoming 4x1 shifts by 1.5). Grid coordinates are
//! obtained by truncating toward zero, so a piece at x = -0.5 occupies column 0.

use std::ops::Add;

use crate::types::{Rgb, Rotation, RotationDirection, BOARD_WIDTH};

/// Occupancy matrix of a piece in its current orientation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: usize,
    cols: usize,
    /// Row-major (row * cols + col)
    cells: Vec<bool>,
}

impl Shape {
    /// Build a shape from already validated dimensions and cells.
    pub(crate) fn from_cells(rows: usize, cols: usize, cells: Vec<bool>) -> Self {
        debug_assert_eq!(rows * cols, cells.len());
        Self { rows, cols, cells }
    }

    /// Build a shape from 0/1 rows (non-zero counts as occupied).
    ///
    /// Rows shorter than the first one are padded with empty cells.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut cells = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            for col in 0..cols {
                cells.push(row.get(col).copied().unwrap_or(0) != 0);
            }
        }
        Self::from_cells(rows.len(), cols, cells)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Check a local cell; out-of-range cells are empty
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.cells[row * self.cols + col]
    }

    /// Occupied local cells as (row, col), row-major order
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, filled)| **filled)
            .map(move |(i, _)| (i / cols, i % cols))
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    /// Return this shape turned 90° in the given direction.
    ///
    /// The result is `cols × rows`. Clockwise maps `[i][j]` to
    /// `[j][rows-1-i]`; counter-clockwise maps `[i][j]` to `[cols-1-j][i]`.
    pub fn rotated(&self, direction: RotationDirection) -> Shape {
        let (rows, cols) = (self.rows, self.cols);
        let mut out = vec![false; rows * cols];

        // Output has `rows` columns.
        for i in 0..rows {
            for j in 0..cols {
                let (oi, oj) = match direction {
                    RotationDirection::Clockwise => (j, rows - 1 - i),
                    RotationDirection::CounterClockwise => (cols - 1 - j, i),
                };
                out[oi * rows + oj] = self.cells[i * cols + j];
            }
        }

        Shape::from_cells(cols, rows, out)
    }
}

/// Shape origin in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Grid cell of the origin (truncated toward zero).
    #[inline]
    pub fn cell(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Column where a shape of the given width spawns.
pub fn spawn_position(shape: &Shape) -> Position {
    let x = (BOARD_WIDTH / 2) as i32 - (shape.cols() / 2) as i32;
    Position::new(x as f32, 0.0)
}

/// A piece: shape in its current orientation, color, position and rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    shape: Shape,
    color: Rgb,
    position: Position,
    rotation: Rotation,
}

impl Piece {
    /// Create a piece at the origin with rotation 0
    pub fn new(shape: Shape, color: Rgb) -> Self {
        Self {
            shape,
            color,
            position: Position::default(),
            rotation: Rotation::Deg0,
        }
    }

    /// Create a piece at its spawn position (horizontally centered, top row)
    pub fn spawned(shape: Shape, color: Rgb) -> Self {
        let position = spawn_position(&shape);
        Self {
            position,
            ..Self::new(shape, color)
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Grid coordinates of every occupied cell
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (ox, oy) = self.position.cell();
        self.shape
            .occupied()
            .map(move |(row, col)| (ox + col as i32, oy + row as i32))
    }

    /// Move by whole cells
    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.position = self.position + Position::new(dx as f32, dy as f32);
    }

    /// Turn the shape matrix and advance the rotation state.
    ///
    /// Position is untouched; recentering belongs to the kick resolver.
    pub fn rotate(&mut self, direction: RotationDirection) {
        self.shape = self.shape.rotated(direction);
        self.rotation = direction.apply(self.rotation);
    }

    /// Shape and color only, as stored in the hold slot.
    pub fn stowed(&self) -> Piece {
        Piece::new(self.shape.clone(), self.color)
    }

    /// Fresh copy at the spawn position with rotation 0, keeping the shape as-is.
    pub fn respawned(&self) -> Piece {
        Piece::spawned(self.shape.clone(), self.color)
    }
}
