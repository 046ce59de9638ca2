//! Board module - owns the locked-cell grid
//!
//! The board is a 10x20 grid where each cell is either empty or holds the color
//! of a locked block. Uses a flat array for cache locality and zero allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom).
//! Rows above the board (y < 0) are not stored; pieces may hang into them.

use crate::piece::Piece;
use crate::types::{Cell, BOARD_HEIGHT, BOARD_WIDTH};

/// Total number of cells on the board
const BOARD_SIZE: usize = BOARD_WIDTH * BOARD_HEIGHT;

/// The game board - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
    game_over: bool,
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
            game_over: false,
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i32 || y < 0 || y >= BOARD_HEIGHT as i32 {
            return None;
        }
        Some((y as usize) * BOARD_WIDTH + (x as usize))
    }

    pub fn width(&self) -> usize {
        BOARD_WIDTH
    }

    pub fn height(&self) -> usize {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Whether a single grid coordinate blocks a piece cell.
    ///
    /// Walls and the floor block; the space above the board never does.
    #[inline]
    pub fn blocks(&self, x: i32, y: i32) -> bool {
        if x < 0 || x >= BOARD_WIDTH as i32 || y >= BOARD_HEIGHT as i32 {
            return true;
        }
        y >= 0 && self.is_occupied(x, y)
    }

    /// True if any occupied cell of the piece hits a wall, the floor, or a
    /// locked block. Cells above the top edge never collide.
    pub fn is_collision(&self, piece: &Piece) -> bool {
        piece.cells().any(|(x, y)| self.blocks(x, y))
    }

    /// Lock a piece into the grid.
    ///
    /// Every occupied cell that lands inside the board is written, even when
    /// an earlier cell already triggered game over. A written cell on row 0
    /// (or, after clamping, above it) ends the game.
    ///
    /// Returns true if this placement ended the game.
    pub fn place(&mut self, piece: &Piece) -> bool {
        let color = piece.color();
        let mut topped_out = false;

        for (x, y) in piece.cells() {
            if self.set(x, y, Some(color)) && y <= 0 {
                topped_out = true;
            }
        }

        if topped_out {
            self.game_over = true;
        }
        topped_out
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= BOARD_HEIGHT {
            return false;
        }
        let start = y * BOARD_WIDTH;
        self.cells[start..start + BOARD_WIDTH]
            .iter()
            .all(|cell| cell.is_some())
    }

    /// Check if a row is completely empty
    pub fn is_row_empty(&self, y: usize) -> bool {
        if y >= BOARD_HEIGHT {
            return false;
        }
        let start = y * BOARD_WIDTH;
        self.cells[start..start + BOARD_WIDTH]
            .iter()
            .all(|cell| cell.is_none())
    }

    /// Clear a row and shift all rows above down by one.
    /// Row 0 becomes empty.
    fn clear_row(&mut self, y: usize) {
        let width = BOARD_WIDTH;

        for cell in &mut self.cells[y * width..(y + 1) * width] {
            *cell = None;
        }

        // copy_within handles the overlapping ranges
        for row in (1..=y).rev() {
            let src_start = (row - 1) * width;
            self.cells
                .copy_within(src_start..src_start + width, row * width);
        }

        for cell in &mut self.cells[0..width] {
            *cell = None;
        }
    }

    /// Clear every complete row and return how many were removed.
    ///
    /// Scans from the bottom up. After a row is cleared the rows above drop
    /// into its index, so the same index is checked again before moving up;
    /// stacked complete rows are all counted.
    pub fn clear_completed_lines(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = BOARD_HEIGHT;

        while y > 0 {
            let row = y - 1;
            if self.is_row_full(row) {
                self.clear_row(row);
                cleared += 1;
            } else {
                y -= 1;
            }
        }

        cleared
    }

    /// Set once a placement writes into the top row.
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(BOARD_WIDTH)
    }

    /// Number of occupied cells on the board
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Empty the grid and clear the game-over flag
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
        self.game_over = false;
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{Position, Shape};
    use crate::types::Rgb;

    const RED: Rgb = Rgb::new(255, 0, 0);

    fn fill_row(board: &mut Board, y: i32) {
        for x in 0..BOARD_WIDTH as i32 {
            board.set(x, y, Some(RED));
        }
    }

    fn square_at(x: f32, y: f32) -> Piece {
        let mut piece = Piece::new(Shape::from_rows(&[&[1, 1], &[1, 1]]), RED);
        piece.set_position(Position::new(x, y));
        piece
    }

    #[test]
    fn test_board_index_calculation() {
        assert_eq!(Board::index(0, 0), Some(0));
        assert_eq!(Board::index(9, 0), Some(9));
        assert_eq!(Board::index(0, 1), Some(10));
        assert_eq!(Board::index(9, 19), Some(199));
        assert_eq!(Board::index(-1, 0), None);
        assert_eq!(Board::index(10, 0), None);
        assert_eq!(Board::index(0, 20), None);
    }

    #[test]
    fn test_blocks_walls_floor_and_sky() {
        let board = Board::new();
        assert!(board.blocks(-1, 5));
        assert!(board.blocks(10, 5));
        assert!(board.blocks(3, 20));
        assert!(!board.blocks(3, -4));
        assert!(!board.blocks(3, 19));
    }

    #[test]
    fn test_collision_ignores_cells_above_board() {
        let board = Board::new();
        assert!(!board.is_collision(&square_at(4.0, -2.0)));
        assert!(!board.is_collision(&square_at(4.0, -1.0)));
        assert!(board.is_collision(&square_at(-1.0, -2.0)));
    }

    #[test]
    fn test_place_writes_all_cells_even_on_game_over() {
        let mut board = Board::new();
        assert!(board.place(&square_at(4.0, 0.0)));
        assert!(board.is_game_over());
        assert_eq!(board.filled_count(), 4);
        assert!(board.is_occupied(4, 0));
        assert!(board.is_occupied(5, 1));
    }

    #[test]
    fn test_place_above_board_only_writes_visible_cells() {
        let mut board = Board::new();
        // Top row of the square sits at y = -1, bottom row at y = 0.
        assert!(board.place(&square_at(2.0, -1.0)));
        assert_eq!(board.filled_count(), 2);
        assert!(board.is_occupied(2, 0));
        assert!(board.is_occupied(3, 0));
    }

    #[test]
    fn test_place_low_is_not_game_over() {
        let mut board = Board::new();
        assert!(!board.place(&square_at(0.0, 18.0)));
        assert!(!board.is_game_over());
    }

    #[test]
    fn test_clear_rechecks_same_index() {
        let mut board = Board::new();
        fill_row(&mut board, 17);
        fill_row(&mut board, 18);
        fill_row(&mut board, 19);
        board.set(0, 16, Some(RED));

        assert_eq!(board.clear_completed_lines(), 3);
        assert!(board.is_occupied(0, 19));
        assert_eq!(board.filled_count(), 1);
    }

    #[test]
    fn test_reset_clears_game_over() {
        let mut board = Board::new();
        board.place(&square_at(0.0, 0.0));
        assert!(board.is_game_over());
        board.reset();
        assert!(!board.is_game_over());
        assert_eq!(board.filled_count(), 0);
    }
}
