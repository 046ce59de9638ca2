//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains the rules of the game: the board, piece geometry,
//! rotation with wall kicks, scoring, the piece catalog and the session state
//! machine. It draws nothing and reads no devices; the only I/O is loading the
//! piece catalog and persisting highscores, both behind explicit types.
//!
//! - **Deterministic**: the same seed and input sequence produce the same game
//! - **Testable**: every rule is reachable without a terminal
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid with collision, placement and line clearing
//! - [`piece`]: shape matrices, positions and the falling piece
//! - [`kick`]: rotation with recentering and a fixed list of kick offsets
//! - [`catalog`]: piece templates loaded from JSON
//! - [`scoring`]: line score, level and gravity interval
//! - [`rng`]: seeded LCG used to pick templates
//! - [`input`]: the per-tick input interface the session consumes
//! - [`highscore`]: ranking rules and highscore stores
//! - [`session`]: the state machine tying everything together
//!
//! # Game Rules
//!
//! - Pieces are picked uniformly at random from the catalog
//! - Rotation turns the shape matrix and probes six kick offsets on collision
//! - Clearing `n` lines scores `10 * 2^(n-1) * level`; every 10 lines is a level
//! - Gravity starts at 500ms per row and speeds up 50ms per level, down to 100ms
//! - Hold works once per piece and is re-armed when a piece locks
//! - Placing a block on the top row ends the game
//!
//! # Example
//!
//! ```
//! use blockfall_core::{Catalog, InputFrame, MemoryHighscores, Session, SessionOptions};
//! use blockfall_core::types::{GameEvent, InputAction, SessionState};
//!
//! let catalog = Catalog::standard().unwrap();
//! let mut session = Session::new(catalog, MemoryHighscores::new(), SessionOptions::default());
//!
//! session.start_game(1);
//! assert_eq!(session.state(), SessionState::Playing);
//!
//! session.tick(&InputFrame::pressing(InputAction::HardDrop), 16);
//! assert!(session.take_events().contains(&GameEvent::PieceLanded));
//! assert_eq!(session.board().filled_count(), 4);
//! ```

pub mod board;
pub mod catalog;
pub mod highscore;
pub mod input;
pub mod kick;
pub mod piece;
pub mod rng;
pub mod scoring;
pub mod session;

pub use blockfall_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use catalog::{Catalog, DataFormatError, PieceTemplate};
pub use highscore::{
    insert_ranked, insertion_index, is_new_highscore, HighscoreEntry, HighscoreError,
    HighscoreStore, JsonFileHighscores, MemoryHighscores, NameEntry,
};
pub use input::{InputFrame, InputSource};
pub use kick::{try_rotate, RotationResult, KICK_OFFSETS};
pub use piece::{Piece, Position, Shape};
pub use rng::SimpleRng;
pub use scoring::{calculate_level, calculate_line_score, fall_interval_ms, ScoreKeeper, ScoreResult};
pub use session::{EventQueue, Session, SessionOptions};
