//! Shared types and constants for the blockfall workspace.
//!
//! Everything here is plain data: board dimensions, timing constants, block
//! colors, rotation states, logical input actions, presentation events and the
//! session state tag. The rules engine (`blockfall-core`) and the input layer
//! (`blockfall-input`) both build on these definitions.
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9, left to right)
//! - **Height**: 20 rows (indexed 0-19, top to bottom)
//!
//! Pieces may extend above row 0; those cells are never part of the grid.
//!
//! # Timing Constants
//!
//! All timers are integer milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Runner frame interval (~60 FPS) |
//! | `MOVE_COOLDOWN_MS` | 125 | Repeat gate for horizontal moves and soft drop |
//! | `ROTATE_COOLDOWN_MS` | 200 | Repeat gate for rotations |
//! | `KEY_PRESS_COOLDOWN_MS` | 200 | Game-over screen input gate |
//! | `BASE_FALL_INTERVAL_MS` | 500 | Gravity at level 1 |
//! | `FALL_INTERVAL_STEP_MS` | 50 | Gravity speed-up per level |
//! | `MIN_FALL_INTERVAL_MS` | 100 | Gravity floor |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{InputAction, Rotation, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! assert_eq!(Rotation::Deg0.rotate_cw(), Rotation::Deg90);
//! assert_eq!(InputAction::from_str("movelEft"), Some(InputAction::MoveLeft));
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

use serde::{Deserialize, Serialize};

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: usize = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: usize = 20;

/// Runner frame interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Minimum time between two horizontal moves or soft-drop steps.
pub const MOVE_COOLDOWN_MS: u32 = 125;

/// Minimum time between two rotations.
pub const ROTATE_COOLDOWN_MS: u32 = 200;

/// Input gate on the game-over screen.
pub const KEY_PRESS_COOLDOWN_MS: u32 = 200;

/// Gravity interval at level 1.
pub const BASE_FALL_INTERVAL_MS: u32 = 500;

/// Gravity interval reduction per level above 1.
pub const FALL_INTERVAL_STEP_MS: u32 = 50;

/// Gravity never gets faster than this.
pub const MIN_FALL_INTERVAL_MS: u32 = 100;

/// Points for a single line at level 1. Doubles for every extra line.
pub const BASE_LINE_SCORE: u32 = 10;

/// Lines needed per level.
pub const LINES_PER_LEVEL: u32 = 10;

/// Highest level selectable on the options screen.
pub const MAX_START_LEVEL: u32 = 10;

/// Number of entries kept on the highscore list.
pub const MAX_HIGHSCORES: usize = 10;

/// Maximum length of a highscore name.
pub const MAX_NAME_LEN: usize = 10;

/// Highscore rows visible at once on the game-over screen.
pub const HIGHSCORE_PAGE_SIZE: usize = 5;

/// Opaque block color as stored in the grid.
///
/// Serialized as a `[r, g, b]` triple, which is also the format of the piece
/// definition file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

/// A cell on the game board
///
/// - `None`: Empty cell
/// - `Some(Rgb)`: Locked block of the given color
pub type Cell = Option<Rgb>;

/// Rotation state of a piece relative to its catalog layout.
///
/// The cycle goes: 0° → 90° → 180° → 270° → 0° (clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::Rotation;
    ///
    /// assert_eq!(Rotation::Deg0.rotate_cw(), Rotation::Deg90);
    /// assert_eq!(Rotation::Deg270.rotate_cw(), Rotation::Deg0);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Rotate counter-clockwise (+3 mod 4)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::Rotation;
    ///
    /// assert_eq!(Rotation::Deg0.rotate_ccw(), Rotation::Deg270);
    /// assert_eq!(Rotation::Deg90.rotate_ccw(), Rotation::Deg0);
    /// ```
    pub fn rotate_ccw(&self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Quarter turns from the spawn orientation (0-3).
    pub fn index(&self) -> u8 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    /// Build from a quarter-turn count, taken mod 4.
    pub fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Rotation::Deg0,
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }

    pub fn degrees(&self) -> u16 {
        self.index() as u16 * 90
    }
}

/// Direction of a requested rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

impl RotationDirection {
    /// Apply this direction to a rotation state.
    pub fn apply(&self, rotation: Rotation) -> Rotation {
        match self {
            RotationDirection::Clockwise => rotation.rotate_cw(),
            RotationDirection::CounterClockwise => rotation.rotate_ccw(),
        }
    }
}

/// Logical input actions consumed by the session.
///
/// The session never sees raw device state, only whether an action was
/// pressed this tick (edge) or is held down (level).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateClockwise,
    RotateCounterClockwise,
    HoldPiece,
    Pause,
    Quit,
    MenuUp,
    MenuDown,
    MenuLeft,
    MenuRight,
    MenuSelect,
    MenuBack,
    ShowControls,
    ReloadCatalog,
}

impl InputAction {
    /// Every action, in configuration file order.
    pub const ALL: [InputAction; 17] = [
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::SoftDrop,
        InputAction::HardDrop,
        InputAction::RotateClockwise,
        InputAction::RotateCounterClockwise,
        InputAction::HoldPiece,
        InputAction::Pause,
        InputAction::Quit,
        InputAction::MenuUp,
        InputAction::MenuDown,
        InputAction::MenuLeft,
        InputAction::MenuRight,
        InputAction::MenuSelect,
        InputAction::MenuBack,
        InputAction::ShowControls,
        InputAction::ReloadCatalog,
    ];

    /// Parse an action from its configuration name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::InputAction;
    ///
    /// assert_eq!(InputAction::from_str("HardDrop"), Some(InputAction::HardDrop));
    /// assert_eq!(InputAction::from_str("holdpiece"), Some(InputAction::HoldPiece));
    /// assert_eq!(InputAction::from_str("jump"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|action| action.as_str().eq_ignore_ascii_case(s))
    }

    /// Configuration name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            InputAction::MoveLeft => "MoveLeft",
            InputAction::MoveRight => "MoveRight",
            InputAction::SoftDrop => "SoftDrop",
            InputAction::HardDrop => "HardDrop",
            InputAction::RotateClockwise => "RotateClockwise",
            InputAction::RotateCounterClockwise => "RotateCounterClockwise",
            InputAction::HoldPiece => "HoldPiece",
            InputAction::Pause => "Pause",
            InputAction::Quit => "Quit",
            InputAction::MenuUp => "MenuUp",
            InputAction::MenuDown => "MenuDown",
            InputAction::MenuLeft => "MenuLeft",
            InputAction::MenuRight => "MenuRight",
            InputAction::MenuSelect => "MenuSelect",
            InputAction::MenuBack => "MenuBack",
            InputAction::ShowControls => "ShowControls",
            InputAction::ReloadCatalog => "ReloadCatalog",
        }
    }
}

/// Discrete events for audio and render collaborators.
///
/// The session queues these and never waits for anyone to consume them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The current piece rotated (possibly after a wall kick).
    PieceRotated,
    /// A piece was locked into the grid.
    PieceLanded,
    /// One or more rows were cleared by the last lock.
    LinesCleared(u32),
    /// The level changed after a line clear.
    LevelUp(u32),
    /// A hard drop was performed.
    HardDropped,
    Paused,
    Resumed,
    GameOver,
    /// The options screen changed the selected music track.
    MusicSelected(u32),
}

/// Top-level state of a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    TitleScreen,
    OptionsSelect,
    Playing,
    Paused,
    GameOver,
    ControlsHelp,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::TitleScreen => "title",
            SessionState::OptionsSelect => "options",
            SessionState::Playing => "playing",
            SessionState::Paused => "paused",
            SessionState::GameOver => "game_over",
            SessionState::ControlsHelp => "controls",
        }
    }
}
