//! Game session - the state machine that drives a game
//!
//! A [`Session`] owns the board, the current/next/held pieces, the score
//! keeper, the piece catalog and the highscore store. The runner calls
//! [`Session::tick`] once per frame with the elapsed milliseconds and an
//! [`InputSource`]; everything else (rendering, audio) only reads state and
//! drains [`GameEvent`]s.
//!
//! States and transitions:
//!
//! ```text
//! TitleScreen --select--> OptionsSelect --select--> Playing <--pause--> Paused
//!      ^  |                    |                       |                  |
//!      |  +--controls--> ControlsHelp                  | lock + top out   |
//!      |                       |                       v                  |
//!      +-------back------------+----back-------- GameOver <---------------+ (back)
//! ```
//!
//! While playing, timers are integer millisecond accumulators. Locking a piece
//! and promoting the next one happen inside a single call, so no input is ever
//! applied to a half-spawned piece.

use arrayvec::ArrayVec;
use tracing::{debug, info, warn};

use crate::board::Board;
use crate::catalog::Catalog;
use crate::highscore::{insertion_index, HighscoreEntry, HighscoreStore, NameEntry};
use crate::input::InputSource;
use crate::kick::{try_rotate, RotationResult};
use crate::piece::{Piece, Position};
use crate::rng::SimpleRng;
use crate::scoring::ScoreKeeper;
use crate::types::{
    GameEvent, InputAction, RotationDirection, SessionState, HIGHSCORE_PAGE_SIZE,
    KEY_PRESS_COOLDOWN_MS, MAX_START_LEVEL, MOVE_COOLDOWN_MS, ROTATE_COOLDOWN_MS,
};

/// Events buffered between two drains. Overflow is dropped.
pub const EVENT_QUEUE_CAPACITY: usize = 32;

/// Event buffer handed out by [`Session::take_events`].
pub type EventQueue = ArrayVec<GameEvent, EVENT_QUEUE_CAPACITY>;

/// Construction-time settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Level preselected on the options screen (clamped to 1..=10).
    pub start_level: u32,
    pub seed: u32,
    /// Selectable music tracks, inclusive.
    pub min_music_track: u32,
    pub max_music_track: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            start_level: 1,
            seed: 1,
            min_music_track: 1,
            max_music_track: 5,
        }
    }
}

/// One game session from title screen to game over and back.
#[derive(Debug)]
pub struct Session<S: HighscoreStore> {
    state: SessionState,
    board: Board,
    catalog: Catalog,
    rng: SimpleRng,
    store: S,

    current: Piece,
    next: Piece,
    held: Option<Piece>,
    can_hold: bool,

    scores: ScoreKeeper,
    fall_interval_ms: u32,
    fall_timer_ms: u32,
    move_timer_ms: u32,
    rotate_timer_ms: u32,
    key_press_timer_ms: u32,

    selected_level: u32,
    selected_music: u32,
    min_music_track: u32,
    max_music_track: u32,

    name_entry: Option<NameEntry>,
    highscores: Vec<HighscoreEntry>,
    highscore_index: Option<usize>,
    scroll_offset: usize,

    events: EventQueue,
    quit_requested: bool,
}

impl<S: HighscoreStore> Session<S> {
    pub fn new(catalog: Catalog, store: S, options: SessionOptions) -> Self {
        let mut rng = SimpleRng::new(options.seed);
        let current = catalog.spawn_random(&mut rng);
        let next = catalog.spawn_random(&mut rng);
        let scores = ScoreKeeper::new();
        let fall_interval_ms = scores.fall_interval_ms();
        let min_music_track = options.min_music_track.min(options.max_music_track);

        Self {
            state: SessionState::TitleScreen,
            board: Board::new(),
            catalog,
            rng,
            store,
            current,
            next,
            held: None,
            can_hold: true,
            scores,
            fall_interval_ms,
            fall_timer_ms: 0,
            move_timer_ms: 0,
            rotate_timer_ms: 0,
            key_press_timer_ms: 0,
            selected_level: options.start_level.clamp(1, MAX_START_LEVEL),
            selected_music: min_music_track,
            min_music_track,
            max_music_track: options.max_music_track,
            name_entry: None,
            highscores: Vec::new(),
            highscore_index: None,
            scroll_offset: 0,
            events: EventQueue::new(),
            quit_requested: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct grid access for preset positions (puzzles, tests).
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn current(&self) -> &Piece {
        &self.current
    }

    pub fn next(&self) -> &Piece {
        &self.next
    }

    pub fn held(&self) -> Option<&Piece> {
        self.held.as_ref()
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn score(&self) -> u32 {
        self.scores.score()
    }

    pub fn level(&self) -> u32 {
        self.scores.level()
    }

    pub fn total_lines(&self) -> u32 {
        self.scores.total_lines()
    }

    /// Gravity interval in effect, in milliseconds
    pub fn fall_interval_ms(&self) -> u32 {
        self.fall_interval_ms
    }

    pub fn selected_level(&self) -> u32 {
        self.selected_level
    }

    pub fn selected_music(&self) -> u32 {
        self.selected_music
    }

    pub fn music_range(&self) -> (u32, u32) {
        (self.min_music_track, self.max_music_track)
    }

    /// Name being typed for a new highscore, if any
    pub fn name_entry(&self) -> Option<&NameEntry> {
        self.name_entry.as_ref()
    }

    /// Highscore list as loaded when the game ended
    pub fn highscores(&self) -> &[HighscoreEntry] {
        &self.highscores
    }

    /// Rank the finished game takes on the list, if it made it
    pub fn highscore_index(&self) -> Option<usize> {
        self.highscore_index
    }

    /// First visible row of the highscore list
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// The player asked to leave from the title screen.
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Drain queued events, oldest first.
    pub fn take_events(&mut self) -> EventQueue {
        std::mem::take(&mut self.events)
    }

    /// Advance the session by one frame.
    pub fn tick(&mut self, input: &impl InputSource, elapsed_ms: u32) {
        if input.pressed(InputAction::ReloadCatalog) {
            self.reload_catalog();
        }

        match self.state {
            SessionState::TitleScreen => self.tick_title(input),
            SessionState::ControlsHelp => {
                if input.pressed(InputAction::MenuBack) {
                    self.set_state(SessionState::TitleScreen);
                }
            }
            SessionState::OptionsSelect => self.tick_options(input),
            SessionState::Playing => self.tick_playing(input, elapsed_ms),
            SessionState::Paused => {
                if input.pressed(InputAction::Pause) {
                    self.push_event(GameEvent::Resumed);
                    self.set_state(SessionState::Playing);
                } else if input.pressed(InputAction::MenuBack) {
                    self.set_state(SessionState::TitleScreen);
                }
            }
            SessionState::GameOver => self.tick_game_over(input, elapsed_ms),
        }
    }

    fn tick_title(&mut self, input: &impl InputSource) {
        if input.pressed(InputAction::MenuSelect) {
            self.set_state(SessionState::OptionsSelect);
        } else if input.pressed(InputAction::Quit) {
            info!("quit requested");
            self.quit_requested = true;
        } else if input.pressed(InputAction::ShowControls) {
            self.set_state(SessionState::ControlsHelp);
        }
    }

    fn tick_options(&mut self, input: &impl InputSource) {
        if input.pressed(InputAction::MenuLeft) {
            self.selected_level = self.selected_level.saturating_sub(1).max(1);
        } else if input.pressed(InputAction::MenuRight) {
            self.selected_level = (self.selected_level + 1).min(MAX_START_LEVEL);
        } else if input.pressed(InputAction::MenuDown) {
            self.select_music(self.selected_music.saturating_sub(1));
        } else if input.pressed(InputAction::MenuUp) {
            self.select_music(self.selected_music.saturating_add(1));
        }

        if input.pressed(InputAction::MenuSelect) {
            self.start_game(self.selected_level);
        } else if input.pressed(InputAction::MenuBack) {
            self.set_state(SessionState::TitleScreen);
        }
    }

    fn select_music(&mut self, track: u32) {
        let track = track.clamp(self.min_music_track, self.max_music_track);
        if track != self.selected_music {
            self.selected_music = track;
            self.push_event(GameEvent::MusicSelected(track));
        }
    }

    fn tick_playing(&mut self, input: &impl InputSource, elapsed_ms: u32) {
        self.fall_timer_ms = self.fall_timer_ms.saturating_add(elapsed_ms);
        self.move_timer_ms = self.move_timer_ms.saturating_add(elapsed_ms);
        self.rotate_timer_ms = self.rotate_timer_ms.saturating_add(elapsed_ms);

        if self.move_timer_ms >= MOVE_COOLDOWN_MS {
            if input.down(InputAction::MoveLeft) {
                self.try_move(-1, 0);
                self.move_timer_ms = 0;
            } else if input.down(InputAction::MoveRight) {
                self.try_move(1, 0);
                self.move_timer_ms = 0;
            }

            if input.down(InputAction::SoftDrop) && self.try_move(0, 1) {
                self.fall_timer_ms = 0;
                self.move_timer_ms = 0;
            }
        }

        if input.pressed(InputAction::HardDrop) {
            self.hard_drop();
            if self.state != SessionState::Playing {
                return;
            }
        }

        if input.pressed(InputAction::HoldPiece) {
            self.hold();
        }

        if self.rotate_timer_ms >= ROTATE_COOLDOWN_MS {
            if input.pressed(InputAction::RotateClockwise) {
                self.rotate(RotationDirection::Clockwise);
                self.rotate_timer_ms = 0;
            } else if input.pressed(InputAction::RotateCounterClockwise) {
                self.rotate(RotationDirection::CounterClockwise);
                self.rotate_timer_ms = 0;
            }
        }

        if self.fall_timer_ms >= self.fall_interval_ms {
            self.fall_timer_ms = 0;
            if !self.try_move(0, 1) {
                self.lock_piece();
                if self.state != SessionState::Playing {
                    return;
                }
            }
        }

        if input.pressed(InputAction::Pause) {
            self.push_event(GameEvent::Paused);
            self.set_state(SessionState::Paused);
        }
    }

    fn tick_game_over(&mut self, input: &impl InputSource, elapsed_ms: u32) {
        self.key_press_timer_ms = self.key_press_timer_ms.saturating_add(elapsed_ms);

        if self.name_entry.is_some() {
            if input.pressed(InputAction::MenuSelect) {
                self.submit_name();
            }
            return;
        }

        if self.key_press_timer_ms < KEY_PRESS_COOLDOWN_MS {
            return;
        }

        if input.pressed(InputAction::MenuBack) {
            self.scroll_offset = 0;
            self.key_press_timer_ms = 0;
            self.set_state(SessionState::TitleScreen);
        } else if input.pressed(InputAction::MenuUp) && self.scroll_offset > 0 {
            self.scroll_offset -= 1;
            self.key_press_timer_ms = 0;
        } else if input.pressed(InputAction::MenuDown)
            && self.scroll_offset + HIGHSCORE_PAGE_SIZE < self.highscores.len()
        {
            self.scroll_offset += 1;
            self.key_press_timer_ms = 0;
        }
    }

    /// Reset board, score and pieces and start playing at `level`.
    pub fn start_game(&mut self, level: u32) {
        self.board.reset();
        self.scores.reset();
        self.scores.set_level(level);
        self.fall_interval_ms = self.scores.fall_interval_ms();

        self.current = self.catalog.spawn_random(&mut self.rng);
        self.next = self.catalog.spawn_random(&mut self.rng);
        self.held = None;
        self.can_hold = true;

        self.fall_timer_ms = 0;
        self.move_timer_ms = 0;
        self.rotate_timer_ms = 0;
        self.name_entry = None;
        self.highscore_index = None;

        info!(level = self.scores.level(), seed = self.rng.seed(), "game started");
        self.set_state(SessionState::Playing);
    }

    /// Shift the current piece by whole cells. Returns false (and leaves the
    /// piece alone) if the target collides.
    pub fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        self.current.translate(dx, dy);
        if self.board.is_collision(&self.current) {
            self.current.translate(-dx, -dy);
            return false;
        }
        true
    }

    /// Rotate the current piece through the kick resolver.
    pub fn rotate(&mut self, direction: RotationDirection) -> RotationResult {
        let result = try_rotate(&self.board, &mut self.current, direction);
        if result.succeeded() {
            self.push_event(GameEvent::PieceRotated);
        }
        result
    }

    /// Drop the current piece to the floor and lock it. Returns rows dropped.
    pub fn hard_drop(&mut self) -> u32 {
        let mut rows = 0;
        while self.try_move(0, 1) {
            rows += 1;
        }
        self.push_event(GameEvent::HardDropped);
        self.lock_piece();
        rows
    }

    /// Stash the current piece or swap it with the held one.
    ///
    /// Allowed once per locked piece; returns false when it was a no-op.
    pub fn hold(&mut self) -> bool {
        if !self.can_hold {
            return false;
        }

        match self.held.take() {
            None => {
                self.held = Some(self.current.stowed());
                self.promote_next();
            }
            Some(held) => {
                let previous = std::mem::replace(&mut self.current, held.respawned());
                self.held = Some(previous.stowed());
            }
        }

        self.can_hold = false;
        true
    }

    /// Commit the current piece, clear lines, score, then either end the
    /// game or bring in the next piece.
    pub fn lock_piece(&mut self) {
        self.board.place(&self.current);
        self.push_event(GameEvent::PieceLanded);

        let lines = self.board.clear_completed_lines();
        let result = self.scores.register_lines_cleared(lines);
        if lines > 0 {
            self.push_event(GameEvent::LinesCleared(lines));
        }
        if result.leveled_up() {
            self.push_event(GameEvent::LevelUp(result.level_after));
        }
        self.fall_interval_ms = self.scores.fall_interval_ms();

        debug!(
            lines,
            points = result.points,
            score = self.scores.score(),
            level = self.scores.level(),
            "piece locked"
        );

        if self.board.is_game_over() {
            self.enter_game_over();
            return;
        }

        self.promote_next();
        self.can_hold = true;
    }

    fn promote_next(&mut self) {
        let fresh = self.catalog.spawn_random(&mut self.rng);
        self.current = std::mem::replace(&mut self.next, fresh);
    }

    fn enter_game_over(&mut self) {
        self.push_event(GameEvent::GameOver);

        self.highscores = self.store.load_all();
        self.highscore_index = insertion_index(&self.highscores, self.scores.score());
        self.name_entry = self.highscore_index.map(|_| NameEntry::new());
        self.scroll_offset = 0;
        self.key_press_timer_ms = 0;

        info!(
            score = self.scores.score(),
            level = self.scores.level(),
            lines = self.scores.total_lines(),
            rank = ?self.highscore_index,
            "game over"
        );
        self.set_state(SessionState::GameOver);
    }

    fn name_key_ready(&self) -> bool {
        self.state == SessionState::GameOver
            && self.name_entry.is_some()
            && self.key_press_timer_ms >= KEY_PRESS_COOLDOWN_MS
    }

    /// Type one letter of the highscore name.
    pub fn type_name_char(&mut self, c: char) -> bool {
        if !self.name_key_ready() {
            return false;
        }
        let accepted = self.name_entry.as_mut().is_some_and(|name| name.push(c));
        if accepted {
            self.key_press_timer_ms = 0;
        }
        accepted
    }

    /// Remove the last letter of the highscore name.
    pub fn erase_name_char(&mut self) -> bool {
        if !self.name_key_ready() {
            return false;
        }
        let erased = self.name_entry.as_mut().is_some_and(|name| name.backspace());
        if erased {
            self.key_press_timer_ms = 0;
        }
        erased
    }

    /// Save the typed name with this game's result and return to the title.
    ///
    /// Does nothing while the name is empty. A failing store is logged; the
    /// session carries on either way.
    pub fn submit_name(&mut self) -> bool {
        if !self.name_key_ready() {
            return false;
        }
        let Some(name) = self.name_entry.as_ref().and_then(|n| n.submit()) else {
            return false;
        };

        let entry = HighscoreEntry::new(
            name,
            self.scores.score(),
            self.scores.level(),
            self.scores.total_lines(),
        );
        info!(name = %entry.name, score = entry.score, "saving highscore");
        if let Err(e) = self.store.save(entry) {
            warn!(error = %e, "highscore not saved");
        }

        self.highscores = self.store.load_all();
        self.name_entry = None;
        self.scroll_offset = 0;
        self.key_press_timer_ms = 0;
        self.set_state(SessionState::TitleScreen);
        true
    }

    /// Swap in a freshly loaded catalog. On failure the current one stays.
    pub fn reload_catalog(&mut self) -> bool {
        match self.catalog.reload() {
            Ok(catalog) => {
                info!(pieces = catalog.len(), "piece catalog reloaded");
                self.catalog = catalog;
                true
            }
            Err(e) => {
                warn!(error = %e, "piece catalog reload failed, keeping current pieces");
                false
            }
        }
    }

    /// The current piece moved straight down as far as it can go.
    pub fn ghost(&self) -> Piece {
        let mut ghost = self.current.clone();
        loop {
            ghost.translate(0, 1);
            if self.board.is_collision(&ghost) {
                ghost.translate(0, -1);
                return ghost;
            }
        }
    }

    /// Where a hard drop would leave the current piece.
    pub fn drop_position(&self) -> Position {
        self.ghost().position()
    }

    fn set_state(&mut self, next: SessionState) {
        if self.state != next {
            info!(from = self.state.as_str(), to = next.as_str(), "session state");
            self.state = next;
        }
    }

    fn push_event(&mut self, event: GameEvent) {
        if self.events.try_push(event).is_err() {
            debug!(?event, "event queue full, dropping");
        }
    }
}
