//! Terminal Blockfall runner (default binary).
//!
//! Loads configuration and the piece catalog, then runs the session at a
//! fixed tick with crossterm for input and the read-only view for output.
//! Logs go to a file so they never interfere with the screen.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use blockfall::core::{JsonFileHighscores, Session};
use blockfall::input::{is_interrupt, KeyboardState, Keymap};
use blockfall::types::{SessionState, TICK_MS};
use blockfall::view::Screen;
use blockfall::Config;

const LOG_FILTER_ENV: &str = "BLOCKFALL_LOG";

fn main() -> Result<()> {
    let config = Config::from_env().context("loading configuration")?;
    init_logging(&config.game.log_path);

    let catalog = config
        .load_catalog()
        .context("loading piece definitions")?;
    let keymap = config.keymap().context("resolving key bindings")?;
    let options = config.session_options(clock_seed());
    info!(pieces = catalog.len(), seed = options.seed, "starting");

    let store = JsonFileHighscores::new(&config.game.highscore_path);
    let mut session = Session::new(catalog, store, options);

    // Restore the terminal even if something panics mid-frame.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = Screen::new().exit();
        original_hook(panic_info);
    }));

    let mut screen = Screen::new();
    screen.enter()?;

    let result = run(&mut screen, &mut session, keymap);

    // Always try to restore terminal state.
    let _ = screen.exit();
    info!(score = session.score(), "exiting");
    result
}

fn init_logging(path: &Path) {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let Ok(file) = File::create(path) else {
        // No log file, no logging; stderr belongs to the game screen.
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

fn run(
    screen: &mut Screen,
    session: &mut Session<JsonFileHighscores>,
    keymap: Keymap,
) -> Result<()> {
    let mut keyboard = KeyboardState::new(keymap);
    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        screen.draw(session, keyboard.keymap())?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if is_interrupt(&key) {
                    return Ok(());
                }
                if key.kind != KeyEventKind::Release && typing_name(session) {
                    match key.code {
                        KeyCode::Char(c) => {
                            session.type_name_char(c);
                        }
                        KeyCode::Backspace => {
                            session.erase_name_char();
                        }
                        _ => {}
                    }
                }
                keyboard.handle_key_event(key);
            }
        }

        // Tick.
        let elapsed = last_tick.elapsed();
        if elapsed >= tick_duration {
            last_tick = Instant::now();
            let elapsed_ms = elapsed.as_millis().min(u32::MAX as u128) as u32;

            session.tick(&keyboard, elapsed_ms);
            keyboard.end_frame(elapsed_ms);

            for event in session.take_events() {
                debug!(?event, "game event");
            }
            if session.quit_requested() {
                return Ok(());
            }
        }
    }
}

fn typing_name(session: &Session<JsonFileHighscores>) -> bool {
    session.state() == SessionState::GameOver && session.name_entry().is_some()
}
