//! Keyboard state for terminal environments.
//!
//! Turns key events into the per-tick pressed/down view the session reads.
//! Supports terminals that do not emit key release events by using a timeout:
//! a key counts as held only while press (or auto-repeat) events keep coming.

use arrayvec::ArrayVec;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use blockfall_core::InputSource;

use crate::keymap::Keymap;
use crate::types::InputAction;

const ACTION_COUNT: usize = InputAction::ALL.len();

// In terminals without key-release events, a short timeout prevents a single tap
// from turning into a sustained "held" state that keeps repeating moves.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u32 = 150;

/// Tracks which actions went down this frame and which are held.
#[derive(Debug, Clone)]
pub struct KeyboardState {
    keymap: Keymap,
    pressed: ArrayVec<InputAction, ACTION_COUNT>,
    /// Held actions with the clock time of their latest key event
    down: ArrayVec<(InputAction, u64), ACTION_COUNT>,
    clock_ms: u64,
    key_release_timeout_ms: u32,
}

impl KeyboardState {
    pub fn new(keymap: Keymap) -> Self {
        Self {
            keymap,
            pressed: ArrayVec::new(),
            down: ArrayVec::new(),
            clock_ms: 0,
            key_release_timeout_ms: DEFAULT_KEY_RELEASE_TIMEOUT_MS,
        }
    }

    pub fn with_key_release_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.key_release_timeout_ms = timeout_ms;
        self
    }

    pub fn key_release_timeout_ms(&self) -> u32 {
        self.key_release_timeout_ms
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// Feed one crossterm key event.
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => self.handle_key_press(key.code),
            KeyEventKind::Release => self.handle_key_release(key.code),
        }
    }

    pub fn handle_key_press(&mut self, code: KeyCode) {
        let now = self.clock_ms;
        for action in self.keymap.actions_for(code) {
            match self.down.iter_mut().find(|(a, _)| *a == action) {
                Some(entry) => entry.1 = now,
                None => {
                    let _ = self.down.try_push((action, now));
                    if !self.pressed.contains(&action) {
                        let _ = self.pressed.try_push(action);
                    }
                }
            }
        }
    }

    pub fn handle_key_release(&mut self, code: KeyCode) {
        for action in self.keymap.actions_for(code) {
            self.down.retain(|(a, _)| *a != action);
        }
    }

    /// Close the frame: forget this frame's presses, advance the clock and
    /// auto-release keys that went quiet.
    pub fn end_frame(&mut self, elapsed_ms: u32) {
        self.pressed.clear();
        self.clock_ms = self.clock_ms.saturating_add(elapsed_ms as u64);

        let now = self.clock_ms;
        let timeout = self.key_release_timeout_ms as u64;
        self.down.retain(|(_, seen)| now.saturating_sub(*seen) <= timeout);
    }

    /// Drop every pressed and held action (focus loss, state reset).
    pub fn clear(&mut self) {
        self.pressed.clear();
        self.down.clear();
    }
}

impl InputSource for KeyboardState {
    fn pressed(&self, action: InputAction) -> bool {
        self.pressed.contains(&action)
    }

    fn down(&self, action: InputAction) -> bool {
        self.down.iter().any(|(a, _)| *a == action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn keyboard() -> KeyboardState {
        KeyboardState::new(Keymap::default())
    }

    #[test]
    fn test_press_is_edge_for_one_frame() {
        let mut kb = keyboard();
        kb.handle_key_press(KeyCode::Char(' '));
        assert!(kb.pressed(InputAction::HardDrop));
        assert!(kb.down(InputAction::HardDrop));

        kb.end_frame(16);
        assert!(!kb.pressed(InputAction::HardDrop));
        assert!(kb.down(InputAction::HardDrop));
    }

    #[test]
    fn test_repeat_events_do_not_re_press() {
        let mut kb = keyboard();
        kb.handle_key_press(KeyCode::Left);
        kb.end_frame(16);
        kb.handle_key_press(KeyCode::Left);
        assert!(!kb.pressed(InputAction::MoveLeft));
        assert!(kb.down(InputAction::MoveLeft));
    }

    #[test]
    fn test_release_event() {
        let mut kb = keyboard();
        kb.handle_key_press(KeyCode::Down);
        kb.handle_key_release(KeyCode::Down);
        assert!(!kb.down(InputAction::SoftDrop));
        assert!(!kb.down(InputAction::MenuDown));
    }

    #[test]
    fn test_release_timeout() {
        let mut kb = keyboard().with_key_release_timeout_ms(100);
        kb.handle_key_press(KeyCode::Right);
        kb.end_frame(100);
        assert!(kb.down(InputAction::MoveRight));
        kb.end_frame(16);
        assert!(!kb.down(InputAction::MoveRight));
    }

    #[test]
    fn test_shared_key_drives_both_actions() {
        let mut kb = keyboard();
        kb.handle_key_event(KeyEvent {
            code: KeyCode::Esc,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        });
        assert!(kb.pressed(InputAction::Quit));
        assert!(kb.pressed(InputAction::MenuBack));
    }

    #[test]
    fn test_unbound_key_is_ignored() {
        let mut kb = keyboard();
        kb.handle_key_press(KeyCode::Char('x'));
        assert!(InputAction::ALL.iter().all(|a| !kb.down(*a)));
    }
}
