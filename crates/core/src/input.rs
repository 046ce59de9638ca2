//! Logical input consumed by the session
//!
//! The session only ever asks two questions per action and tick: was it
//! pressed this tick (edge) and is it held down (level). Device handling lives
//! in `blockfall-input`; [`InputFrame`] is a plain in-memory source for tests,
//! benches and scripted play.

use arrayvec::ArrayVec;

use crate::types::InputAction;

/// Per-tick view of the player's input.
pub trait InputSource {
    /// Went down since the previous tick.
    fn pressed(&self, action: InputAction) -> bool;

    /// Currently held. A pressed action is also down.
    fn down(&self, action: InputAction) -> bool;
}

const ACTION_COUNT: usize = InputAction::ALL.len();

/// Fixed set of pressed/held actions for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFrame {
    pressed: ArrayVec<InputAction, ACTION_COUNT>,
    down: ArrayVec<InputAction, ACTION_COUNT>,
}

impl InputFrame {
    /// No input at all
    pub fn idle() -> Self {
        Self::default()
    }

    /// Frame where `action` was just pressed
    pub fn pressing(action: InputAction) -> Self {
        Self::idle().press(action)
    }

    /// Frame where `action` is held (not newly pressed)
    pub fn holding(action: InputAction) -> Self {
        Self::idle().hold(action)
    }

    /// Add a fresh press (also counts as down)
    pub fn press(mut self, action: InputAction) -> Self {
        if !self.pressed.contains(&action) {
            let _ = self.pressed.try_push(action);
        }
        self.hold(action)
    }

    /// Add a held action
    pub fn hold(mut self, action: InputAction) -> Self {
        if !self.down.contains(&action) {
            let _ = self.down.try_push(action);
        }
        self
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.pressed.clear();
        self.down.clear();
    }
}

impl InputSource for InputFrame {
    fn pressed(&self, action: InputAction) -> bool {
        self.pressed.contains(&action)
    }

    fn down(&self, action: InputAction) -> bool {
        self.down.contains(&action)
    }
}

impl<T: InputSource + ?Sized> InputSource for &T {
    fn pressed(&self, action: InputAction) -> bool {
        (**self).pressed(action)
    }

    fn down(&self, action: InputAction) -> bool {
        (**self).down(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_implies_down() {
        let frame = InputFrame::pressing(InputAction::HardDrop);
        assert!(frame.pressed(InputAction::HardDrop));
        assert!(frame.down(InputAction::HardDrop));
        assert!(!frame.pressed(InputAction::MoveLeft));
    }

    #[test]
    fn test_hold_is_not_pressed() {
        let frame = InputFrame::holding(InputAction::MoveLeft).press(InputAction::Pause);
        assert!(frame.down(InputAction::MoveLeft));
        assert!(!frame.pressed(InputAction::MoveLeft));
        assert!(frame.pressed(InputAction::Pause));
    }

    #[test]
    fn test_duplicates_and_clear() {
        let mut frame = InputFrame::idle();
        for _ in 0..40 {
            frame = frame.press(InputAction::SoftDrop);
        }
        assert!(frame.pressed(InputAction::SoftDrop));
        frame.clear();
        assert_eq!(frame, InputFrame::idle());
    }
}
