//! Terminal input module (session-facing).
//!
//! Maps `crossterm` key events onto [`crate::types::InputAction`]s through a
//! configurable [`Keymap`] and tracks them in a [`KeyboardState`] that the
//! session reads as its [`blockfall_core::InputSource`] (including terminals
//! without key-release events).

pub mod keyboard;
pub mod keymap;

pub use blockfall_types as types;

pub use keyboard::KeyboardState;
pub use keymap::{is_interrupt, key_name, parse_key_name, Keymap, KeymapError};
