//! Key bindings: configuration key names to logical actions.
//!
//! Key names are resolved through a fixed table (plus single letters and
//! digits); anything else is rejected when the bindings are built, never while
//! playing.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;

use crate::types::InputAction;

/// Binding failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeymapError {
    #[error("unknown action name `{0}`")]
    UnknownAction(String),

    #[error("unknown key name `{key}` for action {action}")]
    UnknownKey { action: String, key: String },
}

/// Named keys accepted in configuration files.
const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("Left", KeyCode::Left),
    ("Right", KeyCode::Right),
    ("Up", KeyCode::Up),
    ("Down", KeyCode::Down),
    ("Space", KeyCode::Char(' ')),
    ("Enter", KeyCode::Enter),
    ("Escape", KeyCode::Esc),
    ("Esc", KeyCode::Esc),
    ("Back", KeyCode::Backspace),
    ("Backspace", KeyCode::Backspace),
    ("Tab", KeyCode::Tab),
    ("Home", KeyCode::Home),
    ("End", KeyCode::End),
    ("PageUp", KeyCode::PageUp),
    ("PageDown", KeyCode::PageDown),
    ("Insert", KeyCode::Insert),
    ("Delete", KeyCode::Delete),
    ("F1", KeyCode::F(1)),
    ("F2", KeyCode::F(2)),
    ("F3", KeyCode::F(3)),
    ("F4", KeyCode::F(4)),
    ("F5", KeyCode::F(5)),
    ("F6", KeyCode::F(6)),
    ("F7", KeyCode::F(7)),
    ("F8", KeyCode::F(8)),
    ("F9", KeyCode::F(9)),
    ("F10", KeyCode::F(10)),
    ("F11", KeyCode::F(11)),
    ("F12", KeyCode::F(12)),
];

/// Resolve a configuration key name (case-insensitive).
///
/// Besides the named keys, a single letter or digit names itself, and
/// `D0`..`D9` are accepted for digits.
pub fn parse_key_name(name: &str) -> Option<KeyCode> {
    if let Some((_, code)) = NAMED_KEYS
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
    {
        return Some(*code);
    }

    let mut chars = name.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(c), None, None) if c.is_ascii_alphanumeric() => {
            Some(KeyCode::Char(c.to_ascii_lowercase()))
        }
        (Some('d' | 'D'), Some(d), None) if d.is_ascii_digit() => Some(KeyCode::Char(d)),
        _ => None,
    }
}

/// Display name of a key, as accepted by [`parse_key_name`].
pub fn key_name(code: KeyCode) -> String {
    if let Some((name, _)) = NAMED_KEYS.iter().find(|(_, c)| *c == code) {
        return (*name).to_string();
    }
    match code {
        KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
        other => format!("{other:?}"),
    }
}

/// Fold letter case so `A` and `a` hit the same binding.
pub fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// Ctrl-C always leaves, whatever the bindings say.
pub fn is_interrupt(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Action → key bindings. One key may drive several actions (Escape is both
/// quit and menu back by default).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    bindings: Vec<(InputAction, KeyCode)>,
}

impl Default for Keymap {
    fn default() -> Self {
        use InputAction::*;
        let bindings = vec![
            (MoveLeft, KeyCode::Left),
            (MoveRight, KeyCode::Right),
            (SoftDrop, KeyCode::Down),
            (HardDrop, KeyCode::Char(' ')),
            (RotateClockwise, KeyCode::Up),
            (RotateCounterClockwise, KeyCode::Char('z')),
            (HoldPiece, KeyCode::Char('c')),
            (Pause, KeyCode::Char('p')),
            (Quit, KeyCode::Esc),
            (MenuUp, KeyCode::Up),
            (MenuDown, KeyCode::Down),
            (MenuLeft, KeyCode::Left),
            (MenuRight, KeyCode::Right),
            (MenuSelect, KeyCode::Enter),
            (MenuBack, KeyCode::Esc),
            (ShowControls, KeyCode::F(1)),
            (ReloadCatalog, KeyCode::Char('r')),
        ];
        Self { bindings }
    }
}

impl Keymap {
    /// Default bindings with `overrides` applied, as `(action name, key name)`.
    pub fn from_names<'a>(
        overrides: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, KeymapError> {
        let mut keymap = Self::default();
        for (action_name, key) in overrides {
            let action = InputAction::from_str(action_name)
                .ok_or_else(|| KeymapError::UnknownAction(action_name.to_string()))?;
            let code = parse_key_name(key).ok_or_else(|| KeymapError::UnknownKey {
                action: action_name.to_string(),
                key: key.to_string(),
            })?;
            keymap.bind(action, code);
        }
        Ok(keymap)
    }

    /// Rebind `action` to `code`, replacing its previous key.
    pub fn bind(&mut self, action: InputAction, code: KeyCode) {
        let code = normalize(code);
        match self.bindings.iter_mut().find(|(a, _)| *a == action) {
            Some(binding) => binding.1 = code,
            None => self.bindings.push((action, code)),
        }
    }

    pub fn key_for(&self, action: InputAction) -> Option<KeyCode> {
        self.bindings
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, code)| *code)
    }

    /// Every action bound to `code`.
    pub fn actions_for(&self, code: KeyCode) -> impl Iterator<Item = InputAction> + '_ {
        let code = normalize(code);
        self.bindings
            .iter()
            .filter(move |(_, c)| *c == code)
            .map(|(action, _)| *action)
    }

    pub fn bindings(&self) -> &[(InputAction, KeyCode)] {
        &self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_keys() {
        assert_eq!(parse_key_name("Left"), Some(KeyCode::Left));
        assert_eq!(parse_key_name("space"), Some(KeyCode::Char(' ')));
        assert_eq!(parse_key_name("ESCAPE"), Some(KeyCode::Esc));
        assert_eq!(parse_key_name("F1"), Some(KeyCode::F(1)));
        assert_eq!(parse_key_name("Z"), Some(KeyCode::Char('z')));
        assert_eq!(parse_key_name("D7"), Some(KeyCode::Char('7')));
        assert_eq!(parse_key_name("7"), Some(KeyCode::Char('7')));
        assert_eq!(parse_key_name("Hyper"), None);
        assert_eq!(parse_key_name(""), None);
    }

    #[test]
    fn test_key_name_roundtrip() {
        for code in [KeyCode::Left, KeyCode::Enter, KeyCode::F(1), KeyCode::Char('z')] {
            assert_eq!(parse_key_name(&key_name(code)), Some(code));
        }
    }

    #[test]
    fn test_default_bindings() {
        let keymap = Keymap::default();
        let esc: Vec<_> = keymap.actions_for(KeyCode::Esc).collect();
        assert_eq!(esc, vec![InputAction::Quit, InputAction::MenuBack]);

        let up: Vec<_> = keymap.actions_for(KeyCode::Up).collect();
        assert!(up.contains(&InputAction::RotateClockwise));
        assert!(up.contains(&InputAction::MenuUp));

        let z: Vec<_> = keymap.actions_for(KeyCode::Char('Z')).collect();
        assert_eq!(z, vec![InputAction::RotateCounterClockwise]);
    }

    #[test]
    fn test_overrides() {
        let keymap = Keymap::from_names([("HardDrop", "Enter"), ("holdpiece", "H")]).unwrap();
        assert_eq!(keymap.key_for(InputAction::HardDrop), Some(KeyCode::Enter));
        assert_eq!(keymap.key_for(InputAction::HoldPiece), Some(KeyCode::Char('h')));
        assert_eq!(keymap.actions_for(KeyCode::Char(' ')).count(), 0);
    }

    #[test]
    fn test_unknown_names_fail() {
        assert_eq!(
            Keymap::from_names([("Teleport", "T")]),
            Err(KeymapError::UnknownAction("Teleport".into()))
        );
        assert!(matches!(
            Keymap::from_names([("Pause", "PrintScreen")]),
            Err(KeymapError::UnknownKey { .. })
        ));
    }

    #[test]
    fn test_interrupt() {
        assert!(is_interrupt(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_interrupt(&KeyEvent::from(KeyCode::Char('c'))));
    }
}
