//! Highscore list - ranking rules and persistence
//!
//! The list holds at most [`MAX_HIGHSCORES`] entries sorted by descending
//! score. Ranking is decided against whatever the store currently holds:
//!
//! - an empty list accepts any positive score at index 0
//! - otherwise a score ranks at the first entry it strictly beats
//! - a score that beats nobody does not rank, even if the list has room
//!
//! Stores never fail a read: a missing file is an empty list and a corrupt
//! file is logged and treated as empty. Only writes report errors.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::{MAX_HIGHSCORES, MAX_NAME_LEN};

/// Highscore write failure
#[derive(Debug, Error)]
pub enum HighscoreError {
    #[error("cannot write highscores to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode highscores: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One ranked result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighscoreEntry {
    pub name: String,
    pub score: u32,
    pub level: u32,
    pub total_lines: u32,
}

impl HighscoreEntry {
    pub fn new(name: impl Into<String>, score: u32, level: u32, total_lines: u32) -> Self {
        Self {
            name: name.into(),
            score,
            level,
            total_lines,
        }
    }
}

/// Rank a score would take in `entries`, if any.
pub fn insertion_index(entries: &[HighscoreEntry], score: u32) -> Option<usize> {
    if entries.is_empty() {
        return (score > 0).then_some(0);
    }
    entries.iter().position(|e| score > e.score)
}

pub fn is_new_highscore(entries: &[HighscoreEntry], score: u32) -> bool {
    insertion_index(entries, score).is_some()
}

/// Add `entry`, keep descending order and drop whatever falls off the end.
///
/// Equal scores keep their existing order; the newcomer goes after them.
pub fn insert_ranked(entries: &mut Vec<HighscoreEntry>, entry: HighscoreEntry) {
    entries.push(entry);
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(MAX_HIGHSCORES);
}

/// Persistent ranked list consumed by the session.
pub trait HighscoreStore {
    /// Current list, best first. Never fails; unreadable data is an empty list.
    fn load_all(&self) -> Vec<HighscoreEntry>;

    /// Insert one entry and persist the trimmed list.
    fn save(&mut self, entry: HighscoreEntry) -> Result<(), HighscoreError>;

    fn is_new_highscore(&self, score: u32) -> bool {
        is_new_highscore(&self.load_all(), score)
    }

    fn insertion_index(&self, score: u32) -> Option<usize> {
        insertion_index(&self.load_all(), score)
    }
}

/// In-memory store for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryHighscores {
    entries: Vec<HighscoreEntry>,
}

impl MemoryHighscores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing list (sorted and trimmed on the way in).
    pub fn with_entries(entries: impl IntoIterator<Item = HighscoreEntry>) -> Self {
        let mut store = Self::new();
        for entry in entries {
            insert_ranked(&mut store.entries, entry);
        }
        store
    }
}

impl HighscoreStore for MemoryHighscores {
    fn load_all(&self) -> Vec<HighscoreEntry> {
        self.entries.clone()
    }

    fn save(&mut self, entry: HighscoreEntry) -> Result<(), HighscoreError> {
        insert_ranked(&mut self.entries, entry);
        Ok(())
    }
}

/// Whole-file JSON store. Last writer wins.
#[derive(Debug, Clone)]
pub struct JsonFileHighscores {
    path: PathBuf,
}

impl JsonFileHighscores {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, entries: &[HighscoreEntry]) -> Result<(), HighscoreError> {
        let io_err = |source| HighscoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let json = serde_json::to_vec_pretty(entries)?;
        fs::write(&self.path, json).map_err(io_err)
    }
}

impl HighscoreStore for JsonFileHighscores {
    fn load_all(&self) -> Vec<HighscoreEntry> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read highscores");
                return Vec::new();
            }
        };
        if bytes.is_empty() {
            return Vec::new();
        }

        match serde_json::from_slice::<Vec<HighscoreEntry>>(&bytes) {
            Ok(mut entries) => {
                entries.sort_by(|a, b| b.score.cmp(&a.score));
                entries.truncate(MAX_HIGHSCORES);
                entries
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt highscores, starting empty");
                Vec::new()
            }
        }
    }

    fn save(&mut self, entry: HighscoreEntry) -> Result<(), HighscoreError> {
        let mut entries = self.load_all();
        insert_ranked(&mut entries, entry);
        self.write(&entries)?;
        debug!(path = %self.path.display(), entries = entries.len(), "highscores saved");
        Ok(())
    }
}

/// Name typed on the game-over screen: letters A-Z, at most [`MAX_NAME_LEN`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameEntry {
    name: String,
}

impl NameEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a letter (stored uppercase). Returns whether it was accepted.
    pub fn push(&mut self, c: char) -> bool {
        if !c.is_ascii_alphabetic() || self.name.len() >= MAX_NAME_LEN {
            return false;
        }
        self.name.push(c.to_ascii_uppercase());
        true
    }

    /// Remove the last letter. Returns whether anything was removed.
    pub fn backspace(&mut self) -> bool {
        self.name.pop().is_some()
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// The finished name, or `None` while it is still empty.
    pub fn submit(&self) -> Option<&str> {
        (!self.name.is_empty()).then_some(self.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: u32) -> HighscoreEntry {
        HighscoreEntry::new(name, score, 1, 0)
    }

    #[test]
    fn test_empty_list_ranking() {
        assert_eq!(insertion_index(&[], 10), Some(0));
        assert_eq!(insertion_index(&[], 0), None);
        assert!(!is_new_highscore(&[], 0));
    }

    #[test]
    fn test_ranking_needs_to_beat_an_entry() {
        let entries = vec![entry("A", 300), entry("B", 200), entry("C", 100)];
        assert_eq!(insertion_index(&entries, 350), Some(0));
        assert_eq!(insertion_index(&entries, 150), Some(2));
        assert_eq!(insertion_index(&entries, 100), None);
        assert_eq!(insertion_index(&entries, 50), None);
    }

    #[test]
    fn test_insert_ranked_caps_list() {
        let mut entries = Vec::new();
        for score in 1..=12 {
            insert_ranked(&mut entries, entry("X", score * 10));
        }
        assert_eq!(entries.len(), MAX_HIGHSCORES);
        assert_eq!(entries[0].score, 120);
        assert_eq!(entries[MAX_HIGHSCORES - 1].score, 30);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryHighscores::new();
        assert!(store.is_new_highscore(5));
        store.save(entry("AAA", 5)).unwrap();
        store.save(entry("BBB", 50)).unwrap();
        let all = store.load_all();
        assert_eq!(all[0].name, "BBB");
        assert_eq!(store.insertion_index(10), Some(1));
    }

    #[test]
    fn test_json_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileHighscores::new(dir.path().join("scores.json"));
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn test_json_store_recovers_from_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, b"\x00\x01not json").unwrap();
        let store = JsonFileHighscores::new(&path);
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn test_json_store_save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.json");
        let mut store = JsonFileHighscores::new(&path);
        store.save(HighscoreEntry::new("ZED", 40, 2, 11)).unwrap();
        store.save(HighscoreEntry::new("AMY", 90, 3, 25)).unwrap();

        let reopened = JsonFileHighscores::new(&path);
        let all = reopened.load_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], HighscoreEntry::new("AMY", 90, 3, 25));
    }

    #[test]
    fn test_name_entry() {
        let mut name = NameEntry::new();
        assert_eq!(name.submit(), None);
        assert!(name.push('a'));
        assert!(!name.push('1'));
        assert!(!name.push(' '));
        assert_eq!(name.as_str(), "A");

        for _ in 0..20 {
            name.push('b');
        }
        assert_eq!(name.as_str().len(), MAX_NAME_LEN);
        assert!(name.backspace());
        assert_eq!(name.as_str().len(), MAX_NAME_LEN - 1);
        assert_eq!(name.submit(), Some("ABBBBBBBB"));
    }
}
