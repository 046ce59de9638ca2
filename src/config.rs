//! Runner configuration.
//!
//! Read from a TOML file (path from `BLOCKFALL_CONFIG`, default
//! `blockfall.toml`); a missing file means defaults. `BLOCKFALL_BLOCKS` and
//! `BLOCKFALL_SEED` override the file.
//!
//! ```toml
//! [game]
//! blocks_path = "assets/blocks.json"
//! highscore_path = "highscores.json"
//! start_level = 1
//! seed = 42
//! log_path = "blockfall.log"
//! min_music_track = 1
//! max_music_track = 5
//!
//! [keyboard]
//! HardDrop = "Space"
//! HoldPiece = "C"
//! ```
//!
//! Every key and action name is checked at load time.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::core::{Catalog, DataFormatError, SessionOptions};
use crate::input::{Keymap, KeymapError};
use crate::types::MAX_START_LEVEL;

pub const CONFIG_PATH_ENV: &str = "BLOCKFALL_CONFIG";
pub const BLOCKS_PATH_ENV: &str = "BLOCKFALL_BLOCKS";
pub const SEED_ENV: &str = "BLOCKFALL_SEED";
pub const DEFAULT_CONFIG_PATH: &str = "blockfall.toml";

/// Configuration failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("start_level must be between 1 and {max}, got {level}")]
    StartLevel { level: u32, max: u32 },

    #[error("music track range {min}..={max} is empty")]
    MusicRange { min: u32, max: u32 },

    #[error("invalid value `{value}` in ${name}")]
    Env { name: &'static str, value: String },

    #[error(transparent)]
    Keymap(#[from] KeymapError),
}

/// `[game]` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Piece definitions; the built-in set when unset.
    pub blocks_path: Option<PathBuf>,
    pub highscore_path: PathBuf,
    pub start_level: u32,
    /// Fixed seed; the clock picks one when unset.
    pub seed: Option<u32>,
    pub log_path: PathBuf,
    pub min_music_track: u32,
    pub max_music_track: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            blocks_path: None,
            highscore_path: PathBuf::from("highscores.json"),
            start_level: 1,
            seed: None,
            log_path: PathBuf::from("blockfall.log"),
            min_music_track: 1,
            max_music_track: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub game: GameConfig,
    /// Action name → key name overrides on top of the default bindings
    pub keyboard: BTreeMap<String, String>,
}

impl Config {
    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => {
                let config = Self::from_toml_str(&text)?;
                info!(path = %path.display(), "loaded config");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Load from the file named by the environment, then apply env overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = env::var(CONFIG_PATH_ENV)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let mut config = Self::load(path)?;
        config.apply_overrides(|name| env::var(name).ok())?;
        Ok(config)
    }

    /// Apply `BLOCKFALL_BLOCKS` / `BLOCKFALL_SEED` as returned by `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(path) = lookup(BLOCKS_PATH_ENV).filter(|s| !s.trim().is_empty()) {
            self.game.blocks_path = Some(PathBuf::from(path.trim()));
        }
        if let Some(value) = lookup(SEED_ENV) {
            let seed = value.trim().parse().map_err(|_| ConfigError::Env {
                name: SEED_ENV,
                value: value.clone(),
            })?;
            self.game.seed = Some(seed);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.game.start_level;
        if !(1..=MAX_START_LEVEL).contains(&level) {
            return Err(ConfigError::StartLevel {
                level,
                max: MAX_START_LEVEL,
            });
        }
        let (min, max) = (self.game.min_music_track, self.game.max_music_track);
        if min > max {
            return Err(ConfigError::MusicRange { min, max });
        }
        self.keymap()?;
        Ok(())
    }

    /// Default bindings with the `[keyboard]` overrides applied.
    pub fn keymap(&self) -> Result<Keymap, KeymapError> {
        Keymap::from_names(
            self.keyboard
                .iter()
                .map(|(action, key)| (action.as_str(), key.as_str())),
        )
    }

    /// Piece catalog from `blocks_path`, or the built-in set.
    pub fn load_catalog(&self) -> Result<Catalog, DataFormatError> {
        match &self.game.blocks_path {
            Some(path) => Catalog::load(path),
            None => Catalog::standard(),
        }
    }

    /// Session settings; `fallback_seed` is used when no seed is configured.
    pub fn session_options(&self, fallback_seed: u32) -> SessionOptions {
        SessionOptions {
            start_level: self.game.start_level,
            seed: self.game.seed.unwrap_or(fallback_seed),
            min_music_track: self.game.min_music_track,
            max_music_track: self.game.max_music_track,
        }
    }
}
