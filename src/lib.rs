//! Blockfall (workspace facade crate).
//!
//! Re-exports the member crates under short names and adds the pieces only the
//! terminal runner needs: configuration loading and the read-only view.

pub mod config;
pub mod view;

pub use blockfall_core as core;
pub use blockfall_input as input;
pub use blockfall_types as types;

pub use config::{Config, ConfigError};
