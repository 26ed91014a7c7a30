//! Error types for configuration loading.
//!
//! The simulation itself never fails: unknown levels fall back, invalid
//! commands are ignored and dangling entity ids are no-ops. Only building a
//! [`Settings`](crate::Settings) from outside data can go wrong.

use std::io;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Settings parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}
