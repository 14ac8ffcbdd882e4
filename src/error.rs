//! Error types
//!
//! Library code returns these typed errors; the host binary wraps them in
//! `anyhow` with context at the call sites.

use thiserror::Error;

/// Failures setting up or drawing the widget's surfaces
#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("no usable font found, install DejaVu Sans or Liberation Sans")]
    NoFont,

    #[error("shared memory {what}: {reason}")]
    SharedMemory { what: &'static str, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl WidgetError {
    pub(crate) fn shm(what: &'static str, err: impl std::fmt::Display) -> Self {
        WidgetError::SharedMemory {
            what,
            reason: err.to_string(),
        }
    }
}

/// Reading, writing or importing the settings file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("settings file I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("settings cannot be written as TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no user configuration directory")]
    NoConfigDir,
}

/// Why a label format could not be rendered
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unknown or malformed directive")]
    InvalidDirective,

    #[error("format produced no output")]
    Empty,

    #[error("{0} bytes of output do not fit the label buffer")]
    Overflow(usize),

    #[error("value cannot be rendered with this format")]
    Render,
}

pub type Result<T> = std::result::Result<T, WidgetError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type FormatResult<T> = std::result::Result<T, FormatError>;
