//! Error types for rekha-nav

use thiserror::Error;

/// Rekha-nav error type
#[derive(Error, Debug)]
pub enum RekhaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Planning error: {0}")]
    Planning(String),

    #[error("Link error: {0}")]
    Link(String),
}

impl From<toml::de::Error> for RekhaError {
    fn from(e: toml::de::Error) -> Self {
        RekhaError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RekhaError>;
