//! Common error types for the Happy World dashboard

use thiserror::Error;

/// Common result type for dashboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the dashboard crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Year selection outside the supported range
    #[error("Year {year} is outside the supported range {min}-{max}")]
    YearOutOfRange { year: i32, min: u16, max: u16 },

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
