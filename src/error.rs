//! # Error Types
//!
//! Custom error types for MLB CAN using `thiserror`.

use thiserror::Error;

/// Main error type for MLB CAN
#[derive(Debug, Error)]
pub enum MlbCanError {
    /// A required signal was absent from an observed stock frame
    #[error("Missing field {field} in stock {frame} frame")]
    MissingField { frame: String, field: String },

    /// A stock frame needed this tick was not observed on the bus
    #[error("No stock {0} frame observed this tick")]
    MissingFrame(String),

    /// A signal value that cannot be put on the bus (NaN, out-of-range counter, ...)
    #[error("Invalid value for signal {signal}: {reason}")]
    InvalidSignal { signal: String, reason: String },

    /// Frame name not present in the platform catalogue
    #[error("Unknown frame: {0}")]
    UnknownFrame(String),

    /// Record to field map serialization errors
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for MLB CAN
pub type Result<T> = std::result::Result<T, MlbCanError>;
