//! Configuration error types.

/// Configuration errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    /// TOML deserialization failed.
    #[error(transparent)]
    Deserialization(#[from] toml::de::Error),

    /// A value parsed fine but cannot be used.
    #[error("Invalid configuration value for `{key}` - {reason}")]
    InvalidValue { key: &'static str, reason: String },
}
