//! Error types for the intelmq extras.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Check error: {0}")]
    Check(#[from] CheckError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// MIME part extraction errors.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Message could not be parsed as RFC 5322")]
    Unparseable,

    #[error("Part {index} ({content_type}) has no header/body separator")]
    MissingSeparator { index: usize, content_type: String },

    #[error("Part {index} has offsets outside the raw message")]
    OffsetOutOfRange { index: usize },
}

/// Errors raised while handing a report to the bus.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Checker tool errors.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Incorrect argument: exactly one of --bots, --runtime or --strange is required")]
    IncorrectArgument,

    #[error("Failed to load inventory from {path}: {reason}")]
    Inventory { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
