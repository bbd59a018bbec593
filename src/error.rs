use thiserror::Error;

/// Transport, format, and local failures. Application-level failures
/// reported by the server (`success: false`) are not errors; see `reply`.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Expected a JSON result, got {content_type} instead")]
    ProtocolMismatch { content_type: String, body: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
