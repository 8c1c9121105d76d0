use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalnodeError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Too many in-flight invocations (limit {0})")]
    Saturated(usize),

    #[error("Invocation exceeded its deadline of {0}ms")]
    DeadlineExceeded(u64),

    #[error("Shared execution context is unavailable")]
    ContextUnavailable,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<std::net::AddrParseError> for EvalnodeError {
    fn from(err: std::net::AddrParseError) -> Self {
        EvalnodeError::InvalidConfig(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EvalnodeError>;
