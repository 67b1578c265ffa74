use std::fmt;

#[derive(Debug)]
pub enum ClientError {
    /// Network-level failure (connect, timeout, TLS).
    Transport(String),
    /// Non-success HTTP status from the upstream.
    Status { status: u16, message: String },
    /// Response body that does not match the expected shape.
    Malformed(String),
    /// Required credential env var absent or empty.
    MissingKey(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Status { status, message } => {
                write!(f, "upstream returned {status}: {message}")
            }
            Self::Malformed(msg) => write!(f, "unexpected response shape: {msg}"),
            Self::MissingKey(var) => write!(f, "environment variable {var} not set"),
        }
    }
}

impl std::error::Error for ClientError {}
