use thiserror::Error;

use crate::models::ConfigError;

/// Main error type for CloudCompile
#[derive(Error, Debug)]
pub enum CloudCompileError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("{0}")]
    Remote(#[from] RemoteFailure),

    #[error("Payload encoding error: {0}")]
    Encoding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a remote exchange, classified by the layer that rejected it
#[derive(Error, Debug)]
pub enum RemoteFailure {
    /// The request never produced an HTTP response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The gateway in front of the remote tool rejected the call.
    /// `detail` keeps the rest of the envelope, nested `body` decoded.
    #[error("Platform error (HTTP {status}): {message}{}", detail_suffix(.detail))]
    Platform {
        status: u16,
        message: String,
        detail: Option<serde_json::Value>,
    },

    /// The remote tool ran and reported a failure
    #[error("{tool} error (HTTP {status}): {body}")]
    Application {
        tool: &'static str,
        status: u16,
        body: serde_json::Value,
    },

    /// The response matched no known shape
    #[error("Unrecognized response (HTTP {status}): {raw}")]
    Decode { status: u16, raw: String },

    #[error("Request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for RemoteFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteFailure::Transport(format!("request timed out: {}", err))
        } else if err.is_connect() {
            RemoteFailure::Transport(format!("connection failed: {}", err))
        } else {
            RemoteFailure::Transport(err.to_string())
        }
    }
}

impl RemoteFailure {
    /// Get the human-readable name for this failure kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            RemoteFailure::Transport(_) => "TransportError",
            RemoteFailure::Platform { .. } => "PlatformError",
            RemoteFailure::Application { .. } => "ApplicationError",
            RemoteFailure::Decode { .. } => "DecodeError",
            RemoteFailure::Cancelled => "Cancelled",
        }
    }
}

fn detail_suffix(detail: &Option<serde_json::Value>) -> String {
    match detail {
        Some(detail) => format!(" {}", detail),
        None => String::new(),
    }
}

impl CloudCompileError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CloudCompileError::Config(_) | CloudCompileError::Argument(_) => 2,
            _ => 1,
        }
    }

    /// Format the error for the error stream, tagged with its kind
    pub fn diagnostic(&self) -> String {
        match self {
            CloudCompileError::Remote(failure) => {
                format!("Error [{}]: {}", failure.kind_name(), failure)
            }
            other => format!("Error: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudCompileError>;
