//! Errors that can happen when talking to the to-do server, or when handling its data

use thiserror::Error;

/// Name of the login operation, as it appears in error messages
pub(crate) const LOGIN: &str = "log in";

/// Every failure this crate can report
#[derive(Debug, Error)]
pub enum TodoError {
    /// The request could not be sent, or the connection broke while reading the reply
    #[error("Network error during {operation}: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The server replied with a success status, but with a body that does not make sense
    #[error("Invalid reply to {operation}: {source}")]
    InvalidReply {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The server replied with a non-success HTTP status
    #[error("{operation} failed with HTTP status {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The request has been rejected locally, before reaching the server
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The server accepted the credentials but did not hand out a token
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unable to (de)serialize: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TodoError {
    pub(crate) fn transport(operation: &'static str, source: reqwest::Error) -> Self {
        TodoError::Transport { operation, source }
    }

    /// For errors raised while reading the body of a successful reply
    pub(crate) fn reading(operation: &'static str, source: reqwest::Error) -> Self {
        if source.is_decode() {
            TodoError::InvalidReply { operation, source }
        } else {
            TodoError::Transport { operation, source }
        }
    }

    /// Whether this error has been raised before any request was sent
    pub fn is_local(&self) -> bool {
        matches!(self, TodoError::Validation(_) | TodoError::InvalidUrl(_))
    }

    /// A short message that can be shown as-is to an end user
    pub fn user_message(&self) -> String {
        match self {
            TodoError::Transport{ .. } => "The server could not be reached. Please try again.".to_string(),
            TodoError::Status{ operation: LOGIN, .. } |
            TodoError::InvalidReply{ operation: LOGIN, .. } => "Login failed.".to_string(),
            TodoError::Status{ operation, status: 401, .. } |
            TodoError::Status{ operation, status: 403, .. } => format!("You are not allowed to {}. Please log in again.", operation),
            TodoError::Status{ operation, .. } |
            TodoError::InvalidReply{ operation, .. } => format!("Unable to {}.", operation),
            TodoError::Validation(reason) => reason.clone(),
            TodoError::Authentication(_) => "Login failed.".to_string(),
            TodoError::InvalidUrl(_) => "The server address is invalid.".to_string(),
            TodoError::Io(_) | TodoError::Serialization(_) => "Unable to access the local session file.".to_string(),
        }
    }
}

/// Result type used throughout this crate
pub type TodoResult<T> = Result<T, TodoError>;
