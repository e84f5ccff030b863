//! Error types shared by the API client, the push channel and the screens.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success response. `message` is the body's `message` field when the
    /// server sent one.
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },

    /// No credential is held, the request was never sent.
    #[error("not signed in")]
    Unauthenticated,

    #[error("credential cannot be sent as a header")]
    InvalidToken,

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    pub fn api(status: u16, message: Option<String>) -> Self {
        Self::Api { status, message }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated | Self::InvalidToken => ErrorKind::Unauthorized,
            Self::Api { status: 401 | 403, .. } => ErrorKind::Unauthorized,
            Self::Api { status, .. } if (400..500).contains(status) => ErrorKind::Validation,
            _ => ErrorKind::Network,
        }
    }

    /// The server-provided message, if the failure carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref().filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }
}

/// Coarse classification used for banners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure, server error, or an unreadable response.
    Network,
    /// The server rejected the request.
    Validation,
    /// Missing, expired or rejected credential.
    Unauthorized,
}

/// Banner-level error held by a screen. Cheap to clone into view snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ScreenError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Fetch failures always show the screen's fixed message.
    pub fn fetch(err: &Error, fallback: &str) -> Self {
        Self::new(err.kind(), fallback)
    }

    /// Submit failures show the server's message verbatim when there is one.
    pub fn submit(err: &Error, fallback: &str) -> Self {
        let message = err.server_message().unwrap_or(fallback);
        Self::new(err.kind(), message)
    }

    /// Client-side "required field" failures.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }
}

impl std::fmt::Display for ScreenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
