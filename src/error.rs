//! Error taxonomy shared by every public operation.

use thiserror::Error;

/// Errors produced by the translation engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// Empty or over-long text, or an unrecognized language code.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Missing or rejected API credential.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Network failure, timeout, or a server-side (5xx) failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote endpoint throttled the request.
    #[error("Rate limited by remote endpoint: {0}")]
    RateLimit(String),

    /// The completion body was malformed or empty.
    #[error("Invalid completion response: {0}")]
    InvalidResponse(String),

    /// Any other non-success HTTP status.
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// Malformed glossary or configuration file.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Detection output could not be mapped to a recognized language.
    #[error("Language detection failed: {0}")]
    Detection(String),

    /// Unknown style preset or invalid configuration override.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The caller cancelled the operation before it settled.
    #[error("Operation cancelled")]
    Cancelled,
}

/// Coarse classification of a [`TranslateError`], for callers that branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Transport,
    RateLimit,
    InvalidResponse,
    Api,
    Parse,
    Detection,
    Config,
    Cancelled,
}

impl TranslateError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Transport(_) => ErrorKind::Transport,
            Self::RateLimit(_) => ErrorKind::RateLimit,
            Self::InvalidResponse(_) => ErrorKind::InvalidResponse,
            Self::Api { .. } => ErrorKind::Api,
            Self::Parse(_) => ErrorKind::Parse,
            Self::Detection(_) => ErrorKind::Detection,
            Self::Config(_) => ErrorKind::Config,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Returns `true` if a retry may succeed where this attempt failed.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::RateLimit(_) | Self::InvalidResponse(_)
        )
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<reqwest::Error> for TranslateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {err}"))
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, TranslateError>;
