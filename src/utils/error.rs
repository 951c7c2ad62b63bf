//! Error handling module
//!
//! Defines the failure taxonomy used by the client, the classifier that maps
//! raw failures onto it, and the fatal errors raised for configuration faults

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure categories surfaced by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No response was received (connection refused, DNS failure, reset)
    NetworkError,
    /// The per-attempt deadline expired
    TimeoutError,
    /// HTTP 401/403
    AuthError,
    /// HTTP 400/422
    ValidationError,
    /// HTTP 5xx
    ServerError,
    /// Everything else, including interceptor faults and undecodable bodies
    UnknownError,
}

impl ErrorKind {
    /// All kinds, in declaration order
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::NetworkError,
        ErrorKind::TimeoutError,
        ErrorKind::AuthError,
        ErrorKind::ValidationError,
        ErrorKind::ServerError,
        ErrorKind::UnknownError,
    ];

    /// Get error kind string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NetworkError => "NetworkError",
            ErrorKind::TimeoutError => "TimeoutError",
            ErrorKind::AuthError => "AuthError",
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::ServerError => "ServerError",
            ErrorKind::UnknownError => "UnknownError",
        }
    }

    /// Fixed end-user sentence for this kind
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::NetworkError => {
                "Unable to reach the server. Please check your internet connection."
            }
            ErrorKind::TimeoutError => "The request took too long. Please try again.",
            ErrorKind::AuthError => "Please log in to continue.",
            ErrorKind::ValidationError => "Please check your input and try again.",
            ErrorKind::ServerError => "Something went wrong on our end. Please try again later.",
            ErrorKind::UnknownError => "An unexpected error occurred. Please try again.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified request failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub status_code: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status_code: None,
            message: message.into(),
        }
    }

    /// Create an error from an HTTP status, classifying it
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: classify_status(status),
            status_code: Some(status),
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownError, message)
    }

    /// Whether another attempt may succeed
    pub fn retryable(&self) -> bool {
        match self.kind {
            ErrorKind::NetworkError | ErrorKind::TimeoutError => true,
            ErrorKind::ServerError => self
                .status_code
                .map_or(true, |status| (500..600).contains(&status)),
            ErrorKind::AuthError | ErrorKind::ValidationError | ErrorKind::UnknownError => false,
        }
    }

    /// Non-technical message shown to end users
    pub fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }

    /// Whether detailed error information should be logged
    pub fn should_log_details(&self) -> bool {
        !matches!(self.kind, ErrorKind::AuthError)
    }
}

/// Dispatch failures, before classification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The connection could not be established
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The connection was made but no response arrived
    #[error("No response received: {0}")]
    NoResponse(String),

    /// The transport gave up waiting
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The request could not be built (bad URL, bad header)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::NoResponse(err.to_string())
        }
    }
}

/// Raised by an interceptor; aborts the pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Interceptor '{name}' failed: {message}")]
pub struct InterceptorError {
    pub name: String,
    pub message: String,
}

impl InterceptorError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Raw failure fed to the classifier
#[derive(Debug, Clone)]
pub enum Failure {
    /// The transport did not produce a response
    Transport(TransportError),
    /// The per-attempt deadline fired before the transport finished
    DeadlineExceeded(std::time::Duration),
    /// A response arrived with an error status
    Status { status: u16, message: String },
    /// A request or response interceptor aborted the pipeline
    Interceptor(InterceptorError),
    /// A 2xx body that could not be parsed or decoded
    Decode(String),
}

/// Map an HTTP status onto the taxonomy
pub fn classify_status(status: u16) -> ErrorKind {
    match status {
        401 | 403 => ErrorKind::AuthError,
        400 | 422 => ErrorKind::ValidationError,
        500..=599 => ErrorKind::ServerError,
        _ => ErrorKind::UnknownError,
    }
}

/// Classify a raw failure
pub fn classify(failure: Failure) -> ApiError {
    match failure {
        Failure::Transport(err) => {
            let kind = match err {
                TransportError::Connect(_) | TransportError::NoResponse(_) => {
                    ErrorKind::NetworkError
                }
                TransportError::Timeout(_) => ErrorKind::TimeoutError,
                TransportError::InvalidRequest(_) => ErrorKind::UnknownError,
            };
            ApiError::new(kind, err.to_string())
        }
        Failure::DeadlineExceeded(deadline) => ApiError::new(
            ErrorKind::TimeoutError,
            format!("Deadline of {}ms exceeded", deadline.as_millis()),
        ),
        Failure::Status { status, message } => ApiError::from_status(status, message),
        Failure::Interceptor(err) => ApiError::unknown(err.to_string()),
        Failure::Decode(message) => ApiError::unknown(message),
    }
}

/// Fatal errors: misconfiguration and programmer faults
#[derive(Error, Debug)]
pub enum ClientError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// No source produced a base URL and no fallback is configured
    #[error("No base URL configured: set CRM_API_URL, provide extra.apiUrl in the app config, or configure a fallback")]
    MissingBaseUrl,

    /// A source produced a value that is not an http(s) URL
    #[error("Invalid base URL '{0}', should start with 'http'")]
    InvalidBaseUrl(String),

    /// An interceptor was registered incorrectly
    #[error("Invalid interceptor registration: {0}")]
    InvalidInterceptor(String),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Result type alias
pub type ClientResult<T> = Result<T, ClientError>;
