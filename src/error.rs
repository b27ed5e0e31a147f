//! Error handling for the InvoiceFlow client

use std::collections::HashMap;
use std::fmt;

use invoiceflow_session::SessionError;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Unified error type for the InvoiceFlow client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Session storage or token errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// The server rejected the session (401/403); the session has been
    /// cleared and the user sent to login
    #[error("Session rejected by server (status {status})")]
    Unauthorized { status: u16 },

    /// Non-success response from the API
    #[error("API error: {0}")]
    Api(ApiError),

    /// Client-side validation failure; nothing was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// HTTP status of the failed response, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Unauthorized { status } => Some(*status),
            Error::Api(e) => Some(e.status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the request never got a response
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(e) if e.status().is_none())
    }

    /// The error in the client's user-facing taxonomy
    pub fn notice(&self) -> ErrorNotice {
        match self {
            Error::Validation(msg) => ErrorNotice::new(ErrorKind::Validation, msg),
            Error::Unauthorized { .. } | Error::Session(SessionError::InvalidToken(_)) => {
                ErrorNotice::new(ErrorKind::SessionExpired, SESSION_EXPIRED_MESSAGE)
            }
            Error::Api(e) => match e.status {
                401 => ErrorNotice::new(ErrorKind::Authentication, &e.message),
                409 => ErrorNotice::new(ErrorKind::Conflict, &e.message),
                400 | 422 => ErrorNotice::new(ErrorKind::Validation, &e.message),
                _ => ErrorNotice::new(ErrorKind::Transport, e.detailed_message()),
            },
            Error::Http(_) => ErrorNotice::new(ErrorKind::Transport, CONNECTION_FAILED_MESSAGE),
            other => ErrorNotice::new(ErrorKind::Transport, other.to_string()),
        }
    }
}

/// Banner text after a forced logout
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";

/// Toast text when the API could not be reached
pub const CONNECTION_FAILED_MESSAGE: &str = "Connection failed. Check your internet.";

/// Error body returned by the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status
    pub status: u16,
    /// Server `error` or `message`, else the body text or status reason
    pub message: String,
    /// Server `error` or `message` exactly as sent, if any
    pub server_message: Option<String>,
    /// Server `details`
    pub details: Option<String>,
    /// Per-field validation messages
    pub fields: HashMap<String, String>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
    details: Option<String>,
    #[serde(default)]
    fields: HashMap<String, String>,
}

impl ApiError {
    /// Build from a status and a raw response body
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let server_message = parsed.error.or(parsed.message);
        let message = server_message
            .clone()
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });

        Self {
            status: status.as_u16(),
            message,
            server_message,
            details: parsed.details,
            fields: parsed.fields,
        }
    }

    /// `details` when the server sent them, else the message
    pub fn detailed_message(&self) -> &str {
        self.details.as_deref().unwrap_or(&self.message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.message)
    }
}

/// Classes of error the client distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Field-level, detected before sending
    Validation,
    /// Bad credentials
    Authentication,
    /// The resource already exists
    Conflict,
    /// The session is gone; the user was sent to login
    SessionExpired,
    /// Server failure or no connection
    Transport,
}

/// Follow-up the user can take from an error message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestedAction {
    /// Sign in with an existing account instead
    SignIn { email: String },
}

impl SuggestedAction {
    /// Label for the action link
    pub fn label(&self) -> &'static str {
        match self {
            SuggestedAction::SignIn { .. } => "Sign in instead",
        }
    }

    /// Target location, relative to the login page path
    pub fn location(&self, login_path: &str) -> String {
        match self {
            SuggestedAction::SignIn { email } => {
                format!("{}?email={}", login_path, urlencoding::encode(email))
            }
        }
    }
}

/// A user-facing error: kind, text and an optional follow-up action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub kind: ErrorKind,
    pub message: String,
    pub suggested_action: Option<SuggestedAction>,
}

impl ErrorNotice {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggested_action: None,
        }
    }

    pub fn with_action(mut self, action: SuggestedAction) -> Self {
        self.suggested_action = Some(action);
        self
    }
}

impl fmt::Display for ErrorNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
