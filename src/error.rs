//! Error types and HTTP response classification
//!
//! Every non-2xx response from the server is turned into a [`ResponseError`]
//! tagged with an [`ErrorKind`]. Classification is a pure function of the
//! response; it never touches the network.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

use crate::transport::HttpResponse;

/// Response header carrying the server's internal numeric error code
pub const ERROR_CODE_HEADER: &str = "SD-Error-Code";

/// Human-readable description of a known server error code
pub fn describe_error_code(code: u32) -> Option<&'static str> {
    let description = match code {
        0 => "Authentication error",
        1 => "Authorization error",
        2 => "Query evaluation error",
        3 => "Unknown transaction",
        4 => "Unknown database",
        5 => "Database already exists",
        6 => "Invalid database name",
        7 => "Resource (user, role, etc) already exists",
        8 => "Invalid connection parameter(s)",
        9 => "Invalid database state for the request",
        10 => "Resource in use",
        11 => "Resource not found",
        _ => return None,
    };
    Some(description)
}

/// Closed set of error kinds surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400
    BadRequest,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 409, the operation conflicts with existing server state
    Conflict,
    /// Any other non-2xx status
    ServerError,
    /// Local lifecycle violation on a transaction
    TransactionConflict,
}

impl ErrorKind {
    /// Map a non-success HTTP status to its error kind
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => ErrorKind::BadRequest,
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            _ => ErrorKind::ServerError,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::ServerError => "ServerError",
            ErrorKind::TransactionConflict => "TransactionConflict",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed response from the server.
///
/// Keeps a snapshot of the response for diagnostics. The message is either
/// the explicit override given at construction or synthesized from the
/// error code, status line and body.
#[derive(Debug, Clone)]
pub struct ResponseError {
    kind: ErrorKind,
    message: Option<String>,
    response: HttpResponse,
}

impl ResponseError {
    /// Build the error matching the response status.
    ///
    /// Meant for non-success responses; [`classify`] only calls it for those.
    /// A 2xx status has no error kind of its own and is tagged `ServerError`.
    pub fn from_response(response: HttpResponse, message: Option<String>) -> Self {
        Self {
            kind: ErrorKind::from_status(response.status),
            message,
            response,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> StatusCode {
        self.response.status
    }

    /// Raw response retained for diagnostics
    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    /// Numeric server error code from the `SD-Error-Code` header.
    ///
    /// `None` when the header is missing or not a number.
    pub fn error_code(&self) -> Option<u32> {
        self.response
            .header(ERROR_CODE_HEADER)
            .and_then(|code| code.trim().parse().ok())
    }

    pub fn message(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }

        let mut msg = String::new();
        if let Some(description) = self.error_code().and_then(describe_error_code) {
            msg.push_str(description);
            msg.push(' ');
        }
        msg.push_str(&format!("HTTP Status={}", self.response.status.as_u16()));
        if !self.response.body.trim().is_empty() {
            msg.push_str(", ");
            msg.push_str(&self.response.body);
        }
        msg
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message())
    }
}

impl std::error::Error for ResponseError {}

/// Errors that can occur when talking to a Stardog server
#[derive(Error, Debug)]
pub enum StardogError {
    /// Non-2xx response from the server
    #[error("{0}")]
    Response(#[from] ResponseError),

    /// Transaction used out of order, or terminated twice.
    ///
    /// `source` is the server's 409 when the conflict was reported remotely.
    #[error("{message}")]
    TransactionConflict {
        message: String,
        source: Option<ResponseError>,
    },

    /// Reasoning level outside the supported set
    #[error("Invalid reasoning level: {0}")]
    InvalidReasoning(String),

    /// Unrecognized RDF serialization format
    #[error("Unknown RDF format: {0}")]
    InvalidFormat(String),

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body did not have the expected shape
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Client could not be constructed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for StardogError {
    fn from(err: reqwest::Error) -> Self {
        StardogError::Transport(err.to_string())
    }
}

impl StardogError {
    /// Lifecycle violation detected before any request was sent
    pub fn transaction_conflict(message: impl Into<String>) -> Self {
        StardogError::TransactionConflict {
            message: message.into(),
            source: None,
        }
    }

    /// Kind of a server-reported or lifecycle error
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            StardogError::Response(err) => Some(err.kind()),
            StardogError::TransactionConflict { .. } => Some(ErrorKind::TransactionConflict),
            _ => None,
        }
    }

    pub fn error_code(&self) -> Option<u32> {
        match self {
            StardogError::Response(err) => err.error_code(),
            StardogError::TransactionConflict { source, .. } => {
                source.as_ref().and_then(ResponseError::error_code)
            }
            _ => None,
        }
    }

    /// Whether sending the same request again may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            StardogError::Response(err) => err.kind() == ErrorKind::ServerError,
            StardogError::Transport(_) => true,
            _ => false,
        }
    }
}

pub type StardogResult<T> = Result<T, StardogError>;

/// Pass a 2xx response through unchanged, turn anything else into an error.
pub fn classify(response: HttpResponse) -> StardogResult<HttpResponse> {
    if response.status.is_success() {
        Ok(response)
    } else {
        Err(ResponseError::from_response(response, None).into())
    }
}
