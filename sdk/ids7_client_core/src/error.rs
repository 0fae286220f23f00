use std::fmt;

use thiserror::Error;

/// Maximum length of a response body rendered in an error message.
const MAX_ERROR_MESSAGE_LEN: usize = 1000;

/// Errors that can occur when talking to an IDS7 server.
#[derive(Error, Debug)]
pub enum Ids7Error {
    /// The server answered with a status other than the one the operation expects.
    ///
    /// `body` holds the raw response text; only the `Display` form is sanitized.
    #[error("request to {path} failed with status {status}: {}", truncate_message(.body))]
    Request {
        status: u16,
        body: String,
        path: String,
    },

    /// A response payload did not match the expected record shape.
    #[error("invalid {record} payload: {source}")]
    Validation {
        record: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// An outgoing payload could not be serialized into a JSON object.
    #[error("serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    /// A value could not be used as an HTTP header.
    #[error("invalid value for header {name}: {source}")]
    InvalidHeader {
        name: &'static str,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },

    /// An argument was rejected before any request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Ids7Error {
    /// Create a [`Ids7Error::Request`] error.
    pub fn request(status: u16, body: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Request {
            status,
            body: body.into(),
            path: path.into(),
        }
    }

    /// The HTTP status code, for [`Ids7Error::Request`] errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error was caused by a transient connection failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_transient())
    }
}

/// Result type alias for IDS7 operations.
pub type Ids7Result<T> = std::result::Result<T, Ids7Error>;

/// Category of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, reset, or name resolution failed.
    Connect,
    /// The request did not complete within the transport timeout.
    Timeout,
    /// Any other failure (invalid URL, TLS, body decoding, ...).
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => f.write_str("connection failed"),
            Self::Timeout => f.write_str("timed out"),
            Self::Other => f.write_str("request failed"),
        }
    }
}

/// A failure below the HTTP layer: no response was received.
#[derive(Error, Debug)]
#[error("{kind}: {source}")]
pub struct TransportError {
    kind: TransportErrorKind,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportError {
    /// Create a transport error of the given kind.
    pub fn new(
        kind: TransportErrorKind,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    /// Shorthand for a [`TransportErrorKind::Connect`] error.
    pub fn connect(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::new(TransportErrorKind::Connect, source)
    }

    /// Shorthand for a [`TransportErrorKind::Timeout`] error.
    pub fn timeout(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::new(TransportErrorKind::Timeout, source)
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// Connection and timeout failures may succeed when retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            TransportErrorKind::Connect | TransportErrorKind::Timeout
        )
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, err)
    }
}

/// Remove bearer tokens from text that may end up in logs.
pub(crate) fn sanitize_error_message(msg: &str) -> String {
    const BEARER: &str = "Bearer ";
    const REDACTED: &str = "[REDACTED]";

    let mut result = msg.to_string();
    let mut search_start = 0;
    while let Some(relative_pos) = result[search_start..].find(BEARER) {
        let token_start = search_start + relative_pos + BEARER.len();
        if result[token_start..].starts_with(REDACTED) {
            search_start = token_start + REDACTED.len();
            continue;
        }

        let token_end = result[token_start..]
            .find(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == ',')
            .map(|pos| token_start + pos)
            .unwrap_or(result.len());

        if token_end > token_start {
            result.replace_range(token_start..token_end, REDACTED);
            search_start = token_start + REDACTED.len();
        } else {
            search_start = token_start;
        }
    }
    result
}

/// Sanitize, then cap the message at [`MAX_ERROR_MESSAGE_LEN`] bytes.
pub(crate) fn truncate_message(msg: &str) -> String {
    let sanitized = sanitize_error_message(msg);
    if sanitized.len() <= MAX_ERROR_MESSAGE_LEN {
        return sanitized;
    }

    let mut end = MAX_ERROR_MESSAGE_LEN;
    while !sanitized.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", &sanitized[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_keeps_raw_body() {
        let err = Ids7Error::request(404, "Bearer abc123 not found", "/slides/x/info");
        match &err {
            Ids7Error::Request { status, body, path } => {
                assert_eq!(*status, 404);
                assert_eq!(body, "Bearer abc123 not found");
                assert_eq!(path, "/slides/x/info");
            }
            other => panic!("Expected Request error, got {:?}", other),
        }
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn request_error_display_redacts_tokens() {
        let err = Ids7Error::request(401, "invalid token Bearer abc123", "/info");
        let msg = err.to_string();

        assert!(msg.contains("/info"));
        assert!(msg.contains("401"));
        assert!(!msg.contains("abc123"), "token leaked: {msg}");
        assert!(msg.contains("[REDACTED]"));
    }

    #[test]
    fn sanitization_preserves_legitimate_errors() {
        let msg = "Slide 'abc' does not exist.";
        assert_eq!(sanitize_error_message(msg), msg);
    }

    #[test]
    fn sanitization_handles_multiple_tokens() {
        let msg = "Bearer one, then Bearer two";
        let result = sanitize_error_message(msg);
        assert_eq!(result, "Bearer [REDACTED], then Bearer [REDACTED]");
    }

    #[test]
    fn sanitization_ignores_trailing_bearer_keyword() {
        assert_eq!(sanitize_error_message("Bearer "), "Bearer ");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let msg = "é".repeat(MAX_ERROR_MESSAGE_LEN);
        let result = truncate_message(&msg);
        assert!(result.ends_with("... (truncated)"));
        assert!(result.len() <= MAX_ERROR_MESSAGE_LEN + "... (truncated)".len());
    }

    #[test]
    fn transport_error_classification() {
        assert!(TransportError::connect("refused").is_transient());
        assert!(TransportError::timeout("slow").is_transient());
        assert!(!TransportError::new(TransportErrorKind::Other, "bad url").is_transient());
    }

    #[test]
    fn transient_flag_propagates_to_ids7_error() {
        let err = Ids7Error::from(TransportError::connect("refused"));
        assert!(err.is_transient());
        assert_eq!(err.status(), None);
        assert!(!Ids7Error::request(503, "", "/info").is_transient());
    }
}
