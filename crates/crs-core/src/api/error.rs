use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Status carried by errors that never reached an HTTP response
/// (DNS failure, refused connection, reset, timeout).
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

/// Maximum length for raw response bodies in log lines
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// The single error shape every failed request converges to.
///
/// `status` is the HTTP status, or [`TRANSPORT_FAILURE_STATUS`] when no
/// response arrived. `body` is the parsed response body when there was one:
/// a JSON structure, or the raw text when the server did not send JSON.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} (status {status})")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    pub body: Option<Value>,
}

/// Coarse classification of an [`ApiError`], for picking a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Validation,
    Server,
    /// A 2xx response whose body did not match the expected schema
    Decode,
    Other,
}

impl ApiError {
    /// Build an error for a request that failed before a response arrived.
    pub fn transport(err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Request timed out".to_string()
        } else if err.is_connect() {
            format!("Could not connect to server: {}", err)
        } else {
            format!("Network error: {}", err)
        };
        Self {
            status: TRANSPORT_FAILURE_STATUS,
            message,
            body: None,
        }
    }

    /// Build an error from a non-2xx response and its permissively parsed body.
    ///
    /// Structured bodies (objects, arrays) supply the message when they carry
    /// one; anything else gets a message synthesized from the status line.
    pub fn from_response(status: StatusCode, body: Value) -> Self {
        let structured = matches!(body, Value::Object(_) | Value::Array(_));
        let message = structured
            .then(|| Self::message_from_body(&body))
            .flatten()
            .unwrap_or_else(|| Self::status_line(status));

        Self {
            status: status.as_u16(),
            message,
            body: (!body.is_null()).then_some(body),
        }
    }

    /// Build an error for a request body that could not be encoded.
    /// Nothing was sent, so it carries the transport status.
    pub fn serialize(err: &serde_json::Error) -> Self {
        Self {
            status: TRANSPORT_FAILURE_STATUS,
            message: format!("Could not encode request body: {}", err),
            body: None,
        }
    }

    /// Build an error for a successful response whose body didn't fit the
    /// schema the caller asked for.
    pub fn decode(status: StatusCode, err: &serde_json::Error, body: Value) -> Self {
        Self {
            status: status.as_u16(),
            message: format!("Unexpected response shape: {}", err),
            body: Some(body),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.status {
            TRANSPORT_FAILURE_STATUS => ErrorKind::Transport,
            200..=299 => ErrorKind::Decode,
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            400 | 422 => ErrorKind::Validation,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Other,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// Text to show a user: the server's own message when it sent one,
    /// otherwise the caller's fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self.body.as_ref().and_then(Self::message_from_body) {
            Some(message) => message,
            None if self.is_transport() => self.message.clone(),
            None => fallback.to_string(),
        }
    }

    /// Pull a message out of a structured error body.
    /// Validation layers often send `message` as a list of strings.
    fn message_from_body(body: &Value) -> Option<String> {
        let object = body.as_object()?;
        match object.get("message") {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Array(items)) => {
                let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                if !parts.is_empty() {
                    return Some(parts.join(", "));
                }
            }
            _ => {}
        }
        object
            .get("error")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn status_line(status: StatusCode) -> String {
        match status.canonical_reason() {
            Some(reason) => format!("{} {}", status.as_u16(), reason),
            None => format!("HTTP {}", status.as_u16()),
        }
    }

    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
    }
}
