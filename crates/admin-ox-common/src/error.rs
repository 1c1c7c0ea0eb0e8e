use thiserror::Error;

/// Categorizes errors so callers can tell a failed request from one that was
/// deliberately abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or connection issues
    Transport,
    /// The backend answered with a non-2xx status
    Status,
    /// The body could not be decoded into the expected shape
    Decode,
    /// The request was abandoned through its cancellation token
    Cancelled,
    /// Client misconfiguration (bad base URL and the like)
    Config,
}

/// Errors that can occur while talking to the admin backend
#[derive(Error, Debug)]
pub enum AdminRequestError {
    /// HTTP request failed before a status was received
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered outside the 200-299 range
    #[error("Request failed: {status}{}", reason_suffix(.status_text))]
    Status {
        status: u16,
        status_text: String,
        body: String,
    },

    /// The body was not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Valid JSON that does not match the expected record shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The base URL or an endpoint path could not be turned into a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request was cancelled before it completed
    #[error("Request cancelled")]
    Cancelled,
}

impl AdminRequestError {
    /// Returns the error kind
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(e) if e.is_decode() => ErrorKind::Decode,
            Self::Http(_) => ErrorKind::Transport,
            Self::Status { .. } => ErrorKind::Status,
            Self::Json(_) | Self::Decode(_) => ErrorKind::Decode,
            Self::InvalidUrl(_) => ErrorKind::Config,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Cancellation is not a failure; callers drop these before touching state.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The HTTP status carried by the error, when the backend sent one
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// ` Reason` for known reasons, nothing for codes without one.
fn reason_suffix(status_text: &str) -> String {
    if status_text.is_empty() {
        String::new()
    } else {
        format!(" {status_text}")
    }
}

/// Build a status error from a non-2xx response.
pub fn parse_error_response(status: reqwest::StatusCode, body: &bytes::Bytes) -> AdminRequestError {
    AdminRequestError::Status {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(body).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message_names_code_and_reason() {
        let err = parse_error_response(
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
            &bytes::Bytes::from_static(b"down for maintenance"),
        );
        assert_eq!(err.to_string(), "Request failed: 503 Service Unavailable");
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.kind(), ErrorKind::Status);
        match err {
            AdminRequestError::Status { body, .. } => assert_eq!(body, "down for maintenance"),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_status_has_no_dangling_separator() {
        let status = reqwest::StatusCode::from_u16(599).expect("valid code");
        let err = parse_error_response(status, &bytes::Bytes::new());
        assert_eq!(err.to_string(), "Request failed: 599");
    }

    #[test]
    fn cancellation_is_its_own_kind() {
        let err = AdminRequestError::Cancelled;
        assert!(err.is_cancelled());
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(!AdminRequestError::Decode("x".into()).is_cancelled());
    }
}
