use thiserror::Error;

/// Classification attached to a failed transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Host could not be reached (DNS, refused connection, reset).
    Unreachable,
    /// The request was rejected before reaching the API (e.g. cross-origin policy).
    Blocked,
    /// The API answered with a non-2xx status.
    Status(u16),
    /// No answer within the request timeout.
    Timeout,
    Other,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Transport error ({kind:?}): {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(after: std::time::Duration) -> Self {
        Self::new(
            TransportErrorKind::Timeout,
            format!("no response after {}s", after.as_secs_f64()),
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self.kind {
            TransportErrorKind::Status(code) => Some(code),
            _ => None,
        }
    }
}

/// Failure of a cached query.
///
/// Cloned into every caller awaiting the same coalesced fetch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl QueryError {
    /// Only transport failures are worth another attempt; data errors are final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, QueryError::Transport(_))
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(e: serde_json::Error) -> Self {
        QueryError::Decode(e.to_string())
    }
}

/// Errors from the bounded comparison selection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Selection is full: at most {max} nodes can be compared")]
    Full { max: usize },

    #[error("{address} is already selected")]
    Duplicate { address: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_errors_retry() {
        let transport = QueryError::from(TransportError::new(TransportErrorKind::Unreachable, "down"));
        assert!(transport.is_retryable());
        assert!(!QueryError::NotFound("abc".into()).is_retryable());
        assert!(!QueryError::Decode("bad".into()).is_retryable());
    }

    #[test]
    fn test_status_accessor() {
        let err = TransportError::new(TransportErrorKind::Status(503), "unavailable");
        assert_eq!(err.status(), Some(503));
        assert_eq!(TransportError::timeout(std::time::Duration::from_secs(30)).status(), None);
    }
}
