// ── Core error types ──
//
// Two families live here. `LoadError` is *data*: it is cloned into cache
// entries so views can render an error state. `CoreError` is returned by
// the few fallible operations that are not store mutations (key
// construction, selection persistence, client construction).

use thiserror::Error;

/// Coarse classification of a failed load.
///
/// Views may branch on the kind or the status code; the message is shown
/// as-is and never parsed further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum LoadErrorKind {
    /// The request never produced a response (DNS, connect, timeout, TLS).
    Network,
    /// The backend answered with a non-success status.
    Application,
    /// The token was missing, expired or rejected.
    Authentication,
    /// The response body did not match the expected shape.
    Decode,
}

/// Failure outcome stored on a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LoadError {
    pub kind: LoadErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl LoadError {
    pub fn new(kind: LoadErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl From<&vantage_api::Error> for LoadError {
    fn from(err: &vantage_api::Error) -> Self {
        use vantage_api::Error as Api;

        let kind = match err {
            Api::Authentication { .. } => LoadErrorKind::Authentication,
            Api::Http { .. } => LoadErrorKind::Application,
            Api::Transport(e) if e.status().is_some() => LoadErrorKind::Application,
            Api::Deserialization { .. } => LoadErrorKind::Decode,
            Api::Transport(_) | Api::InvalidUrl(_) | Api::InvalidBaseUrl(_) | Api::Tls(_) => {
                LoadErrorKind::Network
            }
        };
        Self {
            kind,
            status: err.status(),
            message: err.to_string(),
        }
    }
}

impl From<vantage_api::Error> for LoadError {
    fn from(err: vantage_api::Error) -> Self {
        Self::from(&err)
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid {field}: {reason}")]
    InvalidKey { field: &'static str, reason: String },

    #[error("Selection storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Api(#[from] vantage_api::Error),
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage {
            message: format!("invalid stored selection: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_from_api_http() {
        let api = vantage_api::Error::Http {
            status: 500,
            detail: Some("Internal Error".into()),
        };
        let err = LoadError::from(&api);
        assert_eq!(err.kind, LoadErrorKind::Application);
        assert_eq!(err.status, Some(500));
        assert_eq!(err.message, "HTTP 500: Internal Error");
    }

    #[test]
    fn load_error_from_api_auth_and_decode() {
        let auth = LoadError::from(vantage_api::Error::Authentication {
            message: "expired".into(),
        });
        assert_eq!(auth.kind, LoadErrorKind::Authentication);
        assert_eq!(auth.status, Some(401));

        let decode = LoadError::from(vantage_api::Error::Deserialization {
            message: "bad".into(),
            body: String::new(),
        });
        assert_eq!(decode.kind, LoadErrorKind::Decode);
        assert_eq!(decode.kind.to_string(), "decode");
    }
}
