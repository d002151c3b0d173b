use thiserror::Error;

/// Top-level error type for the `vantage-api` crate.
///
/// Covers every failure mode of a REST call: transport, TLS, authentication,
/// non-success HTTP status and response decoding. `vantage-core` turns these
/// into store data; it never lets them escape an action creator.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token missing, expired or rejected (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured base URL cannot carry path segments (e.g. `mailto:`).
    #[error("Base URL cannot be used for API paths: {0}")]
    InvalidBaseUrl(String),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Application ─────────────────────────────────────────────────
    /// Non-success HTTP status. `detail` is the backend's `{"detail": ...}`
    /// message when the body carried one.
    #[error("HTTP {status}: {}", .detail.as_deref().unwrap_or("request failed"))]
    Http { status: u16, detail: Option<String> },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the token should be refreshed or re-entered.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Http { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status code associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Authentication { .. } => Some(401),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display_uses_detail() {
        let err = Error::Http {
            status: 403,
            detail: Some("You do not have permission".into()),
        };
        assert_eq!(err.to_string(), "HTTP 403: You do not have permission");

        let bare = Error::Http {
            status: 500,
            detail: None,
        };
        assert_eq!(bare.to_string(), "HTTP 500: request failed");
    }

    #[test]
    fn classification_helpers() {
        let not_found = Error::Http {
            status: 404,
            detail: None,
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_transient());
        assert_eq!(not_found.status(), Some(404));

        let busy = Error::Http {
            status: 503,
            detail: None,
        };
        assert!(busy.is_transient());

        let auth = Error::Authentication {
            message: "expired".into(),
        };
        assert!(auth.is_auth_expired());
        assert_eq!(auth.status(), Some(401));
    }
}
