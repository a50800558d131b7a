use thiserror::Error;

/// Top-level error type for the `starmap-api` crate.
///
/// Covers the failure modes of the HTTP session: transport, URL building,
/// non-success status codes and body decoding. `starmap-core` maps these
/// into its own error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake, certificate, or client-construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Status ──────────────────────────────────────────────────────
    /// Non-success status code surfaced by `raise_for_status`.
    #[error("HTTP {status} for {path}: {message}")]
    Http {
        status: u16,
        path: String,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => matches!(status, 500 | 502 | 503 | 504),
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

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_errors_classify_by_status() {
        let not_found = Error::Http {
            status: 404,
            path: "/policy/x".into(),
            message: "Not Found".into(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_transient());
        assert_eq!(not_found.status(), Some(404));

        let unavailable = Error::Http {
            status: 503,
            path: "/query".into(),
            message: "Service Unavailable".into(),
        };
        assert!(unavailable.is_transient());
        assert!(!unavailable.is_not_found());
    }

    #[test]
    fn deserialization_has_no_status() {
        let err = Error::Deserialization {
            message: "expected value".into(),
            body: "<html>".into(),
        };
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("expected value"));
    }
}
