// ── Core error types ──
//
// Errors from starmap-core. Entity construction and NVR parsing fail with
// the input-shaped variants; the client facade translates transport-layer
// failures through `From<starmap_api::Error>`. A remote 404 is never an
// error here: the facade turns it into `None`.

use starmap_api::ApiVersion;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    /// The JSON root has the wrong shape (object expected, got array, ...).
    #[error("Got an unsupported JSON type: \"{found}\". Expected: \"{expected}\"")]
    UnsupportedJson {
        expected: &'static str,
        found: &'static str,
    },

    /// A required field is missing, has the wrong type, or breaks an invariant.
    #[error("Invalid {entity}: {message}")]
    Validation {
        entity: &'static str,
        message: String,
    },

    #[error("Invalid NVR: {message}")]
    InvalidNvr { message: String },

    // ── Lookup errors ────────────────────────────────────────────────
    #[error("No mappings found for account name {account}")]
    MappingNotFound { account: String },

    // ── Client errors ────────────────────────────────────────────────
    #[error("API mismatch: Provider has API {provider} but the client expects: {client}")]
    ApiMismatch {
        provider: ApiVersion,
        client: ApiVersion,
    },

    #[error("Cannot connect to StArMap at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("StArMap request timed out")]
    Timeout,

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub(crate) fn validation(entity: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            entity,
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<starmap_api::Error> for CoreError {
    fn from(err: starmap_api::Error) -> Self {
        match err {
            starmap_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            starmap_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            starmap_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            starmap_api::Error::Http {
                status,
                path,
                message,
            } => CoreError::Api {
                message: format!("{path}: {message}"),
                status: Some(status),
            },
            starmap_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("Deserialization error: {message}"),
                status: None,
            },
        }
    }
}
