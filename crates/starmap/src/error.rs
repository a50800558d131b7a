//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use starmap_config::ConfigError;
use starmap_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const VALIDATION: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to StArMap at {url}")]
    #[diagnostic(
        code(starmap::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             Reason: {reason}\n\
             Use --insecure (-k) for self-signed certificates."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(starmap::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(starmap::not_found), help("{hint}"))]
    NotFound {
        resource_type: String,
        identifier: String,
        hint: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    #[diagnostic(code(starmap::api_error))]
    ApiError { status: Option<u16>, message: String },

    #[error("{message}")]
    #[diagnostic(
        code(starmap::api_mismatch),
        help("Pass --api-version to match the mappings file, or use a file for this API version.")
    )]
    ApiMismatch { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(starmap::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(starmap::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: starmap config set url <URL> --profile {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No StArMap server configured")]
    #[diagnostic(
        code(starmap::no_config),
        help(
            "Pass --url, or set one with: starmap config set url <URL>\n\
             Config file: {path}\n\
             For offline use pass --mappings <FILE>."
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(starmap::config))]
    Config(ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(starmap::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::ApiMismatch { .. } => exit_code::VALIDATION,
            Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Render(err.to_string())
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::Timeout => CliError::Timeout,

            CoreError::MappingNotFound { account } => CliError::NotFound {
                resource_type: "mapping for account".into(),
                identifier: account,
                hint: "Run: starmap query <IMAGE> to see the available accounts".into(),
            },

            err @ CoreError::ApiMismatch { .. } => CliError::ApiMismatch {
                message: err.to_string(),
            },

            err @ (CoreError::UnsupportedJson { .. }
            | CoreError::Validation { .. }
            | CoreError::InvalidNvr { .. }) => CliError::Validation {
                field: "input".into(),
                reason: err.to_string(),
            },

            CoreError::Api { message, status } => CliError::ApiError { status, message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Core(core) => core.into(),
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile(name) => CliError::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            other => CliError::Config(other),
        }
    }
}
