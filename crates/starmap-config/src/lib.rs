//! Shared configuration for StArMap tools.
//!
//! TOML profiles merged with `STARMAP_` environment overrides, translation
//! to `starmap_core::ClientConfig`, and loading of offline mapping files
//! into local providers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use starmap_core::{
    ApiVersion, ClientConfig, ContainerMapProvider, CoreError, FlatMapProvider, FromJson,
    Provider, QueryResponse, QueryResponseContainer, TlsVerification,
};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{0}' not found")]
    UnknownProfile(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("invalid mappings file {path}: {source}")]
    MappingsFile {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Resolve a profile by name, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::UnknownProfile(name.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub api_version: ApiVersion,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_retries")]
    pub retries: u32,

    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            api_version: ApiVersion::default(),
            insecure: false,
            timeout: default_timeout(),
            retries: default_retries(),
            backoff_factor: default_backoff_factor(),
        }
    }
}

fn default_output() -> String {
    "json".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_retries() -> u32 {
    3
}
fn default_backoff_factor() -> f64 {
    2.0
}

/// A named StArMap server profile. Unset fields fall back to [`Defaults`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL (e.g., "https://starmap.example.com").
    pub url: String,

    pub api_version: Option<ApiVersion>,

    pub timeout: Option<u64>,

    pub retries: Option<u32>,

    pub backoff_factor: Option<f64>,

    /// Skip TLS verification.
    pub insecure: Option<bool>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// JSON file of mappings answered locally before querying the server.
    pub offline_mappings: Option<PathBuf>,
}

impl Profile {
    pub fn api_version(&self, defaults: &Defaults) -> ApiVersion {
        self.api_version.unwrap_or(defaults.api_version)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "starmap", "starmap").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("starmap");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// Nested keys are separated by a double underscore, e.g.
/// `STARMAP_DEFAULTS__API_VERSION=v2`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("STARMAP_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

/// Build a `ClientConfig` from a profile and the global defaults.
pub fn profile_to_client_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;

    let backoff_factor = profile.backoff_factor.unwrap_or(defaults.backoff_factor);
    if !backoff_factor.is_finite() || backoff_factor < 0.0 {
        return Err(ConfigError::Validation {
            field: "backoff_factor".into(),
            reason: format!("expected a non-negative number, got {backoff_factor}"),
        });
    }

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = ClientConfig::new(url, profile.api_version(defaults));
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.retries = profile.retries.unwrap_or(defaults.retries);
    config.backoff_factor = backoff_factor;
    Ok(config)
}

// ── Offline mappings ────────────────────────────────────────────────

/// Load a mappings file into the provider matching `api_version`.
///
/// APIv1 files hold a JSON array of query responses; APIv2 files hold a
/// query response container.
pub fn load_offline_provider(
    path: &Path,
    api_version: ApiVersion,
) -> Result<Provider, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let json: Value = serde_json::from_str(&raw).map_err(|source| ConfigError::MappingsFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_offline_mappings(&json, api_version)
}

/// Build a provider from already-decoded mappings JSON.
pub fn parse_offline_mappings(
    json: &Value,
    api_version: ApiVersion,
) -> Result<Provider, ConfigError> {
    let provider = match api_version {
        ApiVersion::V1 => {
            let Value::Array(items) = json else {
                return Err(ConfigError::Validation {
                    field: "offline_mappings".into(),
                    reason: "expected a JSON list of query responses".into(),
                });
            };
            let responses = items
                .iter()
                .map(QueryResponse::from_json)
                .collect::<Result<Vec<_>, _>>()?;
            Provider::from(FlatMapProvider::new(responses))
        }
        ApiVersion::V2 => {
            let container = QueryResponseContainer::from_json(json)?;
            Provider::from(ContainerMapProvider::new(container))
        }
    };
    debug!(api = %api_version, entries = provider.len(), "loaded offline mappings");
    Ok(provider)
}
