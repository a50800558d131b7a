//! CLI configuration: a thin wrapper around `starmap_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--url, --api-version, --mappings, etc.).

use std::path::{Path, PathBuf};

use starmap_core::{ApiVersion, ClientConfig, Provider};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use starmap_config::{Config, Profile, config_path};

/// What a command needs to reach StArMap: a server, local mappings, or both.
#[derive(Debug)]
pub struct Resolved {
    pub api_version: ApiVersion,
    pub server: Option<ClientConfig>,
    pub provider: Option<Provider>,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// The config file in effect: `--config` or the platform default.
pub fn active_config_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load the config file in effect. A missing file still picks up defaults
/// and `STARMAP_` environment overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(starmap_config::load_config_from(&active_config_path(global))?)
}

pub fn save(global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    Ok(starmap_config::save_config_to(cfg, &active_config_path(global))?)
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Merge the active profile with global flags.
///
/// An explicitly requested profile must exist; the default one may be
/// missing, in which case flags alone describe the target.
pub fn effective_profile(global: &GlobalOpts, config: &Config) -> Result<Profile, CliError> {
    let name = active_profile_name(global, config);
    let mut profile = match config.profiles.get(&name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name,
                available: available_profiles(config),
            });
        }
        None => Profile::default(),
    };

    if let Some(url) = &global.url {
        profile.url.clone_from(url);
    }
    if let Some(version) = global.api_version {
        profile.api_version = Some(version);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(mappings) = &global.mappings {
        profile.offline_mappings = Some(mappings.clone());
    }
    Ok(profile)
}

/// Translate config + flags into a server config and an optional provider.
pub fn resolve(global: &GlobalOpts, config: &Config) -> Result<Resolved, CliError> {
    let profile = effective_profile(global, config)?;
    let api_version = profile.api_version(&config.defaults);

    let provider = profile
        .offline_mappings
        .as_deref()
        .map(|path| load_provider(path, api_version))
        .transpose()?;

    let server = if global.offline || profile.url.is_empty() {
        None
    } else {
        Some(starmap_config::profile_to_client_config(
            &profile,
            &config.defaults,
        )?)
    };

    Ok(Resolved {
        api_version,
        server,
        provider,
    })
}

fn load_provider(path: &Path, api_version: ApiVersion) -> Result<Provider, CliError> {
    tracing::debug!(path = %path.display(), "loading offline mappings");
    Ok(starmap_config::load_offline_provider(path, api_version)?)
}

pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}
