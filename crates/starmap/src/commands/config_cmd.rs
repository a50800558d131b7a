//! Config subcommand handlers.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::str::FromStr;

use starmap_core::ApiVersion;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display as TOML-like text.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "api_version = \"{}\"", cfg.defaults.api_version);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "retries = {}", cfg.defaults.retries);
    let _ = write!(out, "backoff_factor = {}", cfg.defaults.backoff_factor);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = write!(out, "url = \"{}\"", p.url);
        if let Some(version) = p.api_version {
            let _ = write!(out, "\napi_version = \"{version}\"");
        }
        if let Some(timeout) = p.timeout {
            let _ = write!(out, "\ntimeout = {timeout}");
        }
        if let Some(retries) = p.retries {
            let _ = write!(out, "\nretries = {retries}");
        }
        if let Some(factor) = p.backoff_factor {
            let _ = write!(out, "\nbackoff_factor = {factor}");
        }
        if let Some(insecure) = p.insecure {
            let _ = write!(out, "\ninsecure = {insecure}");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = write!(out, "\nca_cert = \"{}\"", ca.display());
        }
        if let Some(ref mappings) = p.offline_mappings {
            let _ = write!(out, "\noffline_mappings = \"{}\"", mappings.display());
        }
    }
    out
}

fn parse_value<T: FromStr>(field: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("must be {expected}, got '{value}'"),
    })
}

/// Apply `key = value` to a profile.
pub fn set_profile_value(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "url" => {
            parse_value::<url::Url>(key, &value, "a URL")?;
            profile.url = value;
        }
        "api_version" | "api-version" => {
            profile.api_version = Some(parse_value::<ApiVersion>(key, &value, "'v1' or 'v2'")?);
        }
        "timeout" => profile.timeout = Some(parse_value(key, &value, "a number of seconds")?),
        "retries" => profile.retries = Some(parse_value(key, &value, "a whole number")?),
        "backoff_factor" | "backoff-factor" => {
            profile.backoff_factor = Some(parse_value(key, &value, "a number")?);
        }
        "insecure" => profile.insecure = Some(parse_value(key, &value, "'true' or 'false'")?),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(PathBuf::from(value)),
        "offline_mappings" | "offline-mappings" | "mappings" => {
            profile.offline_mappings = Some(PathBuf::from(value));
        }
        other => {
            return Err(CliError::Validation {
                field: "key".into(),
                reason: format!("unknown profile key '{other}'"),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                "config".into()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            let path = config::active_config_path(global);
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load(global)?;
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_profile_value(profile, &key, value)?;
            config::save(global, &cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load(global)?;
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: starmap config set url <URL>");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load(global)?;

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save(global, &cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }
    }
}
