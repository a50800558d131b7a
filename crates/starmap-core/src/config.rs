// ── Runtime client configuration ──
//
// Describes *where* the StArMap server is and how to talk to it.
// Never touches disk; `starmap-config` (or any caller) builds one and
// hands it to `StarmapClient::new`.

use std::path::PathBuf;
use std::time::Duration;

use starmap_api::{ApiVersion, TlsMode, TransportConfig};
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed staging servers).
    DangerAcceptInvalid,
}

/// Connection settings for one StArMap server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server URL (e.g., `https://starmap.example.com`).
    pub url: Url,
    pub api_version: ApiVersion,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Retries after a 5xx response or a connection failure.
    pub retries: u32,
    /// Backoff base in seconds; retry `n` waits `backoff_factor * 2^(n-1)`.
    pub backoff_factor: f64,
}

impl ClientConfig {
    pub fn new(url: Url, api_version: ApiVersion) -> Self {
        let transport = TransportConfig::default();
        Self {
            url,
            api_version,
            tls: TlsVerification::default(),
            timeout: transport.timeout,
            retries: transport.retries,
            backoff_factor: transport.backoff_factor,
        }
    }

    /// Transport settings derived from this config.
    pub fn transport_config(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
            retries: self.retries,
            backoff_factor: self.backoff_factor,
            ..TransportConfig::default()
        }
    }
}
