// ── Destination ──

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::decode::{self, FromJson};
use crate::merge::JsonMap;

/// A single marketplace listing target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    id: Option<String>,
    #[serde(default, deserialize_with = "decode::meta")]
    meta: Option<JsonMap>,
    architecture: Option<String>,
    /// The product listing destination in the cloud marketplace.
    destination: String,
    overwrite: bool,
    restrict_version: bool,
    restrict_major: Option<i64>,
    restrict_minor: Option<i64>,
    ami_version_template: Option<String>,
    /// Set from the parent mapping during APIv2 normalization.
    provider: Option<String>,
    tags: Option<IndexMap<String, String>>,
    vhd_check_base_sas_only: Option<bool>,
}

impl Destination {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn meta(&self) -> Option<&JsonMap> {
        self.meta.as_ref()
    }

    pub fn architecture(&self) -> Option<&str> {
        self.architecture.as_deref()
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Whether to replace the existing image in the destination instead of appending.
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Whether older releases of the same X.Y line get restricted.
    pub fn restrict_version(&self) -> bool {
        self.restrict_version
    }

    /// How many major versions are kept.
    pub fn restrict_major(&self) -> Option<i64> {
        self.restrict_major
    }

    /// How many minor versions are kept per major version.
    pub fn restrict_minor(&self) -> Option<i64> {
        self.restrict_minor
    }

    /// e.g. `{major}.{minor}`.
    pub fn ami_version_template(&self) -> Option<&str> {
        self.ami_version_template.as_deref()
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn tags(&self) -> Option<&IndexMap<String, String>> {
        self.tags.as_ref()
    }

    /// Compare only the base SAS URI, ignoring its parameters. Defaults to `false`.
    pub fn vhd_check_base_sas_only(&self) -> bool {
        self.vhd_check_base_sas_only.unwrap_or(false)
    }

    /// A copy of this destination carrying `meta` instead.
    pub(crate) fn with_meta(&self, meta: JsonMap) -> Self {
        Self {
            meta: Some(meta),
            ..self.clone()
        }
    }
}

impl FromJson for Destination {
    const ENTITY: &'static str = "Destination";
}
