// ── APIv1 Policy and Mapping ──

use serde::{Deserialize, Serialize};

use super::common::Workflow;
use super::decode::{self, FromJson};
use super::destination::Destination;
use crate::merge::JsonMap;

/// One marketplace account's destinations within a [`Policy`].
///
/// `version_fnmatch` and `version_regexmatch` are meant to be used one at a
/// time; having both is not rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    id: Option<String>,
    #[serde(default, deserialize_with = "decode::meta")]
    meta: Option<JsonMap>,
    #[serde(deserialize_with = "decode::non_empty")]
    destinations: Vec<Destination>,
    marketplace_account: String,
    version_fnmatch: Option<String>,
    version_regexmatch: Option<String>,
}

impl Mapping {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn meta(&self) -> Option<&JsonMap> {
        self.meta.as_ref()
    }

    /// Never empty.
    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn marketplace_account(&self) -> &str {
        &self.marketplace_account
    }

    /// `fnmatch` pattern restricting the NVR versions this mapping applies to.
    pub fn version_fnmatch(&self) -> Option<&str> {
        self.version_fnmatch.as_deref()
    }

    /// Regex restricting the NVR versions this mapping applies to.
    pub fn version_regexmatch(&self) -> Option<&str> {
        self.version_regexmatch.as_deref()
    }

    pub fn into_destinations(self) -> Vec<Destination> {
        self.destinations
    }
}

impl FromJson for Mapping {
    const ENTITY: &'static str = "Mapping";
}

/// A named rule set mapping an image to its marketplace accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    id: Option<String>,
    #[serde(default, deserialize_with = "decode::meta")]
    meta: Option<JsonMap>,
    #[serde(deserialize_with = "decode::non_empty")]
    mappings: Vec<Mapping>,
    /// The package name, which is also the policy name.
    name: String,
    workflow: Workflow,
}

impl Policy {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn meta(&self) -> Option<&JsonMap> {
        self.meta.as_ref()
    }

    /// Never empty.
    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn workflow(&self) -> Workflow {
        self.workflow
    }

    pub fn into_mappings(self) -> Vec<Mapping> {
        self.mappings
    }
}

impl FromJson for Policy {
    const ENTITY: &'static str = "Policy";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn mapping_json() -> Value {
        json!({
            "id": "mapping-1",
            "marketplace_account": "aws-na",
            "version_fnmatch": "8.*",
            "destinations": [
                {
                    "destination": "ffffffff-ffff-ffff-ffff-ffffffffffff",
                    "overwrite": false,
                    "restrict_version": true,
                    "restrict_major": 3,
                    "restrict_minor": 1
                },
                {
                    "destination": "00000000-0000-0000-0000-000000000000",
                    "overwrite": true,
                    "restrict_version": false,
                    "ami_version_template": "{major}.{minor}"
                }
            ]
        })
    }

    #[test]
    fn mapping_builds_its_destinations() {
        let m = Mapping::from_json(&mapping_json()).unwrap();
        assert_eq!(m.marketplace_account(), "aws-na");
        assert_eq!(m.version_fnmatch(), Some("8.*"));
        assert_eq!(m.version_regexmatch(), None);
        assert_eq!(m.destinations().len(), 2);
        assert_eq!(m.destinations()[0].restrict_major(), Some(3));
        assert_eq!(
            m.destinations()[1].ami_version_template(),
            Some("{major}.{minor}")
        );
    }

    #[test]
    fn mapping_needs_a_destination() {
        let mut raw = mapping_json();
        raw["destinations"] = json!([]);
        let err = Mapping::from_json(&raw).unwrap_err();
        assert!(err.to_string().contains("at least 1 element"));

        raw.as_object_mut().unwrap().remove("destinations");
        assert!(Mapping::from_json(&raw).is_err());
    }

    #[test]
    fn mapping_with_a_bad_destination_fails() {
        let mut raw = mapping_json();
        raw["destinations"][1]
            .as_object_mut()
            .unwrap()
            .remove("destination");
        assert!(Mapping::from_json(&raw).is_err());
    }

    #[test]
    fn policy_builds_its_mappings() {
        let raw = json!({
            "id": "policy-1",
            "name": "sample-product",
            "workflow": "stratosphere",
            "meta": {"description": "test"},
            "mappings": [mapping_json()]
        });
        let p = Policy::from_json(&raw).unwrap();
        assert_eq!(p.name(), "sample-product");
        assert_eq!(p.workflow(), Workflow::Stratosphere);
        assert_eq!(p.mappings().len(), 1);
        assert_eq!(p.meta().unwrap()["description"], "test");
    }

    #[test]
    fn policy_rejects_unknown_workflow_and_empty_mappings() {
        let raw = json!({
            "name": "sample-product",
            "workflow": "foo",
            "mappings": [mapping_json()]
        });
        assert!(Policy::from_json(&raw).is_err());

        let raw = json!({
            "name": "sample-product",
            "workflow": "community",
            "mappings": []
        });
        assert!(Policy::from_json(&raw).is_err());
    }
}
