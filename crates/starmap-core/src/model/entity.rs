// ── APIv2 query entities ──
//
// Normalization pushes metadata downwards before construction:
//   entity.meta ─▶ mappings[*].meta ─▶ destinations[*].meta
// with the more specific level winning on key collisions, and each
// mapping's `provider` copied onto its destinations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::billing::BillingCodeRule;
use super::common::Workflow;
use super::decode::{self, FromJson, raw_meta, take_list, take_object};
use super::destination::Destination;
use super::query::QueryResponse;
use crate::error::CoreError;
use crate::merge::{JsonMap, into_object, merge_maps};

/// Wire key of the billing-code rules on a query entity.
pub const BILLING_CODE_CONFIG_KEY: &str = "billing-code-config";

// ── MappingResponseObject ────────────────────────────────────────────

/// One cloud account's destinations inside a [`QueryResponseEntity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingResponseObject {
    #[serde(default, deserialize_with = "decode::meta")]
    meta: Option<JsonMap>,
    #[serde(default)]
    destinations: Vec<Destination>,
    /// Provider name for the community workflow.
    provider: Option<String>,
}

impl MappingResponseObject {
    pub fn meta(&self) -> Option<&JsonMap> {
        self.meta.as_ref()
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }
}

impl FromJson for MappingResponseObject {
    const ENTITY: &'static str = "MappingResponseObject";

    /// Merge `meta` into every destination and stamp them with `provider`.
    fn preprocess(mut json: JsonMap) -> Result<JsonMap, CoreError> {
        let meta = raw_meta(&json, Self::ENTITY)?;
        let provider = json.get("provider").cloned().unwrap_or(Value::Null);
        let raw_destinations = take_list(&mut json, "destinations", Self::ENTITY)?;

        let mut destinations = Vec::with_capacity(raw_destinations.len());
        for raw in raw_destinations {
            let mut dest = into_object(raw)?;
            let own = raw_meta(&dest, Destination::ENTITY)?;
            dest.insert("meta".to_owned(), Value::Object(merge_maps(&meta, &own)));
            dest.insert("provider".to_owned(), provider.clone());
            destinations.push(Value::Object(Destination::preprocess(dest)?));
        }
        json.insert("destinations".to_owned(), Value::Array(destinations));
        Ok(json)
    }
}

// ── QueryResponseEntity ──────────────────────────────────────────────

/// One APIv2 query result: a policy's mappings for a single cloud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponseEntity {
    #[serde(default, deserialize_with = "decode::meta")]
    meta: Option<JsonMap>,
    /// The policy name.
    name: String,
    cloud: String,
    workflow: Workflow,
    #[serde(
        default,
        rename(serialize = "billing-code-config"),
        alias = "billing-code-config"
    )]
    billing_code_config: Option<IndexMap<String, BillingCodeRule>>,
    /// Keyed by cloud account name.
    mappings: IndexMap<String, MappingResponseObject>,
}

impl QueryResponseEntity {
    pub fn meta(&self) -> Option<&JsonMap> {
        self.meta.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cloud(&self) -> &str {
        &self.cloud
    }

    pub fn workflow(&self) -> Workflow {
        self.workflow
    }

    pub fn billing_code_config(&self) -> Option<&IndexMap<String, BillingCodeRule>> {
        self.billing_code_config.as_ref()
    }

    pub fn mappings(&self) -> &IndexMap<String, MappingResponseObject> {
        &self.mappings
    }

    /// Cloud account names, in payload order.
    pub fn account_names(&self) -> Vec<&str> {
        self.mappings.keys().map(String::as_str).collect()
    }

    pub fn all_mappings(&self) -> Vec<&MappingResponseObject> {
        self.mappings.values().collect()
    }

    pub fn get_mapping_for_account(
        &self,
        account: &str,
    ) -> Result<&MappingResponseObject, CoreError> {
        self.mappings
            .get(account)
            .ok_or_else(|| CoreError::MappingNotFound {
                account: account.to_owned(),
            })
    }

    /// Convert into the APIv1 flat shape.
    ///
    /// Each account's destinations are copied; when billing rules are set,
    /// every copy also gets them under `meta["billing-code-config"]`.
    pub fn to_classic_query_response(&self) -> Result<QueryResponse, CoreError> {
        let billing = self
            .billing_code_config
            .as_ref()
            .filter(|rules| !rules.is_empty())
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| CoreError::validation("BillingCodeRule", e.to_string()))?;

        let clouds = self
            .mappings
            .iter()
            .map(|(account, mapping)| {
                let destinations = mapping
                    .destinations()
                    .iter()
                    .map(|dest| match &billing {
                        Some(rules) => {
                            let mut meta = dest.meta().cloned().unwrap_or_default();
                            meta.insert(BILLING_CODE_CONFIG_KEY.to_owned(), rules.clone());
                            dest.with_meta(meta)
                        }
                        None => dest.clone(),
                    })
                    .collect();
                (account.clone(), destinations)
            })
            .collect();

        Ok(QueryResponse::new(self.name.clone(), self.workflow, clouds))
    }
}

impl FromJson for QueryResponseEntity {
    const ENTITY: &'static str = "QueryResponseEntity";

    fn preprocess(mut json: JsonMap) -> Result<JsonMap, CoreError> {
        if let Some(rules) = json.remove(BILLING_CODE_CONFIG_KEY) {
            json.insert("billing_code_config".to_owned(), rules);
        }
        if let Some(Value::Object(rules)) = json.get("billing_code_config") {
            for rule in rules.values() {
                crate::merge::expect_object(rule)?;
            }
        }

        let meta = raw_meta(&json, Self::ENTITY)?;
        let raw_mappings = take_object(&mut json, "mappings", Self::ENTITY)?;
        let mut mappings = JsonMap::new();
        for (account, raw) in raw_mappings {
            debug!(account = %account, "normalizing mapping");
            let mut mapping = into_object(raw)?;
            let own = raw_meta(&mapping, MappingResponseObject::ENTITY)?;
            mapping.insert("meta".to_owned(), Value::Object(merge_maps(&meta, &own)));
            mappings.insert(
                account,
                Value::Object(MappingResponseObject::preprocess(mapping)?),
            );
        }
        json.insert("mappings".to_owned(), Value::Object(mappings));
        Ok(json)
    }
}
