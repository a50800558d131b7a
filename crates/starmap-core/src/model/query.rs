// ── APIv1 query result ──

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::common::Workflow;
use super::decode::FromJson;
use super::destination::Destination;
use crate::error::CoreError;
use crate::merge::JsonMap;

/// Flat query result: destinations grouped by cloud account name.
///
/// On the wire the accounts live under `mappings`; they are exposed as
/// `clouds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    name: String,
    workflow: Workflow,
    #[serde(rename(serialize = "mappings"), alias = "mappings")]
    clouds: IndexMap<String, Vec<Destination>>,
}

impl QueryResponse {
    pub fn new(
        name: impl Into<String>,
        workflow: Workflow,
        clouds: IndexMap<String, Vec<Destination>>,
    ) -> Self {
        Self {
            name: name.into(),
            workflow,
            clouds,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn workflow(&self) -> Workflow {
        self.workflow
    }

    pub fn clouds(&self) -> &IndexMap<String, Vec<Destination>> {
        &self.clouds
    }

    /// Destinations for a single cloud account, if present.
    pub fn destinations_for(&self, account: &str) -> Option<&[Destination]> {
        self.clouds.get(account).map(Vec::as_slice)
    }
}

impl FromJson for QueryResponse {
    const ENTITY: &'static str = "QueryResponse";

    fn preprocess(mut json: JsonMap) -> Result<JsonMap, CoreError> {
        if let Some(mappings) = json.remove("mappings") {
            json.insert("clouds".to_owned(), mappings);
        }
        Ok(json)
    }
}
