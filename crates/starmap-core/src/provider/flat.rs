// ── APIv1 provider: flat keyed store ──

use indexmap::IndexMap;
use starmap_api::ApiVersion;
use tracing::debug;

use super::{StarmapProvider, requested_name};
use crate::error::CoreError;
use crate::model::QueryResponse;
use crate::params::QueryParams;

const DEFAULT_SEPARATOR: &str = "+";

/// Stores APIv1 [`QueryResponse`]s keyed by `{name}{separator}{workflow}`.
#[derive(Debug, Clone)]
pub struct FlatMapProvider {
    separator: String,
    content: IndexMap<String, QueryResponse>,
}

impl FlatMapProvider {
    pub fn new(responses: impl IntoIterator<Item = QueryResponse>) -> Self {
        Self::with_separator(responses, DEFAULT_SEPARATOR)
    }

    pub fn with_separator(
        responses: impl IntoIterator<Item = QueryResponse>,
        separator: impl Into<String>,
    ) -> Self {
        let mut provider = Self {
            separator: separator.into(),
            content: IndexMap::new(),
        };
        for response in responses {
            provider.store(response);
        }
        provider
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    fn key(&self, name: &str, workflow: &str) -> String {
        format!("{name}{}{workflow}", self.separator)
    }
}

impl Default for FlatMapProvider {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl StarmapProvider for FlatMapProvider {
    type Entity = QueryResponse;
    type Answer = QueryResponse;

    const API: ApiVersion = ApiVersion::V1;

    fn query(&self, params: &QueryParams) -> Result<Option<QueryResponse>, CoreError> {
        let name = requested_name(params)?;
        let workflow = params.workflow.map(|w| w.to_string()).unwrap_or_default();
        let key = self.key(&name, &workflow);
        debug!(key = %key, "flat provider lookup");
        Ok(self.content.get(&key).cloned())
    }

    fn list_content(&self) -> Vec<&QueryResponse> {
        self.content.values().collect()
    }

    /// Insert or replace by name and workflow.
    fn store(&mut self, entity: QueryResponse) {
        let key = self.key(entity.name(), entity.workflow().as_ref());
        self.content.insert(key, entity);
    }
}
