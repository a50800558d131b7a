// ── APIv2 query container and filters ──

use serde::Serialize;
use serde_json::Value;

use super::common::Workflow;
use super::decode::FromJson;
use super::entity::QueryResponseEntity;
use super::query::QueryResponse;
use crate::error::CoreError;
use crate::merge::json_type_name;

/// Single-field predicate over query entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseFilter {
    Name(String),
    Cloud(String),
    Workflow(Workflow),
}

impl ResponseFilter {
    pub fn matches(&self, entity: &QueryResponseEntity) -> bool {
        match self {
            Self::Name(name) => entity.name() == name,
            Self::Cloud(cloud) => entity.cloud() == cloud,
            Self::Workflow(workflow) => entity.workflow() == *workflow,
        }
    }
}

/// Every per-cloud result of an APIv2 query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryResponseContainer {
    responses: Vec<QueryResponseEntity>,
}

impl QueryResponseContainer {
    pub fn new(responses: Vec<QueryResponseEntity>) -> Self {
        Self { responses }
    }

    /// Build from a JSON array of raw entities; any other root fails.
    pub fn from_json(json: &Value) -> Result<Self, CoreError> {
        let Value::Array(items) = json else {
            return Err(CoreError::UnsupportedJson {
                expected: "list",
                found: json_type_name(json),
            });
        };
        let responses = items
            .iter()
            .map(QueryResponseEntity::from_json)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { responses })
    }

    pub fn responses(&self) -> &[QueryResponseEntity] {
        &self.responses
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn into_responses(self) -> Vec<QueryResponseEntity> {
        self.responses
    }

    pub(crate) fn push(&mut self, entity: QueryResponseEntity) {
        self.responses.push(entity);
    }

    // ── Filters ──────────────────────────────────────────────────────
    //
    // `responses: None` filters the container's own list; an explicit
    // empty subset yields an empty result.

    pub fn filter_by_name<'a>(
        &'a self,
        name: &str,
        responses: Option<&[&'a QueryResponseEntity]>,
    ) -> Vec<&'a QueryResponseEntity> {
        self.apply(&ResponseFilter::Name(name.to_owned()), responses)
    }

    pub fn filter_by_workflow<'a>(
        &'a self,
        workflow: Workflow,
        responses: Option<&[&'a QueryResponseEntity]>,
    ) -> Vec<&'a QueryResponseEntity> {
        self.apply(&ResponseFilter::Workflow(workflow), responses)
    }

    pub fn filter_by_cloud<'a>(
        &'a self,
        cloud: &str,
        responses: Option<&[&'a QueryResponseEntity]>,
    ) -> Vec<&'a QueryResponseEntity> {
        self.apply(&ResponseFilter::Cloud(cloud.to_owned()), responses)
    }

    /// Apply `filters` in order, each one narrowing the previous result.
    pub fn filter_by(&self, filters: &[ResponseFilter]) -> Vec<&QueryResponseEntity> {
        let mut result: Vec<&QueryResponseEntity> = self.responses.iter().collect();
        for filter in filters {
            result = self.apply(filter, Some(result.as_slice()));
        }
        result
    }

    fn apply<'a>(
        &'a self,
        filter: &ResponseFilter,
        responses: Option<&[&'a QueryResponseEntity]>,
    ) -> Vec<&'a QueryResponseEntity> {
        match responses {
            Some(subset) => subset
                .iter()
                .copied()
                .filter(|entity| filter.matches(entity))
                .collect(),
            None => self
                .responses
                .iter()
                .filter(|entity| filter.matches(entity))
                .collect(),
        }
    }

    /// Every entity converted to the APIv1 flat shape.
    pub fn to_classic_query_responses(&self) -> Result<Vec<QueryResponse>, CoreError> {
        self.responses
            .iter()
            .map(QueryResponseEntity::to_classic_query_response)
            .collect()
    }
}

impl From<Vec<QueryResponseEntity>> for QueryResponseContainer {
    fn from(responses: Vec<QueryResponseEntity>) -> Self {
        Self::new(responses)
    }
}

impl<'a> IntoIterator for &'a QueryResponseContainer {
    type Item = &'a QueryResponseEntity;
    type IntoIter = std::slice::Iter<'a, QueryResponseEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.iter()
    }
}
