// ── Query parameters and results ──
//
// What a caller asks for, and what comes back for either API generation.
// The same parameters drive both the `/query` endpoint and local providers.

use std::fmt;

use serde::Serialize;

use crate::error::CoreError;
use crate::model::{QueryResponse, QueryResponseContainer, Workflow};

/// Parameters of a mapping query.
///
/// `image` carries a full NVR; `name` takes precedence when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Workflow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud: Option<String>,
}

impl QueryParams {
    /// Query by image NVR.
    pub fn image(nvr: impl Into<String>) -> Self {
        Self {
            image: Some(nvr.into()),
            ..Self::default()
        }
    }

    /// Query by image name.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_workflow(mut self, workflow: Workflow) -> Self {
        self.workflow = Some(workflow);
        self
    }

    pub fn with_cloud(mut self, cloud: impl Into<String>) -> Self {
        self.cloud = Some(cloud.into());
        self
    }

    /// Query-string pairs for the set fields, in declaration order.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(image) = &self.image {
            pairs.push(("image", image.clone()));
        }
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(version) = &self.version {
            pairs.push(("version", version.clone()));
        }
        if let Some(workflow) = self.workflow {
            pairs.push(("workflow", workflow.to_string()));
        }
        if let Some(cloud) = &self.cloud {
            pairs.push(("cloud", cloud.clone()));
        }
        pairs
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

/// A query answer from either API generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    V1(QueryResponse),
    V2(QueryResponseContainer),
}

impl QueryResult {
    /// The answer in the APIv1 flat shape, one response per entity for v2.
    pub fn into_classic(self) -> Result<Vec<QueryResponse>, CoreError> {
        match self {
            Self::V1(response) => Ok(vec![response]),
            Self::V2(container) => container.to_classic_query_responses(),
        }
    }

    pub fn as_v1(&self) -> Option<&QueryResponse> {
        match self {
            Self::V1(response) => Some(response),
            Self::V2(_) => None,
        }
    }

    pub fn as_v2(&self) -> Option<&QueryResponseContainer> {
        match self {
            Self::V2(container) => Some(container),
            Self::V1(_) => None,
        }
    }
}

impl From<QueryResponse> for QueryResult {
    fn from(response: QueryResponse) -> Self {
        Self::V1(response)
    }
}

impl From<QueryResponseContainer> for QueryResult {
    fn from(container: QueryResponseContainer) -> Self {
        Self::V2(container)
    }
}
