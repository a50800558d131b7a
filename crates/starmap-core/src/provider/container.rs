// ── APIv2 provider: container filtering ──

use starmap_api::ApiVersion;
use tracing::debug;

use super::{StarmapProvider, requested_name};
use crate::error::CoreError;
use crate::model::{QueryResponseContainer, QueryResponseEntity, ResponseFilter};
use crate::params::QueryParams;

/// Answers queries by filtering one [`QueryResponseContainer`].
#[derive(Debug, Clone, Default)]
pub struct ContainerMapProvider {
    container: QueryResponseContainer,
}

impl ContainerMapProvider {
    pub fn new(container: QueryResponseContainer) -> Self {
        Self { container }
    }

    pub fn container(&self) -> &QueryResponseContainer {
        &self.container
    }
}

impl StarmapProvider for ContainerMapProvider {
    type Entity = QueryResponseEntity;
    type Answer = QueryResponseContainer;

    const API: ApiVersion = ApiVersion::V2;

    /// A new container with the matching entities; `None` when nothing matches.
    fn query(&self, params: &QueryParams) -> Result<Option<QueryResponseContainer>, CoreError> {
        let mut filters = vec![ResponseFilter::Name(requested_name(params)?)];
        if let Some(cloud) = &params.cloud {
            filters.push(ResponseFilter::Cloud(cloud.clone()));
        }
        if let Some(workflow) = params.workflow {
            filters.push(ResponseFilter::Workflow(workflow));
        }

        let matches = self.container.filter_by(&filters);
        debug!(?filters, hits = matches.len(), "container provider lookup");
        if matches.is_empty() {
            return Ok(None);
        }
        Ok(Some(QueryResponseContainer::new(
            matches.into_iter().cloned().collect(),
        )))
    }

    fn list_content(&self) -> Vec<&QueryResponseEntity> {
        self.container.responses().iter().collect()
    }

    /// Append without deduplication.
    fn store(&mut self, entity: QueryResponseEntity) {
        self.container.push(entity);
    }
}
