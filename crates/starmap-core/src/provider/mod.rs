// ── Local mapping providers ──
//
// In-process stores that answer mapping queries without the network.
// Each provider declares the API generation it speaks; the client refuses
// a provider whose generation differs from its own.

mod container;
mod flat;

pub use container::ContainerMapProvider;
pub use flat::FlatMapProvider;

use starmap_api::ApiVersion;

use crate::error::CoreError;
use crate::nvr::get_image_name;
use crate::params::{QueryParams, QueryResult};

/// Capability shared by local providers.
pub trait StarmapProvider {
    /// What the provider stores.
    type Entity;
    /// What a successful query returns.
    type Answer;

    /// API generation of the stored content.
    const API: ApiVersion;

    /// Resolve `params` locally; `Ok(None)` on a miss.
    fn query(&self, params: &QueryParams) -> Result<Option<Self::Answer>, CoreError>;

    /// Every stored entity.
    fn list_content(&self) -> Vec<&Self::Entity>;

    fn store(&mut self, entity: Self::Entity);
}

/// The image name a query targets: explicit `name`, or the name parsed out
/// of `image`.
pub(crate) fn requested_name(params: &QueryParams) -> Result<String, CoreError> {
    match params.name.as_deref() {
        Some(name) if !name.is_empty() => Ok(name.to_owned()),
        _ => get_image_name(params.image.as_deref()),
    }
}

/// Either provider, as held by the client.
#[derive(Debug, Clone)]
pub enum Provider {
    Flat(FlatMapProvider),
    Container(ContainerMapProvider),
}

impl Provider {
    pub fn api(&self) -> ApiVersion {
        match self {
            Self::Flat(_) => FlatMapProvider::API,
            Self::Container(_) => ContainerMapProvider::API,
        }
    }

    pub fn query(&self, params: &QueryParams) -> Result<Option<QueryResult>, CoreError> {
        match self {
            Self::Flat(p) => Ok(p.query(params)?.map(QueryResult::V1)),
            Self::Container(p) => Ok(p.query(params)?.map(QueryResult::V2)),
        }
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        match self {
            Self::Flat(p) => p.list_content().len(),
            Self::Container(p) => p.list_content().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<FlatMapProvider> for Provider {
    fn from(provider: FlatMapProvider) -> Self {
        Self::Flat(provider)
    }
}

impl From<ContainerMapProvider> for Provider {
    fn from(provider: ContainerMapProvider) -> Self {
        Self::Container(provider)
    }
}
