// ── StArMap client facade ──
//
// Sequences transport calls and turns responses into entities. A remote
// 404 is logged and mapped to `None` (or an empty list); every other
// non-2xx status is an error. When a local provider is attached, queries
// consult it first and only fall back to the server on a miss.

use serde_json::Value;
use starmap_api::{ApiVersion, MockSession, StarmapResponse, StarmapSession, Transport};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::model::{
    Destination, FromJson, Mapping, PaginatedRawData, Policy, QueryResponse,
    QueryResponseContainer, Workflow,
};
use crate::params::{QueryParams, QueryResult};
use crate::provider::Provider;

/// Page size used when listing policies.
pub const POLICIES_PER_PAGE: u32 = 100;

/// Client for one StArMap server and API generation.
pub struct StarmapClient<T: Transport = StarmapSession> {
    transport: T,
    api_version: ApiVersion,
    provider: Option<Provider>,
    policies: Mutex<Vec<Policy>>,
}

impl StarmapClient<StarmapSession> {
    /// Connect to the server described by `config`.
    pub fn new(config: &ClientConfig, provider: Option<Provider>) -> Result<Self, CoreError> {
        let session = StarmapSession::new(
            config.url.as_str(),
            config.api_version,
            &config.transport_config(),
        )?;
        Self::with_transport(session, provider)
    }
}

impl StarmapClient<MockSession> {
    /// A client that answers only from `provider`; server calls behave as 404.
    pub fn offline(provider: Provider) -> Result<Self, CoreError> {
        let session = MockSession::new("offline://starmap", provider.api());
        Self::with_transport(session, Some(provider))
    }
}

impl<T: Transport> StarmapClient<T> {
    /// Wrap an existing transport; the API generation is the transport's.
    ///
    /// Fails with [`CoreError::ApiMismatch`] when `provider` holds content
    /// for another API generation.
    pub fn with_transport(transport: T, provider: Option<Provider>) -> Result<Self, CoreError> {
        let api_version = transport.api_version();
        if let Some(provider) = &provider {
            if provider.api() != api_version {
                return Err(CoreError::ApiMismatch {
                    provider: provider.api(),
                    client: api_version,
                });
            }
        }
        Ok(Self {
            transport,
            api_version,
            provider,
            policies: Mutex::new(Vec::new()),
        })
    }

    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    pub fn provider(&self) -> Option<&Provider> {
        self.provider.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Query by image NVR or archive name.
    pub async fn query_image(
        &self,
        nvr: &str,
        workflow: Option<Workflow>,
    ) -> Result<Option<QueryResult>, CoreError> {
        let mut params = QueryParams::image(nvr);
        params.workflow = workflow;
        self.query(&params).await
    }

    /// Query by image name and, optionally, version.
    pub async fn query_image_by_name(
        &self,
        name: &str,
        version: Option<&str>,
        workflow: Option<Workflow>,
    ) -> Result<Option<QueryResult>, CoreError> {
        let mut params = QueryParams::name(name);
        params.version = version.filter(|v| !v.is_empty()).map(str::to_owned);
        params.workflow = workflow;
        self.query(&params).await
    }

    /// Resolve `params` through the provider, then the server.
    pub async fn query(&self, params: &QueryParams) -> Result<Option<QueryResult>, CoreError> {
        if let Some(provider) = &self.provider {
            if let Some(hit) = provider.query(params)? {
                debug!(%params, "answered by local provider");
                return Ok(Some(hit));
            }
        }

        info!(%params, "querying StArMap");
        let resp = self.transport.get("/query", &params.to_pairs()).await?;
        if resp.is_not_found() {
            error!("Marketplace mappings not defined for {params}");
            return Ok(None);
        }
        let body = Self::body(resp)?;
        let result = match self.api_version {
            ApiVersion::V1 => QueryResult::V1(QueryResponse::from_json(&body)?),
            ApiVersion::V2 => QueryResult::V2(QueryResponseContainer::from_json(&body)?),
        };
        Ok(Some(result))
    }

    // ── Policies ─────────────────────────────────────────────────────

    /// Walk every page of `/policy`.
    pub async fn policies(&self) -> Result<Vec<Policy>, CoreError> {
        let mut policies = Vec::new();
        let mut page: u32 = 1;
        loop {
            let params = [
                ("page", page.to_string()),
                ("per_page", POLICIES_PER_PAGE.to_string()),
            ];
            let resp = self.transport.get("policy", &params).await?;
            if resp.is_not_found() {
                error!("No policies registered in StArMap.");
                break;
            }
            let data: PaginatedRawData = resp.raise_for_status()?.json()?;
            debug!(page, items = data.items.len(), "fetched policy page");
            for item in &data.items {
                policies.push(Policy::from_json(item)?);
            }
            if !data.nav.has_next() {
                break;
            }
            page += 1;
        }
        Ok(policies)
    }

    /// All policies, fetched once and kept for the client's lifetime.
    ///
    /// An empty listing is not cached, so the next call asks again.
    pub async fn list_policies(&self) -> Result<Vec<Policy>, CoreError> {
        let mut cache = self.policies.lock().await;
        if cache.is_empty() {
            *cache = self.policies().await?;
        }
        Ok(cache.clone())
    }

    pub async fn get_policy(&self, policy_id: &str) -> Result<Option<Policy>, CoreError> {
        self.fetch(&format!("/policy/{policy_id}"), "Policy", policy_id)
            .await
    }

    /// Mappings of a policy; empty when the policy does not exist.
    pub async fn list_mappings(&self, policy_id: &str) -> Result<Vec<Mapping>, CoreError> {
        Ok(self
            .get_policy(policy_id)
            .await?
            .map(Policy::into_mappings)
            .unwrap_or_default())
    }

    // ── Mappings & destinations ──────────────────────────────────────

    pub async fn get_mapping(&self, mapping_id: &str) -> Result<Option<Mapping>, CoreError> {
        self.fetch(
            &format!("/mapping/{mapping_id}"),
            "Marketplace Mapping",
            mapping_id,
        )
        .await
    }

    /// Destinations of a mapping; empty when the mapping does not exist.
    pub async fn list_destinations(&self, mapping_id: &str) -> Result<Vec<Destination>, CoreError> {
        Ok(self
            .get_mapping(mapping_id)
            .await?
            .map(Mapping::into_destinations)
            .unwrap_or_default())
    }

    pub async fn get_destination(
        &self,
        destination_id: &str,
    ) -> Result<Option<Destination>, CoreError> {
        self.fetch(
            &format!("/destination/{destination_id}"),
            "Destination",
            destination_id,
        )
        .await
    }

    // ── Helpers ──────────────────────────────────────────────────────

    async fn fetch<E: FromJson>(
        &self,
        path: &str,
        label: &str,
        id: &str,
    ) -> Result<Option<E>, CoreError> {
        let resp = self.transport.get(path, &[]).await?;
        if resp.is_not_found() {
            error!("{label} not found with ID = \"{id}\"");
            return Ok(None);
        }
        let body = Self::body(resp)?;
        Ok(Some(E::from_json(&body)?))
    }

    fn body(resp: StarmapResponse) -> Result<Value, CoreError> {
        Ok(resp.raise_for_status()?.json()?)
    }
}
