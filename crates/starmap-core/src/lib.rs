//! Domain model and client facade for the StArMap mapping service.
//!
//! StArMap resolves an image identity (name/version or full NVR) and a
//! workflow into the marketplace destinations it should be published to.
//! This crate owns:
//!
//! - **Domain model** ([`model`]): immutable, validated entities built from
//!   raw JSON through [`FromJson`]. APIv1 `Policy → Mapping → Destination`
//!   and the flat [`QueryResponse`]; APIv2 [`QueryResponseContainer`] →
//!   [`QueryResponseEntity`] → [`MappingResponseObject`] with billing-code
//!   rules, plus conversion back to the APIv1 shape.
//!
//! - **Providers** ([`provider`]): in-memory stores answering the same
//!   queries as the server, for offline or pre-seeded use.
//!
//! - **[`StarmapClient`]**: async facade over a [`starmap_api::Transport`]
//!   that consults the provider first and maps remote 404s to `None`.
//!
//! - Helpers: [`dict_merge`] for metadata merging and [`parse_nvr`] for
//!   N-V-R identifiers.

pub mod client;
pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod nvr;
pub mod params;
pub mod provider;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{POLICIES_PER_PAGE, StarmapClient};
pub use config::{ClientConfig, TlsVerification};
pub use error::CoreError;
pub use merge::{JsonMap, dict_merge, expect_object};
pub use nvr::{Nvr, get_image_name, parse_nvr};
pub use params::{QueryParams, QueryResult};
pub use provider::{ContainerMapProvider, FlatMapProvider, Provider, StarmapProvider};

pub use starmap_api::ApiVersion;

pub use model::{
    BillingCodeRule, BillingImageType, Destination, FromJson, Mapping, MappingResponseObject,
    PaginatedRawData, PaginationMetadata, Policy, QueryResponse, QueryResponseContainer,
    QueryResponseEntity, ResponseFilter, Workflow,
};
