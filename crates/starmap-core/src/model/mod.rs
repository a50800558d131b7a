// ── StArMap domain model ──
//
// Immutable entities built from decoded JSON through `FromJson`.
// APIv1: Policy → Mapping → Destination, with the flat `QueryResponse`.
// APIv2: QueryResponseContainer → QueryResponseEntity →
// MappingResponseObject → Destination, plus billing-code rules.

pub mod billing;
pub mod common;
pub mod container;
pub mod decode;
pub mod destination;
pub mod entity;
pub mod policy;
pub mod query;

pub use billing::{BillingCodeRule, BillingImageType};
pub use common::{PaginatedRawData, PaginationMetadata, Workflow};
pub use container::{QueryResponseContainer, ResponseFilter};
pub use decode::FromJson;
pub use destination::Destination;
pub use entity::{MappingResponseObject, QueryResponseEntity};
pub use policy::{Mapping, Policy};
pub use query::QueryResponse;
