// ── Shared model types ──

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};

/// Publishing pipeline a policy or query result belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Workflow {
    Community,
    /// Marketplace workflow.
    Stratosphere,
}

/// Navigation block of a paginated listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationMetadata {
    pub first: String,
    pub last: String,
    /// URL of the next page; `None` on the last page.
    pub next: Option<String>,
    pub page: u64,
    pub per_page: u64,
    pub previous: Option<String>,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationMetadata {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// One page of a paginated listing, items still in raw form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginatedRawData {
    pub items: Vec<Value>,
    pub nav: PaginationMetadata,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn workflow_is_a_closed_set() {
        assert_eq!("community".parse::<Workflow>().unwrap(), Workflow::Community);
        assert_eq!(Workflow::Stratosphere.as_ref(), "stratosphere");
        assert!("marketplace".parse::<Workflow>().is_err());

        let decoded: Workflow = serde_json::from_value(json!("stratosphere")).unwrap();
        assert_eq!(decoded, Workflow::Stratosphere);
        assert!(serde_json::from_value::<Workflow>(json!("foo")).is_err());
    }

    #[test]
    fn page_without_next_is_the_last() {
        let page: PaginatedRawData = serde_json::from_value(json!({
            "items": [{"id": "1"}],
            "nav": {
                "first": "/api/v1/policy?page=1",
                "last": "/api/v1/policy?page=1",
                "next": null,
                "page": 1,
                "per_page": 100,
                "previous": null,
                "total": 1,
                "total_pages": 1
            }
        }))
        .unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(!page.nav.has_next());
    }
}
