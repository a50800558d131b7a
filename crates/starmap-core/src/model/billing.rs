// ── APIv2 billing-code rules ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::decode::FromJson;

/// Image type a billing-code rule applies to.
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
pub enum BillingImageType {
    Access,
    Hourly,
    Marketplace,
}

/// Billing codes to attach when an image matches `image_name` and one of
/// `image_types`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingCodeRule {
    codes: Vec<String>,
    image_name: String,
    image_types: Vec<BillingImageType>,
    name: Option<String>,
}

impl BillingCodeRule {
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    pub fn image_types(&self) -> &[BillingImageType] {
        &self.image_types
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl FromJson for BillingCodeRule {
    const ENTITY: &'static str = "BillingCodeRule";
}
