//! Supplier / recipient models.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Compared verbatim to decide the jurisdiction of a supply.
    #[validate(length(min = 1, message = "state is required"))]
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
}

/// A party to the simulated invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Optional for consumer-facing (B2C) supplies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gstin: Option<String>,
    #[validate(nested)]
    pub address: Address,
}

impl Party {
    pub fn state(&self) -> &str {
        &self.address.state
    }
}
