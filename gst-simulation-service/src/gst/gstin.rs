//! Structural GSTIN validation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::GstError;
use crate::models::Party;

/// State code, PAN (5 letters, 4 digits, 1 letter), entity code, literal `Z`,
/// check character.
static GSTIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z]{1}[1-9A-Z]{1}Z[0-9A-Z]{1}$")
        .expect("GSTIN pattern is a valid regex")
});

/// Which side of the invoice a GSTIN belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyRole {
    Supplier,
    Recipient,
}

impl fmt::Display for PartyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartyRole::Supplier => f.write_str("supplier"),
            PartyRole::Recipient => f.write_str("recipient"),
        }
    }
}

/// Check a GSTIN against the 15-character structural pattern.
///
/// Absent or empty input is valid: consumer-facing supplies carry no GSTIN.
/// The check character is only constrained to `[0-9A-Z]`; its mod-36
/// checksum is not verified.
pub fn is_valid_gstin(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) if v.is_empty() => true,
        Some(v) => GSTIN_PATTERN.is_match(v),
    }
}

/// Reject a party whose GSTIN is present but malformed.
pub fn validate_party_gstin(role: PartyRole, party: &Party) -> Result<(), GstError> {
    if is_valid_gstin(party.gstin.as_deref()) {
        Ok(())
    } else {
        Err(GstError::InvalidGstin {
            role,
            value: party.gstin.clone().unwrap_or_default(),
        })
    }
}
