//! Line item and tax breakdown models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A line item as submitted by the learner.
///
/// `cgst_rate` and `sgst_rate` already hold the per-head (half) rates; they
/// are applied as-is for intrastate supplies. `igst_rate` is the full rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsn_code: Option<String>,
    #[validate(custom(function = "crate::utils::validation::validate_positive"))]
    pub quantity: Decimal,
    #[validate(custom(function = "crate::utils::validation::validate_non_negative"))]
    pub unit_price: Decimal,
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validation::validate_percentage"))]
    pub cgst_rate: Decimal,
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validation::validate_percentage"))]
    pub sgst_rate: Decimal,
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validation::validate_percentage"))]
    pub igst_rate: Decimal,
    /// Absent cess is treated as 0%.
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validation::validate_percentage"))]
    pub cess_rate: Decimal,
}

/// Per-item computed amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    pub taxable_amount: Decimal,
    pub igst_amount: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub cess_amount: Decimal,
    pub total_amount: Decimal,
}

/// A submitted line item enriched with its tax breakdown.
///
/// Serializes flat: the original fields and the computed amounts sit side by
/// side in one JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedLineItem {
    #[serde(flatten)]
    pub item: LineItem,
    #[serde(flatten)]
    pub tax: TaxBreakdown,
}

/// Column sums over every computed line item of an invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub taxable_amount: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub igst_amount: Decimal,
    pub cess_amount: Decimal,
    pub total_tax: Decimal,
    pub grand_total: Decimal,
}
