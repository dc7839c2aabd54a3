use crate::models::{LineItem, Party};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input of the combined-rate helper.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CalculateTaxRequest {
    #[validate(custom(function = "crate::utils::validation::validate_non_negative"))]
    pub taxable_amount: Decimal,
    #[validate(custom(function = "crate::utils::validation::validate_percentage"))]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub is_interstate: bool,
}

/// Compute an invoice without persisting it or consuming a number.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssembleInvoiceRequest {
    #[validate(nested)]
    pub supplier: Party,
    #[validate(nested)]
    pub recipient: Party,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ValidateGstinRequest {
    #[serde(default)]
    pub gstin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateGstinResponse {
    pub gstin: Option<String>,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceNumberPreviewResponse {
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    /// Always false: previews do not reserve the number.
    pub reserved: bool,
}
