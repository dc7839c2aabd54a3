//! Stateless calculators. Nothing here touches persistence except the
//! invoice number preview, which only reads.

use crate::dtos::{
    AssembleInvoiceRequest, CalculateTaxRequest, InvoiceNumberPreviewResponse,
    ValidateGstinRequest, ValidateGstinResponse,
};
use crate::gst::{assemble, calculate_tax, is_valid_gstin, validate_party_gstin, PartyRole};
use crate::utils::ValidatedJson;
use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use service_core::error::AppError;

pub async fn calculate(
    ValidatedJson(req): ValidatedJson<CalculateTaxRequest>,
) -> Result<impl IntoResponse, AppError> {
    let split = calculate_tax(req.taxable_amount, req.tax_rate, req.is_interstate)?;
    Ok(Json(split))
}

pub async fn validate_gstin(
    ValidatedJson(req): ValidatedJson<ValidateGstinRequest>,
) -> Result<impl IntoResponse, AppError> {
    let valid = is_valid_gstin(req.gstin.as_deref());
    let message = match (valid, req.gstin.as_deref()) {
        (true, None) | (true, Some("")) => Some("No GSTIN supplied; unregistered party".to_string()),
        (true, Some(_)) => None,
        (false, _) => Some("GSTIN does not match the 15-character format".to_string()),
    };

    Ok(Json(ValidateGstinResponse {
        gstin: req.gstin,
        valid,
        message,
    }))
}

/// Show the number the next created simulation would most likely receive.
pub async fn next_invoice_number(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let allocator = state.service.allocator();
    let today = allocator.today();
    let invoice_number = allocator.preview(today).await?;

    Ok(Json(InvoiceNumberPreviewResponse {
        invoice_number,
        invoice_date: today,
        reserved: false,
    }))
}

pub async fn preview_invoice(
    ValidatedJson(req): ValidatedJson<AssembleInvoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_party_gstin(PartyRole::Supplier, &req.supplier)?;
    validate_party_gstin(PartyRole::Recipient, &req.recipient)?;
    Ok(Json(assemble(&req.supplier, &req.recipient, &req.items)?))
}
