use service_core::error::AppError;
use thiserror::Error;

use super::PartyRole;

/// Domain failures raised by the GST core.
#[derive(Debug, Error)]
pub enum GstError {
    #[error("Invalid {role} GSTIN format: {value}")]
    InvalidGstin { role: PartyRole, value: String },

    #[error("Invoice sequence exhausted for {prefix}: more than {max} invoices issued")]
    SequenceExhausted { prefix: String, max: u32 },

    /// An amount left the representable decimal range.
    #[error("Amount out of range while computing {stage}")]
    AmountOverflow { stage: &'static str },
}

impl From<GstError> for AppError {
    fn from(err: GstError) -> Self {
        match err {
            GstError::InvalidGstin { .. } => AppError::BadRequest(anyhow::Error::new(err)),
            GstError::SequenceExhausted { .. } => AppError::Conflict(anyhow::Error::new(err)),
            GstError::AmountOverflow { .. } => {
                AppError::UnprocessableEntity(anyhow::Error::new(err))
            }
        }
    }
}
