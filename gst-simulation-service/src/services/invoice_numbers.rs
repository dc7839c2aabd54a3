//! Date-scoped invoice number allocation.

use chrono::{FixedOffset, NaiveDate, Utc};
use service_core::error::AppError;
use std::sync::Arc;
use tracing::instrument;

use super::metrics::record_invoice_number_allocated;
use super::store::{peek_invoice_sequence, SimulationStore};
use crate::gst::{format_invoice_number, invoice_prefix, GstError, MAX_SEQUENCE};

/// Mints `INV{YYYYMMDD}{NNNN}` numbers through the store's atomic counter.
#[derive(Clone)]
pub struct InvoiceNumberAllocator {
    store: Arc<dyn SimulationStore>,
    offset: FixedOffset,
}

impl InvoiceNumberAllocator {
    /// `offset` is the business timezone that decides which day an invoice
    /// belongs to.
    pub fn new(store: Arc<dyn SimulationStore>, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }

    /// Allocate the next number for `today`. Each call consumes a sequence.
    #[instrument(skip(self))]
    pub async fn next_invoice_number(&self, today: NaiveDate) -> Result<String, AppError> {
        let prefix = invoice_prefix(today);
        let sequence = self.store.next_invoice_sequence(&prefix).await?;

        if sequence > MAX_SEQUENCE {
            tracing::error!(prefix = %prefix, sequence, "Daily invoice sequence exhausted");
            return Err(GstError::SequenceExhausted {
                prefix,
                max: MAX_SEQUENCE,
            }
            .into());
        }

        let invoice_number = format_invoice_number(&prefix, sequence);
        record_invoice_number_allocated();
        tracing::info!(invoice_number = %invoice_number, "Invoice number allocated");
        Ok(invoice_number)
    }

    /// The number the next allocation would most likely return, without
    /// reserving it.
    pub async fn preview(&self, today: NaiveDate) -> Result<String, AppError> {
        let prefix = invoice_prefix(today);
        let sequence = peek_invoice_sequence(self.store.as_ref(), &prefix).await?;
        if sequence > MAX_SEQUENCE {
            return Err(GstError::SequenceExhausted {
                prefix,
                max: MAX_SEQUENCE,
            }
            .into());
        }
        Ok(format_invoice_number(&prefix, sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryStore;
    use axum::http::StatusCode;

    fn allocator() -> InvoiceNumberAllocator {
        let offset = FixedOffset::east_opt(330 * 60).unwrap();
        InvoiceNumberAllocator::new(Arc::new(InMemoryStore::new()), offset)
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test]
    async fn first_number_of_the_day() {
        let allocator = allocator();
        assert_eq!(
            allocator.next_invoice_number(day()).await.unwrap(),
            "INV202610190001"
        );
        assert_eq!(
            allocator.next_invoice_number(day()).await.unwrap(),
            "INV202610190002"
        );
    }

    #[tokio::test]
    async fn preview_does_not_consume() {
        let allocator = allocator();
        assert_eq!(allocator.preview(day()).await.unwrap(), "INV202610190001");
        assert_eq!(allocator.preview(day()).await.unwrap(), "INV202610190001");
    }

    #[tokio::test]
    async fn preview_tracks_numbers_allocated_but_not_stored() {
        let allocator = allocator();
        allocator.next_invoice_number(day()).await.unwrap();

        assert_eq!(allocator.preview(day()).await.unwrap(), "INV202610190002");
        assert_eq!(
            allocator.next_invoice_number(day()).await.unwrap(),
            "INV202610190002"
        );
    }

    #[tokio::test]
    async fn sequence_beyond_four_digits_is_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let prefix = invoice_prefix(day());
        for _ in 0..MAX_SEQUENCE {
            store.next_invoice_sequence(&prefix).await.unwrap();
        }

        let allocator =
            InvoiceNumberAllocator::new(store, FixedOffset::east_opt(0).unwrap());
        let err = allocator
            .next_invoice_number(day())
            .await
            .expect_err("10000th invoice must not be minted");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
