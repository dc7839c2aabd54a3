//! Persistence seam for simulation records.
//!
//! [`MongoDb`](super::MongoDb) is the production store; [`InMemoryStore`]
//! backs tests and local runs without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use service_core::error::AppError;
use thiserror::Error;

use crate::gst::{parse_sequence, sequence_after};
use crate::models::{LearningProgress, SimulationRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The unique invoice-number constraint rejected an insert.
    #[error("Invoice number {0} already exists")]
    DuplicateInvoiceNumber(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Database(anyhow::Error::new(err))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateInvoiceNumber(_) => AppError::Conflict(anyhow::Error::new(err)),
            StoreError::Database(e) => AppError::DatabaseError(e),
        }
    }
}

/// Listing criteria. Results are ordered newest first.
#[derive(Debug, Clone, Default)]
pub struct SimulationFilter {
    pub learner_id: Option<String>,
    pub skip: u64,
    pub limit: i64,
}

#[async_trait]
pub trait SimulationStore: Send + Sync {
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Insert a new record. Fails with [`StoreError::DuplicateInvoiceNumber`]
    /// when another record already holds the same invoice number.
    async fn insert_simulation(&self, record: &SimulationRecord) -> Result<(), StoreError>;

    async fn get_simulation(&self, id: &str) -> Result<Option<SimulationRecord>, StoreError>;

    /// Page of records plus the total number matching the filter.
    async fn list_simulations(
        &self,
        filter: &SimulationFilter,
    ) -> Result<(Vec<SimulationRecord>, u64), StoreError>;

    /// Overwrite an existing record. Returns `false` if it no longer exists.
    async fn replace_simulation(&self, record: &SimulationRecord) -> Result<bool, StoreError>;

    /// Set only the progress sub-document, leaving tax data untouched.
    async fn update_progress(
        &self,
        id: &str,
        progress: &LearningProgress,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<SimulationRecord>, StoreError>;

    async fn delete_simulation(&self, id: &str) -> Result<bool, StoreError>;

    /// Highest invoice number stored under `prefix`, by string order.
    async fn latest_invoice_number(&self, prefix: &str) -> Result<Option<String>, StoreError>;

    /// Atomically advance the counter for `prefix` and return the new value.
    ///
    /// The counter never falls behind numbers already persisted under the
    /// prefix, so the first allocation of a day continues after any stored
    /// invoice rather than reissuing it.
    async fn next_invoice_sequence(&self, prefix: &str) -> Result<u32, StoreError>;

    /// Last value handed out by the counter for `prefix`, or 0 if none was.
    /// Does not advance the counter.
    async fn current_invoice_sequence(&self, prefix: &str) -> Result<u32, StoreError>;
}

/// Process-local store. Counter updates and invoice number reservations hold
/// a `DashMap` entry lock, which makes both atomic within one process.
#[derive(Default)]
pub struct InMemoryStore {
    simulations: DashMap<String, SimulationRecord>,
    /// Unique index: invoice number to simulation id.
    invoice_numbers: DashMap<String, String>,
    counters: DashMap<String, u32>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn latest_with_prefix(&self, prefix: &str) -> Option<String> {
        self.invoice_numbers
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|number| number.starts_with(prefix))
            .max()
    }
}

#[async_trait]
impl SimulationStore for InMemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_simulation(&self, record: &SimulationRecord) -> Result<(), StoreError> {
        match self.invoice_numbers.entry(record.invoice_number.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateInvoiceNumber(
                record.invoice_number.clone(),
            )),
            Entry::Vacant(slot) => {
                self.simulations.insert(record.id.clone(), record.clone());
                slot.insert(record.id.clone());
                Ok(())
            }
        }
    }

    async fn get_simulation(&self, id: &str) -> Result<Option<SimulationRecord>, StoreError> {
        Ok(self.simulations.get(id).map(|entry| entry.value().clone()))
    }

    async fn list_simulations(
        &self,
        filter: &SimulationFilter,
    ) -> Result<(Vec<SimulationRecord>, u64), StoreError> {
        let mut matching: Vec<SimulationRecord> = self
            .simulations
            .iter()
            .filter(|entry| match &filter.learner_id {
                Some(learner) => entry.value().learner_id.as_deref() == Some(learner.as_str()),
                None => true,
            })
            .map(|entry| entry.value().clone())
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as u64;

        let page = matching
            .into_iter()
            .skip(filter.skip as usize)
            .take(filter.limit.max(0) as usize)
            .collect();

        Ok((page, total))
    }

    async fn replace_simulation(&self, record: &SimulationRecord) -> Result<bool, StoreError> {
        match self.simulations.get_mut(&record.id) {
            Some(mut entry) => {
                *entry = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_progress(
        &self,
        id: &str,
        progress: &LearningProgress,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<SimulationRecord>, StoreError> {
        Ok(self.simulations.get_mut(id).map(|mut entry| {
            entry.progress = progress.clone();
            entry.updated_at = updated_at;
            entry.value().clone()
        }))
    }

    async fn delete_simulation(&self, id: &str) -> Result<bool, StoreError> {
        match self.simulations.remove(id) {
            Some((_, record)) => {
                self.invoice_numbers.remove(&record.invoice_number);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn latest_invoice_number(&self, prefix: &str) -> Result<Option<String>, StoreError> {
        Ok(self.latest_with_prefix(prefix))
    }

    async fn next_invoice_sequence(&self, prefix: &str) -> Result<u32, StoreError> {
        let persisted = self
            .latest_with_prefix(prefix)
            .as_deref()
            .and_then(parse_sequence)
            .unwrap_or(0);

        let mut counter = self.counters.entry(prefix.to_string()).or_insert(0);
        *counter = (*counter).max(persisted) + 1;
        Ok(*counter)
    }

    async fn current_invoice_sequence(&self, prefix: &str) -> Result<u32, StoreError> {
        Ok(self.counters.get(prefix).map(|seq| *seq).unwrap_or(0))
    }
}

/// Sequence the next allocation for `prefix` will return, absent racing
/// callers. Accounts for numbers the counter handed out but that were never
/// stored or were later deleted.
pub async fn peek_invoice_sequence(
    store: &dyn SimulationStore,
    prefix: &str,
) -> Result<u32, StoreError> {
    let latest = store.latest_invoice_number(prefix).await?;
    let counter = store.current_invoice_sequence(prefix).await?;
    Ok(sequence_after(latest.as_deref()).max(counter.saturating_add(1)))
}
