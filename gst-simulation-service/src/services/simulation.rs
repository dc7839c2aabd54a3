//! Simulation lifecycle: create, read, list, patch, delete, progress.

use chrono::Utc;
use service_core::error::AppError;
use std::sync::Arc;
use tracing::instrument;

use super::invoice_numbers::InvoiceNumberAllocator;
use super::metrics::{
    record_gstin_rejected, record_invoice_number_conflict, record_simulation_created,
    record_simulation_deleted,
};
use super::store::{SimulationFilter, SimulationStore, StoreError};
use crate::dtos::{CreateSimulationRequest, UpdateSimulationRequest};
use crate::gst::{assemble, validate_party_gstin, GstError, PartyRole};
use crate::models::{LearningProgress, LineItem, Party, SimulationRecord};

/// Attempts at minting and inserting before a duplicate number is reported.
const MAX_INSERT_ATTEMPTS: usize = 2;

#[derive(Clone)]
pub struct SimulationService {
    store: Arc<dyn SimulationStore>,
    allocator: InvoiceNumberAllocator,
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Simulation {} not found", id))
}

fn check_gstins(supplier: &Party, recipient: &Party) -> Result<(), GstError> {
    validate_party_gstin(PartyRole::Supplier, supplier).map_err(|e| {
        record_gstin_rejected("supplier");
        e
    })?;
    validate_party_gstin(PartyRole::Recipient, recipient).map_err(|e| {
        record_gstin_rejected("recipient");
        e
    })?;
    Ok(())
}

impl SimulationService {
    pub fn new(store: Arc<dyn SimulationStore>, allocator: InvoiceNumberAllocator) -> Self {
        Self { store, allocator }
    }

    pub fn allocator(&self) -> &InvoiceNumberAllocator {
        &self.allocator
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.store.health_check().await
    }

    /// Validate, number, compute and store a new simulation.
    ///
    /// A duplicate invoice number on insert triggers exactly one fresh
    /// allocation before the conflict is surfaced.
    #[instrument(skip(self, req), fields(title = %req.title))]
    pub async fn create(&self, req: CreateSimulationRequest) -> Result<SimulationRecord, AppError> {
        check_gstins(&req.supplier, &req.recipient)?;

        let assembled = assemble(&req.supplier, &req.recipient, &req.items)?;
        let today = self.allocator.today();
        let invoice_number = self.allocator.next_invoice_number(today).await?;

        let mut record = SimulationRecord::new(
            req.title,
            req.learner_id,
            invoice_number,
            today,
            req.supplier,
            req.recipient,
            assembled,
        );

        let mut attempt = 1;
        loop {
            match self.store.insert_simulation(&record).await {
                Ok(()) => break,
                Err(StoreError::DuplicateInvoiceNumber(number))
                    if attempt < MAX_INSERT_ATTEMPTS =>
                {
                    record_invoice_number_conflict();
                    tracing::warn!(
                        invoice_number = %number,
                        "Invoice number collision, allocating a new one"
                    );
                    record.invoice_number = self.allocator.next_invoice_number(today).await?;
                    attempt += 1;
                }
                Err(e) => {
                    if matches!(e, StoreError::DuplicateInvoiceNumber(_)) {
                        record_invoice_number_conflict();
                    }
                    return Err(e.into());
                }
            }
        }

        record_simulation_created(record.interstate);
        tracing::info!(
            simulation_id = %record.id,
            invoice_number = %record.invoice_number,
            interstate = record.interstate,
            grand_total = %record.totals.grand_total,
            "Simulation created"
        );

        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<SimulationRecord, AppError> {
        self.store
            .get_simulation(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn list(
        &self,
        filter: &SimulationFilter,
    ) -> Result<(Vec<SimulationRecord>, u64), AppError> {
        Ok(self.store.list_simulations(filter).await?)
    }

    /// Apply a partial update. Taxes are recomputed whenever the parties or
    /// the items change; the invoice number never changes.
    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        id: &str,
        patch: UpdateSimulationRequest,
    ) -> Result<SimulationRecord, AppError> {
        let mut record = self.get(id).await?;

        if let Some(number) = &patch.invoice_number {
            if *number != record.invoice_number {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Invoice number {} is immutable",
                    record.invoice_number
                )));
            }
        }

        if patch.touches_tax_inputs() {
            let supplier = patch.supplier.unwrap_or_else(|| record.supplier.clone());
            let recipient = patch.recipient.unwrap_or_else(|| record.recipient.clone());
            let items: Vec<LineItem> = match patch.items {
                Some(items) => items,
                None => record.items.iter().map(|line| line.item.clone()).collect(),
            };

            check_gstins(&supplier, &recipient)?;
            let assembled = assemble(&supplier, &recipient, &items)?;
            record.apply_assembly(supplier, recipient, assembled);
        }

        if let Some(title) = patch.title {
            record.title = title;
        }
        if let Some(learner_id) = patch.learner_id {
            record.learner_id = Some(learner_id);
        }
        if let Some(progress) = patch.progress {
            record.progress = progress;
        }
        record.updated_at = Utc::now();

        if !self.store.replace_simulation(&record).await? {
            return Err(not_found(id));
        }

        tracing::info!(
            simulation_id = %record.id,
            interstate = record.interstate,
            "Simulation updated"
        );
        Ok(record)
    }

    #[instrument(skip(self, progress))]
    pub async fn update_progress(
        &self,
        id: &str,
        progress: LearningProgress,
    ) -> Result<SimulationRecord, AppError> {
        let record = self
            .store
            .update_progress(id, &progress, Utc::now())
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(
            simulation_id = %id,
            current_step = progress.current_step,
            completed = progress.completed,
            "Simulation progress updated"
        );
        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if !self.store.delete_simulation(id).await? {
            return Err(not_found(id));
        }
        record_simulation_deleted();
        tracing::info!(simulation_id = %id, "Simulation deleted");
        Ok(())
    }
}
