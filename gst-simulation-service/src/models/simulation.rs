//! Simulation record persisted per learner submission.

use super::{ComputedLineItem, InvoiceTotals, Party};
use crate::gst::AssembledInvoice;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Learner progress through a simulation. Independent of the tax data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningProgress {
    #[serde(default)]
    pub current_step: u32,
    #[serde(default)]
    pub completed_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learner_id: Option<String>,
    /// Minted once at creation; never rewritten.
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub supplier: Party,
    pub recipient: Party,
    pub interstate: bool,
    pub items: Vec<ComputedLineItem>,
    pub totals: InvoiceTotals,
    #[serde(default)]
    pub progress: LearningProgress,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl SimulationRecord {
    pub fn new(
        title: String,
        learner_id: Option<String>,
        invoice_number: String,
        invoice_date: NaiveDate,
        supplier: Party,
        recipient: Party,
        assembled: AssembledInvoice,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            learner_id,
            invoice_number,
            invoice_date,
            supplier,
            recipient,
            interstate: assembled.interstate,
            items: assembled.items,
            totals: assembled.totals,
            progress: LearningProgress::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the parties and/or items and recompute every tax figure.
    pub fn apply_assembly(&mut self, supplier: Party, recipient: Party, assembled: AssembledInvoice) {
        self.supplier = supplier;
        self.recipient = recipient;
        self.interstate = assembled.interstate;
        self.items = assembled.items;
        self.totals = assembled.totals;
    }
}
