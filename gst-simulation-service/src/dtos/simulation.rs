use crate::models::{
    ComputedLineItem, InvoiceTotals, LearningProgress, LineItem, Party, SimulationRecord,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSimulationRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub learner_id: Option<String>,
    #[validate(nested)]
    pub supplier: Party,
    #[validate(nested)]
    pub recipient: Party,
    /// May be empty; the simulation then carries zero totals.
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<LineItem>,
}

/// Partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSimulationRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub learner_id: Option<String>,
    /// Accepted only when it equals the stored number.
    pub invoice_number: Option<String>,
    #[validate(nested)]
    pub supplier: Option<Party>,
    #[validate(nested)]
    pub recipient: Option<Party>,
    #[validate(nested)]
    pub items: Option<Vec<LineItem>>,
    pub progress: Option<LearningProgress>,
}

impl UpdateSimulationRequest {
    /// Whether applying this patch changes any input of the tax computation.
    pub fn touches_tax_inputs(&self) -> bool {
        self.supplier.is_some() || self.recipient.is_some() || self.items.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressRequest {
    pub current_step: u32,
    #[serde(default)]
    pub completed_steps: Vec<String>,
    #[validate(range(max = 100))]
    pub score: Option<u32>,
    #[serde(default)]
    pub completed: bool,
}

impl From<UpdateProgressRequest> for LearningProgress {
    fn from(req: UpdateProgressRequest) -> Self {
        Self {
            current_step: req.current_step,
            completed_steps: req.completed_steps,
            score: req.score,
            completed: req.completed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResponse {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learner_id: Option<String>,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub supplier: Party,
    pub recipient: Party,
    pub interstate: bool,
    pub items: Vec<ComputedLineItem>,
    pub totals: InvoiceTotals,
    pub progress: LearningProgress,
    pub created_at: String,
    pub updated_at: String,
}

impl From<SimulationRecord> for SimulationResponse {
    fn from(record: SimulationRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            learner_id: record.learner_id,
            invoice_number: record.invoice_number,
            invoice_date: record.invoice_date,
            supplier: record.supplier,
            recipient: record.recipient,
            interstate: record.interstate,
            items: record.items,
            totals: record.totals,
            progress: record.progress,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationListParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub learner_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationListResponse {
    pub simulations: Vec<SimulationResponse>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}
