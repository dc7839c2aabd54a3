//! Domain models for gst-simulation-service.

mod line_item;
mod party;
mod simulation;

pub use line_item::{ComputedLineItem, InvoiceTotals, LineItem, TaxBreakdown};
pub use party::{Address, Party};
pub use simulation::{LearningProgress, SimulationRecord};
