//! Services module for gst-simulation-service.

pub mod database;
pub mod invoice_numbers;
pub mod metrics;
pub mod simulation;
pub mod store;

pub use database::MongoDb;
pub use invoice_numbers::InvoiceNumberAllocator;
pub use metrics::{get_metrics, init_metrics};
pub use simulation::SimulationService;
pub use store::{InMemoryStore, SimulationFilter, SimulationStore, StoreError};
