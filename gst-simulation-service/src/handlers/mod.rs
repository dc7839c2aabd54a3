pub mod health;
pub mod metrics;
pub mod simulations;
pub mod tax;

pub use health::{health_check, readiness_check};
pub use simulations::{
    create_simulation, delete_simulation, get_simulation, list_simulations,
    update_progress, update_simulation,
};
pub use tax::{calculate, next_invoice_number, preview_invoice, validate_gstin};
