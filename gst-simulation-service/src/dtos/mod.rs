pub mod simulation;
pub mod tax;

pub use simulation::{
    CreateSimulationRequest, SimulationListParams, SimulationListResponse, SimulationResponse,
    UpdateProgressRequest, UpdateSimulationRequest,
};
pub use tax::{
    AssembleInvoiceRequest, CalculateTaxRequest, InvoiceNumberPreviewResponse,
    ValidateGstinRequest, ValidateGstinResponse,
};
