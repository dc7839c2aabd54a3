pub mod config;
pub mod dtos;
pub mod gst;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use axum::{
    middleware::from_fn,
    routing::{get, patch, post},
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::SimulationConfig;
use crate::services::SimulationService;

#[derive(Clone)]
pub struct AppState {
    pub config: SimulationConfig,
    pub service: SimulationService,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route(
            "/gst/simulations",
            post(handlers::create_simulation).get(handlers::list_simulations),
        )
        .route(
            "/gst/simulations/:id",
            get(handlers::get_simulation)
                .patch(handlers::update_simulation)
                .delete(handlers::delete_simulation),
        )
        .route(
            "/gst/simulations/:id/progress",
            patch(handlers::update_progress),
        )
        .route("/gst/calculate", post(handlers::calculate))
        .route("/gst/validate-gstin", post(handlers::validate_gstin))
        .route(
            "/gst/invoice-number/next",
            get(handlers::next_invoice_number),
        )
        .route("/gst/invoices/preview", post(handlers::preview_invoice))
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
