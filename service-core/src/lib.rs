//! Shared plumbing for the GST simulation service: configuration loading,
//! the HTTP error type, request middleware and tracing setup.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;

pub use axum;
pub use mongodb;
pub use validator;
