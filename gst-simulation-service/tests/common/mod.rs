//! Shared harness for router-level integration tests.
//!
//! Every test gets its own in-memory store and drives the full router,
//! middleware included, through `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use gst_simulation_service::config::{
    InvoiceConfig, MongoConfig, SimulationConfig, StoreBackend, StoreConfig,
};
use gst_simulation_service::services::{init_metrics, InMemoryStore};
use gst_simulation_service::startup::build_state;
use gst_simulation_service::{build_router, AppState};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub fn test_config() -> SimulationConfig {
    SimulationConfig {
        common: CoreConfig::default(),
        mongodb: MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "gst_simulation_test".to_string(),
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
        },
        invoice: InvoiceConfig {
            utc_offset_minutes: 330,
        },
    }
}

impl TestApp {
    pub fn spawn() -> Self {
        init_metrics();
        let state = build_state(test_config(), Arc::new(InMemoryStore::new()))
            .expect("Failed to build test state");
        TestApp {
            router: build_router(state.clone()),
            state,
        }
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request("POST", uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> TestResponse {
        self.request("PATCH", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request("DELETE", uri, None).await
    }

    /// Create a simulation and return its JSON representation.
    pub async fn create_simulation(&self, body: Value) -> Value {
        let response = self.post("/gst/simulations", body).await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "create failed: {}",
            response.body
        );
        response.body
    }

    /// Today's `INV{YYYYMMDD}` prefix in the business timezone.
    pub fn today_prefix(&self) -> String {
        let today = self.state.service.allocator().today();
        format!("INV{}", today.format("%Y%m%d"))
    }
}

pub fn party(name: &str, state: &str, gstin: Option<&str>) -> Value {
    json!({
        "name": name,
        "gstin": gstin,
        "address": {
            "line1": "1 Market Road",
            "city": "Somewhere",
            "state": state,
            "pincode": "110001"
        }
    })
}

pub fn item(quantity: &str, unit_price: &str, cgst: &str, sgst: &str, igst: &str) -> Value {
    json!({
        "description": "Widget",
        "hsnCode": "8471",
        "quantity": quantity,
        "unitPrice": unit_price,
        "cgstRate": cgst,
        "sgstRate": sgst,
        "igstRate": igst
    })
}

pub fn simulation(title: &str, supplier: Value, recipient: Value, items: Vec<Value>) -> Value {
    json!({
        "title": title,
        "learnerId": "learner-1",
        "supplier": supplier,
        "recipient": recipient,
        "items": items
    })
}

/// Read a decimal serialized as a JSON string.
pub fn dec_at(value: &Value) -> Decimal {
    let raw = value
        .as_str()
        .unwrap_or_else(|| panic!("expected decimal string, got {}", value));
    Decimal::from_str(raw).expect("invalid decimal")
}
