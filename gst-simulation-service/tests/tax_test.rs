mod common;

use axum::http::StatusCode;
use common::{dec_at, item, party, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn calculate_halves_combined_rate_for_intrastate() {
    let app = TestApp::spawn();

    let response = app
        .post(
            "/gst/calculate",
            json!({ "taxableAmount": "1000", "taxRate": "18", "isInterstate": false }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(dec_at(&response.body["cgstAmount"]), dec!(90));
    assert_eq!(dec_at(&response.body["sgstAmount"]), dec!(90));
    assert_eq!(dec_at(&response.body["igstAmount"]), dec!(0));
    assert_eq!(dec_at(&response.body["totalTax"]), dec!(180));
    assert_eq!(dec_at(&response.body["totalAmount"]), dec!(1180));
}

#[tokio::test]
async fn calculate_applies_full_rate_as_igst_for_interstate() {
    let app = TestApp::spawn();

    let response = app
        .post(
            "/gst/calculate",
            json!({ "taxableAmount": 1000, "taxRate": 18, "isInterstate": true }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(dec_at(&response.body["igstAmount"]), dec!(180));
    assert_eq!(dec_at(&response.body["cgstAmount"]), dec!(0));
    assert_eq!(dec_at(&response.body["totalAmount"]), dec!(1180));
}

#[tokio::test]
async fn calculate_rejects_negative_amount() {
    let app = TestApp::spawn();

    let response = app
        .post(
            "/gst/calculate",
            json!({ "taxableAmount": "-1", "taxRate": "18" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn validate_gstin_reports_format() {
    let app = TestApp::spawn();

    let valid = app
        .post("/gst/validate-gstin", json!({ "gstin": "27AAPFU0939F1ZV" }))
        .await;
    assert_eq!(valid.status, StatusCode::OK);
    assert_eq!(valid.body["valid"], true);

    let invalid = app
        .post("/gst/validate-gstin", json!({ "gstin": "27AAPFU0939F1Z" }))
        .await;
    assert_eq!(invalid.status, StatusCode::OK);
    assert_eq!(invalid.body["valid"], false);

    let absent = app.post("/gst/validate-gstin", json!({})).await;
    assert_eq!(absent.body["valid"], true);
}

#[tokio::test]
async fn next_invoice_number_is_a_preview() {
    let app = TestApp::spawn();
    let expected = format!("{}0001", app.today_prefix());

    let first = app.get("/gst/invoice-number/next").await;
    let second = app.get("/gst/invoice-number/next").await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["invoiceNumber"], expected);
    assert_eq!(first.body["reserved"], false);
    assert_eq!(second.body["invoiceNumber"], expected);
}

#[tokio::test]
async fn invoice_preview_assembles_without_persisting() {
    let app = TestApp::spawn();

    let response = app
        .post(
            "/gst/invoices/preview",
            json!({
                "supplier": party("Delhi Supplier", "Delhi", None),
                "recipient": party("Kerala Buyer", "Kerala", None),
                "items": [item("2", "100", "9", "9", "18"), item("1", "50", "0", "0", "5")]
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["interstate"], true);
    assert_eq!(dec_at(&response.body["totals"]["taxableAmount"]), dec!(250));
    assert_eq!(dec_at(&response.body["totals"]["igstAmount"]), dec!(38.5));
    assert_eq!(dec_at(&response.body["totals"]["grandTotal"]), dec!(288.5));

    let list = app.get("/gst/simulations").await;
    assert_eq!(list.body["total"], 0);
}

#[tokio::test]
async fn invoice_preview_rejects_bad_gstin() {
    let app = TestApp::spawn();

    let response = app
        .post(
            "/gst/invoices/preview",
            json!({
                "supplier": party("A", "Goa", Some("BAD")),
                "recipient": party("B", "Goa", None),
                "items": []
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn calculate_reports_out_of_range_amount() {
    let app = TestApp::spawn();

    let response = app
        .post(
            "/gst/calculate",
            json!({
                "taxableAmount": "10000000000000000000000000000",
                "taxRate": "18",
                "isInterstate": true
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let message = response.body["error"].as_str().unwrap_or_default();
    assert!(message.contains("out of range"), "unexpected error: {}", message);
}

#[tokio::test]
async fn next_invoice_number_does_not_reuse_deleted_numbers() {
    let app = TestApp::spawn();
    let prefix = app.today_prefix();
    let created = app
        .post(
            "/gst/simulations",
            json!({
                "title": "Short lived",
                "supplier": party("A", "Goa", None),
                "recipient": party("B", "Goa", None),
                "items": []
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["id"].as_str().unwrap();

    app.delete(&format!("/gst/simulations/{}", id)).await;

    let next = app.get("/gst/invoice-number/next").await;
    assert_eq!(next.body["invoiceNumber"], format!("{}0002", prefix));
}
