use actix_web::http::StatusCode;
use guestflow_engine::SqliteDatabase;

use super::helpers::{post_status_update, post_webhook, response_message, sign, test_db};

/// Creates a confirmed order through the webhook so the status endpoint has something to act on. The fresh
/// in-memory database guarantees the new order gets id 1.
async fn create_order(db: &SqliteDatabase) {
    let body = r#"{
        "id": "evt_order_seed",
        "type": "payment_intent.succeeded",
        "data": { "object": {
            "id": "pi_order_seed",
            "amount": 7500,
            "currency": "eur",
            "metadata": { "property_id": "1", "cart_items": "[]" }
        }}
    }"#;
    let (status, _) = post_webhook(db, body, Some(&sign(body))).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn confirmed_orders_can_be_fulfilled() {
    let db = test_db().await;
    create_order(&db).await;
    let (status, res) = post_status_update(&db, 1, "Fulfilled").await;
    assert_eq!(status, StatusCode::OK);
    let (success, message) = response_message(&res);
    assert!(success);
    assert_eq!(message, "Order #1 is now Fulfilled.");
}

#[actix_web::test]
async fn repeated_and_illegal_transitions_are_forbidden() {
    let db = test_db().await;
    create_order(&db).await;
    let (status, _) = post_status_update(&db, 1, "Fulfilled").await;
    assert_eq!(status, StatusCode::OK);

    // Fulfilled is terminal; neither a repeat nor a walk back to Pending is allowed.
    let (status, _) = post_status_update(&db, 1, "Fulfilled").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = post_status_update(&db, 1, "Pending").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn unknown_orders_are_not_found() {
    let db = test_db().await;
    let (status, _) = post_status_update(&db, 999, "Cancelled").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
