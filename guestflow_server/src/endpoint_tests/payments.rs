use actix_web::http::StatusCode;

use super::helpers::{post_webhook, response_message, sign, test_db};

fn payment_event(event_id: &str) -> String {
    format!(
        r#"{{
        "id": "{event_id}",
        "type": "payment_intent.succeeded",
        "created": 1714764000,
        "data": {{ "object": {{
            "id": "pi_{event_id}",
            "amount": 4500,
            "currency": "usd",
            "metadata": {{ "property_id": "999", "cart_items": "[]" }}
        }}}}
    }}"#
    )
}

#[actix_web::test]
async fn valid_signatures_are_accepted_and_orders_created() {
    let _ = env_logger::try_init();
    let db = test_db().await;
    let body = payment_event("evt_sig_ok");
    let (status, res) = post_webhook(&db, &body, Some(&sign(&body))).await;
    assert_eq!(status, StatusCode::OK);
    let (success, message) = response_message(&res);
    assert!(success);
    assert_eq!(message, "1 order(s) created.");
}

#[actix_web::test]
async fn tampered_bodies_are_rejected() {
    let db = test_db().await;
    let body = payment_event("evt_tampered");
    let signature = sign(&body);
    // Same signature, different bytes.
    let tampered = body.replace("4500", "450000");
    let (status, _) = post_webhook(&db, &tampered, Some(&signature)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn missing_signatures_are_rejected() {
    let db = test_db().await;
    let body = payment_event("evt_unsigned");
    let (status, _) = post_webhook(&db, &body, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn unrecognized_event_kinds_are_acknowledged() {
    let db = test_db().await;
    let body = r#"{"id": "evt_refund", "type": "charge.refunded", "data": {"object": {}}}"#;
    let (status, res) = post_webhook(&db, body, Some(&sign(body))).await;
    assert_eq!(status, StatusCode::OK);
    let (success, message) = response_message(&res);
    assert!(success);
    assert_eq!(message, "Event ignored.");
}

#[actix_web::test]
async fn redelivered_events_do_not_create_more_orders() {
    let db = test_db().await;
    let body = payment_event("evt_redelivered");
    let signature = sign(&body);
    let (status, res) = post_webhook(&db, &body, Some(&signature)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, message) = response_message(&res);
    assert_eq!(message, "1 order(s) created.");

    let (status, res) = post_webhook(&db, &body, Some(&signature)).await;
    assert_eq!(status, StatusCode::OK);
    let (success, message) = response_message(&res);
    assert!(success);
    assert_eq!(message, "Event already processed.");
}

#[actix_web::test]
async fn malformed_envelopes_are_bad_requests() {
    let db = test_db().await;
    // A valid signature over bytes that do not parse as an event envelope.
    let body = r#"{"id": "evt_partial""#;
    let (status, _) = post_webhook(&db, body, Some(&sign(body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unattributable_payments_are_acknowledged_as_failures() {
    let db = test_db().await;
    let body = r#"{
        "id": "evt_no_property",
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": "pi_x", "amount": 100, "metadata": {} } }
    }"#;
    let (status, res) = post_webhook(&db, body, Some(&sign(body))).await;
    // Acknowledged so the provider does not redeliver a payload that will never become processable.
    assert_eq!(status, StatusCode::OK);
    let (success, _) = response_message(&res);
    assert!(!success);
}

#[actix_web::test]
async fn account_events_without_a_linked_user_are_acknowledged() {
    let db = test_db().await;
    let body = r#"{
        "id": "evt_deauth",
        "type": "account.application.deauthorized",
        "data": { "object": { "id": "acct_unknown" } }
    }"#;
    let (status, res) = post_webhook(&db, body, Some(&sign(body))).await;
    assert_eq!(status, StatusCode::OK);
    let (success, message) = response_message(&res);
    assert!(success);
    assert_eq!(message, "No linked user for this account.");
}
