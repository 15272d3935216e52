use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::Data, App};
use gf_common::Secret;
use guestflow_engine::{AccountApi, GuestApi, OrderFlowApi, SqliteDatabase};
use serde_json::Value;

use super::mocks::{MockEmail, MockMessaging};
use crate::{
    config::ServerConfig,
    notifications::NotificationDispatcher,
    payment_events::SIGNATURE_HEADER,
    payment_routes::PaymentWebhookRoute,
    routes::UpdateOrderStatusRoute,
};

pub const TEST_SECRET: &str = "whsec_test_secret";

/// A shared in-memory database. The single-connection pool is what keeps the `:memory:` database alive across the
/// per-request app instances.
pub async fn test_db() -> SqliteDatabase {
    SqliteDatabase::new_with_url("sqlite::memory:", 1).await.expect("Error creating in-memory database")
}

fn test_config() -> ServerConfig {
    ServerConfig { webhook_secret: Secret::new(TEST_SECRET.to_string()), ..ServerConfig::default() }
}

pub fn sign(body: &str) -> String {
    crate::helpers::calculate_signature(TEST_SECRET, body.as_bytes())
}

/// Posts a webhook payload and returns the response status and body. The notification channels are mocks with no
/// expectations, which doubles as an assertion that no delivery is attempted for these payloads.
pub async fn post_webhook(db: &SqliteDatabase, body: &str, signature: Option<&str>) -> (StatusCode, String) {
    let mut req = TestRequest::post().uri("/webhook/payments").set_payload(body.to_string());
    if let Some(signature) = signature {
        req = req.insert_header((SIGNATURE_HEADER, signature));
    }
    make_request(db, req).await
}

pub async fn post_status_update(db: &SqliteDatabase, order_id: i64, status: &str) -> (StatusCode, String) {
    let req = TestRequest::post()
        .uri(&format!("/api/orders/{order_id}/status"))
        .set_json(serde_json::json!({"status": status}));
    make_request(db, req).await
}

async fn make_request(db: &SqliteDatabase, req: TestRequest) -> (StatusCode, String) {
    let app = App::new()
        .app_data(Data::new(test_config()))
        .app_data(Data::new(OrderFlowApi::new(db.clone())))
        .app_data(Data::new(AccountApi::new(db.clone())))
        .app_data(Data::new(GuestApi::new(db.clone())))
        .app_data(Data::new(NotificationDispatcher::new(MockEmail::new(), MockMessaging::new())))
        .service(PaymentWebhookRoute::<SqliteDatabase, MockEmail, MockMessaging>::new())
        .service(UpdateOrderStatusRoute::<SqliteDatabase>::new());
    let service = test::init_service(app).await;
    let (_, res) = test::call_service(&service, req.to_request()).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

pub fn response_message(body: &str) -> (bool, String) {
    let json: Value = serde_json::from_str(body).expect("Response body is not JSON");
    let success = json["success"].as_bool().expect("Response has no success flag");
    let message = json["message"].as_str().unwrap_or_default().to_string();
    (success, message)
}
