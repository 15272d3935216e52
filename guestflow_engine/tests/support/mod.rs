//! Shared fixtures for the engine integration tests. Everything runs against a fresh in-memory SQLite database,
//! so each test seeds exactly the catalog rows it needs.
#![allow(dead_code)]
use chrono::Utc;
use gf_common::MoneyAmount;
use guestflow_engine::{
    db_types::{CartItem, PaymentConfirmation},
    SqliteDatabase,
};

pub async fn new_test_db() -> SqliteDatabase {
    let _ = env_logger::try_init();
    // In-memory SQLite needs a single connection, or each pool checkout sees a different (empty) database.
    SqliteDatabase::new_with_url("sqlite::memory:", 1).await.expect("Error creating in-memory database")
}

pub async fn seed_user(db: &SqliteDatabase, name: &str, email: &str, provider_account_id: Option<&str>) -> i64 {
    sqlx::query("INSERT INTO users (name, email, provider_account_id) VALUES ($1, $2, $3)")
        .bind(name)
        .bind(email)
        .bind(provider_account_id)
        .execute(db.pool())
        .await
        .expect("Error seeding user")
        .last_insert_rowid()
}

pub async fn seed_property(db: &SqliteDatabase, user_id: i64, name: &str, currency: Option<&str>) -> i64 {
    sqlx::query("INSERT INTO properties (user_id, name, currency) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(name)
        .bind(currency)
        .execute(db.pool())
        .await
        .expect("Error seeding property")
        .last_insert_rowid()
}

pub async fn seed_vendor(db: &SqliteDatabase, name: &str, email: Option<&str>, whatsapp: Option<&str>) -> i64 {
    sqlx::query("INSERT INTO vendors (name, email, whatsapp_number) VALUES ($1, $2, $3)")
        .bind(name)
        .bind(email)
        .bind(whatsapp)
        .execute(db.pool())
        .await
        .expect("Error seeding vendor")
        .last_insert_rowid()
}

pub async fn seed_upsell(db: &SqliteDatabase, property_id: i64, vendor_id: Option<i64>, title: &str, price: i64) -> i64 {
    sqlx::query("INSERT INTO upsells (property_id, primary_vendor_id, title, price) VALUES ($1, $2, $3, $4)")
        .bind(property_id)
        .bind(vendor_id)
        .bind(title)
        .bind(price)
        .execute(db.pool())
        .await
        .expect("Error seeding upsell")
        .last_insert_rowid()
}

pub async fn seed_check_in(
    db: &SqliteDatabase,
    token: &str,
    property_id: i64,
    full_name: &str,
    email: Option<&str>,
    phone: Option<&str>,
) -> i64 {
    sqlx::query("INSERT INTO guest_check_ins (access_token, property_id, full_name, email, phone_number) VALUES ($1, $2, $3, $4, $5)")
        .bind(token)
        .bind(property_id)
        .bind(full_name)
        .bind(email)
        .bind(phone)
        .execute(db.pool())
        .await
        .expect("Error seeding check-in")
        .last_insert_rowid()
}

pub fn cart_item(upsell_id: i64, title: &str, guest_count: u32, total_price: i64) -> CartItem {
    CartItem {
        upsell_id,
        upsell_title: Some(title.to_string()),
        guest_count,
        unit_price: Some(MoneyAmount::from(total_price / i64::from(guest_count.max(1)))),
        total_price: MoneyAmount::from(total_price),
        selected_date: None,
        menu_options: None,
        special_notes: None,
    }
}

pub fn confirmation(
    event_id: &str,
    intent_id: &str,
    property_id: i64,
    amount: i64,
    items: Vec<CartItem>,
) -> PaymentConfirmation {
    PaymentConfirmation {
        event_id: event_id.to_string(),
        payment_intent_id: intent_id.to_string(),
        property_id,
        amount: MoneyAmount::from(amount),
        currency: None,
        access_token: None,
        cart_items: items,
        occurred_at: Utc::now(),
    }
}
