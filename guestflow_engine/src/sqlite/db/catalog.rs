use sqlx::SqliteConnection;

use crate::db_types::{GuestCheckIn, Property, Upsell, Vendor};

pub async fn fetch_upsell(id: i64, conn: &mut SqliteConnection) -> Result<Option<Upsell>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, property_id, primary_vendor_id, secondary_vendor_id, title, description, price, category, \
         is_active FROM upsells WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

pub async fn fetch_property(id: i64, conn: &mut SqliteConnection) -> Result<Option<Property>, sqlx::Error> {
    sqlx::query_as("SELECT id, user_id, name, currency, access_token FROM properties WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn fetch_property_by_access_token(
    token: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Property>, sqlx::Error> {
    sqlx::query_as("SELECT id, user_id, name, currency, access_token FROM properties WHERE access_token = $1")
        .bind(token)
        .fetch_optional(conn)
        .await
}

pub async fn fetch_vendor(id: i64, conn: &mut SqliteConnection) -> Result<Option<Vendor>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, name, email, whatsapp_number, phone, service_type, is_active FROM vendors WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// The most recent check-in wins when a token has been reused across stays.
pub async fn fetch_check_in_by_access_token(
    token: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<GuestCheckIn>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, access_token, property_id, full_name, email, phone_number, passport_url, check_in_time FROM \
         guest_check_ins WHERE access_token = $1 ORDER BY id DESC LIMIT 1",
    )
    .bind(token)
    .fetch_optional(conn)
    .await
}
