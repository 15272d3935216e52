use log::trace;
use sqlx::SqliteConnection;

/// Records the provider event id, returning `false` if it was already recorded. Run this inside the materializer
/// transaction so that the guard row and the orders it protects commit (or roll back) together.
pub async fn try_record_event(
    provider_event_id: &str,
    event_kind: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("INSERT OR IGNORE INTO webhook_events (provider_event_id, event_kind) VALUES ($1, $2)")
        .bind(provider_event_id)
        .bind(event_kind)
        .execute(conn)
        .await?;
    let inserted = result.rows_affected() > 0;
    trace!("📝️ Webhook event {provider_event_id} recorded: {inserted}");
    Ok(inserted)
}
