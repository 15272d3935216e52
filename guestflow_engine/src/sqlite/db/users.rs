use sqlx::SqliteConnection;

use crate::{db_types::User, traits::AccountApiError};

pub async fn fetch_user_by_provider_account(
    account_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, name, email, provider_account_id, onboarding_completed FROM users WHERE provider_account_id = $1",
    )
    .bind(account_id)
    .fetch_optional(conn)
    .await
}

pub async fn update_onboarding_status(
    user_id: i64,
    complete: bool,
    conn: &mut SqliteConnection,
) -> Result<(), AccountApiError> {
    let result =
        sqlx::query("UPDATE users SET onboarding_completed = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
            .bind(complete)
            .bind(user_id)
            .execute(conn)
            .await?;
    if result.rows_affected() == 0 {
        return Err(AccountApiError::UserNotFound(user_id));
    }
    Ok(())
}

pub async fn clear_provider_account(user_id: i64, conn: &mut SqliteConnection) -> Result<(), AccountApiError> {
    let result = sqlx::query(
        "UPDATE users SET provider_account_id = NULL, onboarding_completed = 0, updated_at = CURRENT_TIMESTAMP \
         WHERE id = $1",
    )
    .bind(user_id)
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(AccountApiError::UserNotFound(user_id));
    }
    Ok(())
}
