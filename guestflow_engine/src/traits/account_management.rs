use thiserror::Error;

use crate::db_types::User;

/// Maintenance of the link between local users and their payment-provider sub-accounts.
#[allow(async_fn_in_trait)]
pub trait AccountManagement: Clone {
    async fn fetch_user_by_provider_account(&self, account_id: &str) -> Result<Option<User>, AccountApiError>;

    /// Persists the derived onboarding flag for the given user.
    async fn update_onboarding_status(&self, user_id: i64, complete: bool) -> Result<(), AccountApiError>;

    /// Clears the provider account id and onboarding flag for the given user.
    async fn clear_provider_account(&self, user_id: i64) -> Result<(), AccountApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Account database error: {0}")]
    DatabaseError(String),
    #[error("The requested user {0} does not exist")]
    UserNotFound(i64),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}
