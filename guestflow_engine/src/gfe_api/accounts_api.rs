use std::fmt::Debug;

use log::*;

use crate::{
    db_types::ProviderAccountStatus,
    traits::{AccountApiError, AccountManagement},
};

/// `AccountApi` keeps the link between local users and their payment-provider sub-accounts up to date in
/// response to provider account events.
pub struct AccountApi<B> {
    db: B,
}

impl<B> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi")
    }
}

impl<B> AccountApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    /// Applies a provider `account.updated` payload: the onboarding flag is derived from the payload and persisted
    /// against the matching user. An unknown sub-account id is logged and ignored, since the provider may deliver
    /// events for accounts created outside this system.
    pub async fn handle_account_updated(
        &self,
        status: &ProviderAccountStatus,
    ) -> Result<Option<i64>, AccountApiError> {
        let Some(user) = self.db.fetch_user_by_provider_account(&status.id).await? else {
            warn!("👤️ No user is linked to provider account {}. Ignoring the update.", status.id);
            return Ok(None);
        };
        let complete = status.onboarding_complete();
        self.db.update_onboarding_status(user.id, complete).await?;
        info!("👤️ User #{} onboarding status set to {complete} from provider account {}.", user.id, status.id);
        Ok(Some(user.id))
    }

    /// Applies a provider deauthorization event: the sub-account link and onboarding flag are cleared for the
    /// matching user. An unknown sub-account id is logged and ignored.
    pub async fn handle_account_deauthorized(&self, account_id: &str) -> Result<Option<i64>, AccountApiError> {
        let Some(user) = self.db.fetch_user_by_provider_account(account_id).await? else {
            warn!("👤️ No user is linked to provider account {account_id}. Nothing to deauthorize.");
            return Ok(None);
        };
        self.db.clear_provider_account(user.id).await?;
        info!("👤️ Provider account {account_id} disconnected from user #{}.", user.id);
        Ok(Some(user.id))
    }
}
