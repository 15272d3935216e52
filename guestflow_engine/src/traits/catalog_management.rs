use thiserror::Error;

use crate::db_types::{GuestCheckIn, Property, Upsell, Vendor};

/// Read-only access to the conventional data-management records the payment pipeline correlates against.
/// The CRUD surfaces for these records live outside this engine; "not found" is a distinguishable outcome here,
/// never a fatal condition.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement: Clone {
    async fn fetch_upsell(&self, id: i64) -> Result<Option<Upsell>, CatalogApiError>;

    async fn fetch_property(&self, id: i64) -> Result<Option<Property>, CatalogApiError>;

    async fn fetch_property_by_access_token(&self, token: &str) -> Result<Option<Property>, CatalogApiError>;

    async fn fetch_vendor(&self, id: i64) -> Result<Option<Vendor>, CatalogApiError>;

    /// Check-in records are keyed by the guest-facing access token; the most recent record wins.
    async fn fetch_check_in_by_access_token(&self, token: &str) -> Result<Option<GuestCheckIn>, CatalogApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Catalog database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}
