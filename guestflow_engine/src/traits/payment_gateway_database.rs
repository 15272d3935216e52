use thiserror::Error;

use crate::{
    db_types::{GuestContact, MaterializedBatch, Order, OrderStatusType, PaymentConfirmation},
    traits::{AccountApiError, AccountManagement, CatalogApiError, CatalogManagement},
};

/// This trait defines the highest level of behaviour for backends supporting the Guestflow payment pipeline.
///
/// This behaviour includes:
/// * Expanding verified payment confirmations into persisted orders.
/// * Guarding against duplicate webhook delivery.
/// * Explicit order status transitions and guest contact backfill.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase: Clone + CatalogManagement + AccountManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Takes a verified payment confirmation and, in a single atomic transaction:
    /// * records the provider event id, returning a `duplicate_event` batch if it was already recorded;
    /// * creates one `Confirmed` order per resolvable cart item, snapshotting the upsell's primary vendor;
    /// * skips items whose upsell cannot be found (logged, never fatal);
    /// * synthesizes exactly one minimal order from the event amount when the cart is empty.
    ///
    /// Either every resolvable order is committed, or none are.
    async fn materialize_orders(
        &self,
        confirmation: PaymentConfirmation,
    ) -> Result<MaterializedBatch, PaymentGatewayError>;

    /// Fetches an order by its internal id.
    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, PaymentGatewayError>;

    /// Fetches every order created for the given payment-provider correlation id.
    async fn fetch_orders_for_payment_intent(&self, intent_id: &str) -> Result<Vec<Order>, PaymentGatewayError>;

    /// Sets the order status. When the new status is `Fulfilled`, the fulfilment timestamp is set as well.
    /// Transition legality is enforced at the API level, not here.
    async fn update_order_status(&self, id: i64, status: OrderStatusType) -> Result<Order, PaymentGatewayError>;

    /// Backfills guest contact fields on an order. Only fields present in `contact` are written.
    async fn update_guest_contact(&self, id: i64, contact: GuestContact) -> Result<Order, PaymentGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("The requested order (internal id {0}) does not exist")]
    OrderIdNotFound(i64),
    #[error("The requested order change would result in a no-op.")]
    OrderModificationNoOp,
    #[error("The requested order change is forbidden.")]
    OrderModificationForbidden,
    #[error("{0}")]
    CatalogError(#[from] CatalogApiError),
    #[error("{0}")]
    AccountError(#[from] AccountApiError),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for PaymentGatewayError {
    fn from(e: serde_json::Error) -> Self {
        PaymentGatewayError::DatabaseError(format!("Could not serialize order details: {e}"))
    }
}
