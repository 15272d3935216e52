use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{GuestContact, MaterializedBatch, Order, OrderStatusType, PaymentConfirmation},
    traits::{PaymentGatewayDatabase, PaymentGatewayError},
};

/// `OrderFlowApi` is the primary API for turning verified payment events into orders and for managing the
/// lifecycle of the orders it creates.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderFlowApi<B>
where B: PaymentGatewayDatabase
{
    /// Submit a verified payment confirmation to the order manager.
    ///
    /// The confirmation is expanded into persisted orders in a single atomic transaction. Re-deliveries of an
    /// event that has already been processed return an empty batch flagged as a duplicate; they are not an error.
    pub async fn process_payment_succeeded(
        &self,
        confirmation: PaymentConfirmation,
    ) -> Result<MaterializedBatch, PaymentGatewayError> {
        let event_id = confirmation.event_id.clone();
        let batch = self.db.materialize_orders(confirmation).await?;
        if batch.duplicate_event {
            info!("🔄️📦️ Event [{event_id}] was a duplicate delivery. No orders created.");
        } else {
            debug!("🔄️📦️ Event [{event_id}] processing complete. {} order(s) created.", batch.orders.len());
        }
        Ok(batch)
    }

    pub async fn fetch_order(&self, id: i64) -> Result<Option<Order>, PaymentGatewayError> {
        self.db.fetch_order(id).await
    }

    pub async fn fetch_orders_for_payment_intent(&self, intent_id: &str) -> Result<Vec<Order>, PaymentGatewayError> {
        self.db.fetch_orders_for_payment_intent(intent_id).await
    }

    /// Moves an order to a new status, enforcing the legal lifecycle transitions:
    ///
    /// * `Pending` orders may be confirmed or cancelled.
    /// * `Confirmed` orders may be fulfilled or cancelled.
    /// * Every other transition is forbidden, and re-asserting the current status is a no-op error.
    pub async fn set_order_status(&self, id: i64, status: OrderStatusType) -> Result<Order, PaymentGatewayError> {
        use OrderStatusType::*;
        let order = self.db.fetch_order(id).await?.ok_or(PaymentGatewayError::OrderIdNotFound(id))?;
        if order.status == status {
            debug!("🔄️📦️ Order #{id} already has status {status}. No action to take.");
            return Err(PaymentGatewayError::OrderModificationNoOp);
        }
        let legal = matches!((order.status, status), (Pending, Confirmed | Cancelled) | (Confirmed, Fulfilled | Cancelled));
        if !legal {
            warn!("🔄️📦️ Order #{id} may not move from {} to {status}.", order.status);
            return Err(PaymentGatewayError::OrderModificationForbidden);
        }
        let order = self.db.update_order_status(id, status).await?;
        info!("🔄️📦️ Order #{id} is now {status}.");
        Ok(order)
    }

    /// Backfills guest contact details onto an order, typically once the guest's check-in record becomes
    /// available. Only the fields carried in `contact` are written.
    pub async fn backfill_guest_contact(&self, id: i64, contact: GuestContact) -> Result<Order, PaymentGatewayError> {
        let order = self.db.update_guest_contact(id, contact).await?;
        debug!("🔄️📦️ Guest contact updated on order #{id}.");
        Ok(order)
    }
}
