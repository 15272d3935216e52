//! `SqliteDatabase` is a concrete implementation of a Guestflow payment pipeline backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use gf_common::DEFAULT_CURRENCY_CODE;
use log::*;
use sqlx::SqlitePool;

use super::db::{catalog, db_url, events, new_pool, orders, users};
use crate::{
    db_types::{
        GuestCheckIn,
        GuestContact,
        MaterializedBatch,
        NewOrder,
        Order,
        OrderDetails,
        OrderStatusType,
        PaymentConfirmation,
        Property,
        Upsell,
        User,
        Vendor,
        PAYMENT_METHOD_CARD,
    },
    traits::{
        AccountApiError,
        AccountManagement,
        CatalogApiError,
        CatalogManagement,
        PaymentGatewayDatabase,
        PaymentGatewayError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Takes a verified payment confirmation, and in a single atomic transaction,
    /// * records the provider event id. If the event was already recorded, the transaction commits with no new
    ///   orders and the batch is flagged as a duplicate.
    /// * resolves the property to determine the display currency,
    /// * creates one `Confirmed` order per cart item whose upsell still exists, snapshotting the upsell's primary
    ///   vendor onto the order,
    /// * synthesizes a single minimal order from the event total when the cart is empty.
    ///
    /// Cart items referencing a missing upsell are logged and skipped. They never fail the batch.
    async fn materialize_orders(
        &self,
        confirmation: PaymentConfirmation,
    ) -> Result<MaterializedBatch, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let event_id = confirmation.event_id.as_str();
        let first_delivery = events::try_record_event(event_id, "payment_intent.succeeded", &mut tx).await?;
        if !first_delivery {
            debug!("🗃️ Event {event_id} has already been processed. No orders will be created.");
            tx.commit().await?;
            return Ok(MaterializedBatch { orders: Vec::new(), duplicate_event: true });
        }
        let property = catalog::fetch_property(confirmation.property_id, &mut tx).await?;
        if property.is_none() {
            warn!(
                "🗃️ Event {event_id} references property {} which does not exist. Orders will still be created \
                 against it so that the payment is not lost.",
                confirmation.property_id
            );
        }
        let currency = confirmation
            .currency
            .clone()
            .or_else(|| property.and_then(|p| p.currency))
            .unwrap_or_else(|| DEFAULT_CURRENCY_CODE.to_string());
        let mut batch = Vec::with_capacity(confirmation.cart_items.len().max(1));
        for item in &confirmation.cart_items {
            let Some(upsell) = catalog::fetch_upsell(item.upsell_id, &mut tx).await? else {
                warn!(
                    "🗃️ Event {event_id} contains cart item for upsell {}, which does not exist. Skipping this item.",
                    item.upsell_id
                );
                continue;
            };
            // The full cart list is snapshotted onto every order so an invoice can be reconstructed later.
            let details = OrderDetails {
                access_token: confirmation.access_token.clone(),
                cart_items: confirmation.cart_items.clone(),
                guest_count: item.guest_count,
                unit_price: item.unit_price.unwrap_or(upsell.price),
                // An item without a chosen date is scheduled "as of" the payment.
                scheduled_date: item.selected_date.or(Some(confirmation.occurred_at)),
                special_requests: item.special_notes.clone(),
                menu_preferences: item.menu_options.clone(),
                payment_method: PAYMENT_METHOD_CARD.to_string(),
            };
            let new_order = NewOrder {
                property_id: confirmation.property_id,
                upsell_id: Some(upsell.id),
                vendor_id: upsell.primary_vendor_id,
                guest_name: None,
                guest_email: None,
                guest_phone: None,
                amount: item.total_price,
                currency: currency.clone(),
                status: OrderStatusType::Confirmed,
                payment_intent_id: Some(confirmation.payment_intent_id.clone()),
                order_details: details,
            };
            let order = orders::insert_order(new_order, &mut tx).await?;
            debug!("🗃️ Order #{} created for upsell '{}' from event {event_id}", order.id, upsell.title);
            batch.push(order);
        }
        if confirmation.cart_items.is_empty() {
            info!("🗃️ Event {event_id} carried no cart items. Creating a single order from the event total.");
            let details = OrderDetails {
                access_token: confirmation.access_token.clone(),
                guest_count: 1,
                unit_price: confirmation.amount,
                payment_method: PAYMENT_METHOD_CARD.to_string(),
                ..OrderDetails::default()
            };
            let new_order = NewOrder {
                property_id: confirmation.property_id,
                upsell_id: None,
                vendor_id: None,
                guest_name: None,
                guest_email: None,
                guest_phone: None,
                amount: confirmation.amount,
                currency,
                status: OrderStatusType::Confirmed,
                payment_intent_id: Some(confirmation.payment_intent_id.clone()),
                order_details: details,
            };
            let order = orders::insert_order(new_order, &mut tx).await?;
            batch.push(order);
        }
        tx.commit().await?;
        debug!("🗃️ Event {event_id} materialized into {} order(s)", batch.len());
        Ok(MaterializedBatch { orders: batch, duplicate_event: false })
    }

    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_payment_intent(&self, intent_id: &str) -> Result<Vec<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::fetch_orders_for_payment_intent(intent_id, &mut conn).await?;
        Ok(result)
    }

    async fn update_order_status(&self, id: i64, status: OrderStatusType) -> Result<Order, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_order_status(id, status, &mut conn).await
    }

    async fn update_guest_contact(&self, id: i64, contact: GuestContact) -> Result<Order, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_guest_contact(id, contact, &mut conn).await
    }

    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        self.pool.close().await;
        Ok(())
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_upsell(&self, id: i64) -> Result<Option<Upsell>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let upsell = catalog::fetch_upsell(id, &mut conn).await?;
        Ok(upsell)
    }

    async fn fetch_property(&self, id: i64) -> Result<Option<Property>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let property = catalog::fetch_property(id, &mut conn).await?;
        Ok(property)
    }

    async fn fetch_property_by_access_token(&self, token: &str) -> Result<Option<Property>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let property = catalog::fetch_property_by_access_token(token, &mut conn).await?;
        Ok(property)
    }

    async fn fetch_vendor(&self, id: i64) -> Result<Option<Vendor>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let vendor = catalog::fetch_vendor(id, &mut conn).await?;
        Ok(vendor)
    }

    async fn fetch_check_in_by_access_token(&self, token: &str) -> Result<Option<GuestCheckIn>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let check_in = catalog::fetch_check_in_by_access_token(token, &mut conn).await?;
        Ok(check_in)
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_user_by_provider_account(&self, account_id: &str) -> Result<Option<User>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user_by_provider_account(account_id, &mut conn).await?;
        Ok(user)
    }

    async fn update_onboarding_status(&self, user_id: i64, complete: bool) -> Result<(), AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::update_onboarding_status(user_id, complete, &mut conn).await
    }

    async fn clear_provider_account(&self, user_id: i64) -> Result<(), AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::clear_provider_account(user_id, &mut conn).await
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
