use log::{debug, trace};
use sqlx::{sqlite::SqliteRow, types::Json, FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{GuestContact, NewOrder, Order, OrderStatusType},
    traits::PaymentGatewayError,
};

/// Inserts a new order into the database using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, PaymentGatewayError> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                property_id,
                upsell_id,
                vendor_id,
                guest_name,
                guest_email,
                guest_phone,
                amount,
                currency,
                status,
                payment_intent_id,
                order_details
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *;
        "#,
    )
    .bind(order.property_id)
    .bind(order.upsell_id)
    .bind(order.vendor_id)
    .bind(order.guest_name)
    .bind(order.guest_email)
    .bind(order.guest_phone)
    .bind(order.amount)
    .bind(order.currency)
    .bind(order.status.to_string())
    .bind(order.payment_intent_id)
    .bind(Json(order.order_details))
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order inserted with id {}", order.id);
    Ok(order)
}

pub async fn fetch_order(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

/// Returns every order created for the given payment-provider correlation id, oldest first.
pub async fn fetch_orders_for_payment_intent(
    intent_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE payment_intent_id = $1 ORDER BY id ASC")
        .bind(intent_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

pub(crate) async fn update_order_status(
    id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Order, PaymentGatewayError> {
    let fulfilled = status == OrderStatusType::Fulfilled;
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP, fulfilled_at = CASE WHEN $2 THEN \
         CURRENT_TIMESTAMP ELSE fulfilled_at END WHERE id = $3 RETURNING *",
    )
    .bind(status.to_string())
    .bind(fulfilled)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    result.ok_or(PaymentGatewayError::OrderIdNotFound(id))
}

/// Backfills the guest contact columns. Only fields carried in `contact` are written.
pub(crate) async fn update_guest_contact(
    id: i64,
    contact: GuestContact,
    conn: &mut SqliteConnection,
) -> Result<Order, PaymentGatewayError> {
    if contact.name.is_none() && contact.email.is_none() && contact.phone.is_none() {
        debug!("📝️ No guest contact fields to update for order {id}. Update request skipped.");
        return Err(PaymentGatewayError::OrderModificationNoOp);
    }
    let mut builder = QueryBuilder::new("UPDATE orders SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = contact.name {
        set_clause.push("guest_name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(email) = contact.email {
        set_clause.push("guest_email = ");
        set_clause.push_bind_unseparated(email);
    }
    if let Some(phone) = contact.phone {
        set_clause.push("guest_phone = ");
        set_clause.push_bind_unseparated(phone);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    trace!("📝️ Executing query: {}", builder.sql());
    let res = builder.build().fetch_optional(conn).await?.map(|row: SqliteRow| Order::from_row(&row)).transpose()?;
    res.ok_or(PaymentGatewayError::OrderIdNotFound(id))
}
