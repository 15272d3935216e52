//! Pure invoice construction. An invoice is derived entirely from a persisted order; nothing here touches the
//! database or the clock, which keeps the arithmetic trivially testable.
use chrono::{DateTime, Duration, Utc};
use gf_common::MoneyAmount;

use crate::db_types::Order;

/// Sales tax applied to every invoice, in whole percentage points.
pub const TAX_RATE_POINTS: i64 = 21;
/// Invoices fall due this many days after the order was created.
pub const INVOICE_DUE_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLine {
    pub description: String,
    pub quantity: u32,
    pub unit_price: MoneyAmount,
    pub total: MoneyAmount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub invoice_number: String,
    pub order_number: String,
    pub issued_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub currency: String,
    pub lines: Vec<InvoiceLine>,
    pub subtotal: MoneyAmount,
    pub tax: MoneyAmount,
    pub total: MoneyAmount,
}

/// Builds the invoice for an order.
///
/// Line items come from the cart snapshot in the order details. Orders without a cart snapshot (the synthetic
/// order created for an empty cart) get a single line carrying the order total. Tax is added on top of the
/// subtotal at [`TAX_RATE_POINTS`].
pub fn invoice_for_order(order: &Order) -> Invoice {
    let mut lines: Vec<InvoiceLine> = order
        .order_details
        .cart_items
        .iter()
        .map(|item| {
            let quantity = item.guest_count.max(1);
            let unit_price = item.unit_price.unwrap_or_else(|| {
                MoneyAmount::from(item.total_price.value() / i64::from(quantity))
            });
            InvoiceLine {
                description: item.upsell_title.clone().unwrap_or_else(|| "Order item".to_string()),
                quantity,
                unit_price,
                total: item.total_price,
            }
        })
        .collect();
    if lines.is_empty() {
        lines.push(InvoiceLine {
            description: format!("Order #{:06}", order.id),
            quantity: order.order_details.guest_count.max(1),
            unit_price: order.order_details.unit_price,
            total: order.amount,
        });
    }
    let subtotal: MoneyAmount = lines.iter().map(|l| l.total).sum();
    let tax = subtotal.percentage(TAX_RATE_POINTS);
    Invoice {
        invoice_number: format!("INV-{:06}", order.id),
        order_number: format!("ORD-{:06}", order.id),
        issued_at: order.created_at,
        due_at: order.created_at + Duration::days(INVOICE_DUE_DAYS),
        currency: order.currency.clone(),
        lines,
        subtotal,
        tax,
        total: subtotal + tax,
    }
}

#[cfg(test)]
mod test {
    use chrono::{Duration, Utc};
    use gf_common::MoneyAmount;
    use sqlx::types::Json;

    use super::{invoice_for_order, INVOICE_DUE_DAYS};
    use crate::db_types::{CartItem, Order, OrderDetails, OrderStatusType};

    fn order_with_details(id: i64, amount: i64, details: OrderDetails) -> Order {
        let now = Utc::now();
        Order {
            id,
            property_id: 1,
            upsell_id: Some(10),
            vendor_id: Some(5),
            guest_name: None,
            guest_email: None,
            guest_phone: None,
            amount: MoneyAmount::from(amount),
            currency: "EUR".to_string(),
            status: OrderStatusType::Confirmed,
            payment_intent_id: Some("pi_123".to_string()),
            order_details: Json(details),
            fulfilled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn invoice_totals_include_tax() {
        let details = OrderDetails {
            cart_items: vec![CartItem {
                upsell_id: 10,
                upsell_title: Some("Sunset cruise".to_string()),
                guest_count: 2,
                unit_price: Some(MoneyAmount::from(5_000)),
                total_price: MoneyAmount::from(10_000),
                selected_date: None,
                menu_options: None,
                special_notes: None,
            }],
            guest_count: 2,
            unit_price: MoneyAmount::from(5_000),
            ..OrderDetails::default()
        };
        let order = order_with_details(42, 10_000, details);
        let invoice = invoice_for_order(&order);
        assert_eq!(invoice.invoice_number, "INV-000042");
        assert_eq!(invoice.order_number, "ORD-000042");
        assert_eq!(invoice.lines.len(), 1);
        assert_eq!(invoice.lines[0].description, "Sunset cruise");
        assert_eq!(invoice.subtotal, MoneyAmount::from(10_000));
        assert_eq!(invoice.tax, MoneyAmount::from(2_100));
        assert_eq!(invoice.total, MoneyAmount::from(12_100));
        assert_eq!(invoice.due_at - invoice.issued_at, Duration::days(INVOICE_DUE_DAYS));
    }

    #[test]
    fn empty_cart_falls_back_to_a_single_line() {
        let details =
            OrderDetails { guest_count: 1, unit_price: MoneyAmount::from(7_500), ..OrderDetails::default() };
        let order = order_with_details(7, 7_500, details);
        let invoice = invoice_for_order(&order);
        assert_eq!(invoice.lines.len(), 1);
        assert_eq!(invoice.lines[0].description, "Order #000007");
        assert_eq!(invoice.lines[0].total, MoneyAmount::from(7_500));
        assert_eq!(invoice.subtotal, MoneyAmount::from(7_500));
        assert_eq!(invoice.total, MoneyAmount::from(7_500) + MoneyAmount::from(1_575));
    }

    #[test]
    fn multi_line_invoices_sum_line_totals() {
        let item = |id: i64, title: &str, total: i64| CartItem {
            upsell_id: id,
            upsell_title: Some(title.to_string()),
            guest_count: 1,
            unit_price: Some(MoneyAmount::from(total)),
            total_price: MoneyAmount::from(total),
            selected_date: None,
            menu_options: None,
            special_notes: None,
        };
        let details = OrderDetails {
            cart_items: vec![item(1, "Breakfast", 1_500), item(2, "Late checkout", 2_500)],
            guest_count: 1,
            unit_price: MoneyAmount::from(1_500),
            ..OrderDetails::default()
        };
        let order = order_with_details(9, 4_000, details);
        let invoice = invoice_for_order(&order);
        assert_eq!(invoice.lines.len(), 2);
        assert_eq!(invoice.subtotal, MoneyAmount::from(4_000));
        assert_eq!(invoice.tax, MoneyAmount::from(840));
        assert_eq!(invoice.total, MoneyAmount::from(4_840));
    }
}
