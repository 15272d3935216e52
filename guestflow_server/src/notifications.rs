//! Fan-out of order notifications across the four delivery channels.
//!
//! Every channel attempt is independent: a failure (or a missing address) is captured in the aggregate outcome
//! and never prevents the remaining attempts. The dispatcher is generic over the channel traits so tests can
//! substitute recording or failing transports.
use std::fmt::Display;

use guestflow_engine::{
    db_types::{Order, Vendor},
    invoice::{invoice_for_order, Invoice},
    GuestInfo,
};
use log::*;
use notify_tools::{EmailChannel, MessageChannel, OutboundEmail, OutboundMessage};

//--------------------------------------   ChannelOutcome    ---------------------------------------------------------
/// The result of one channel attempt. `detail` carries the diagnostic when the attempt failed or was skipped.
#[derive(Debug, Clone, Default)]
pub struct ChannelOutcome {
    pub ok: bool,
    pub detail: Option<String>,
}

impl ChannelOutcome {
    fn delivered() -> Self {
        Self { ok: true, detail: None }
    }

    fn mocked() -> Self {
        Self { ok: true, detail: Some("mock delivery (channel not configured)".to_string()) }
    }

    fn failed<S: Display>(detail: S) -> Self {
        Self { ok: false, detail: Some(detail.to_string()) }
    }
}

/// Per-channel results of one dispatch, in the fixed attempt order.
#[derive(Debug, Clone, Default)]
pub struct NotificationOutcome {
    pub vendor_email: ChannelOutcome,
    pub guest_email: ChannelOutcome,
    pub vendor_message: ChannelOutcome,
    pub guest_message: ChannelOutcome,
}

impl Display for NotificationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "vendor_email: {}, guest_email: {}, vendor_message: {}, guest_message: {}",
            self.vendor_email.ok, self.guest_email.ok, self.vendor_message.ok, self.guest_message.ok
        )
    }
}

//-------------------------------------- NotificationDispatcher ------------------------------------------------------
#[derive(Clone)]
pub struct NotificationDispatcher<E, M> {
    email: E,
    messaging: M,
}

impl<E, M> NotificationDispatcher<E, M>
where
    E: EmailChannel,
    M: MessageChannel,
{
    pub fn new(email: E, messaging: M) -> Self {
        Self { email, messaging }
    }

    /// Attempts all four notifications for a freshly created order: vendor email, guest email, vendor message,
    /// guest message, in that order. Missing addresses and provider failures are recorded, logged, and skipped.
    pub async fn send_order_notifications(
        &self,
        order: &Order,
        guest: &GuestInfo,
        vendor: Option<&Vendor>,
    ) -> NotificationOutcome {
        let invoice = invoice_for_order(order);
        let mut outcome = NotificationOutcome::default();

        outcome.vendor_email = match vendor.and_then(|v| v.email.as_deref().filter(|e| !e.is_empty())) {
            Some(address) => {
                let email = OutboundEmail {
                    to: address.to_string(),
                    to_name: vendor.map(|v| v.name.clone()),
                    subject: format!("New service booking - {}", service_title(order)),
                    html_body: vendor_email_body(order, guest),
                };
                self.try_email(order, "vendor", email).await
            },
            None => {
                debug!("📣️ Order #{} has no vendor email address. Skipping the vendor email.", order.id);
                ChannelOutcome::failed("no vendor email address")
            },
        };

        outcome.guest_email = match guest.email.as_deref().filter(|e| !e.is_empty()) {
            Some(address) => {
                let email = OutboundEmail {
                    to: address.to_string(),
                    to_name: Some(guest.name.clone()),
                    subject: format!("Booking confirmation & invoice - {}", service_title(order)),
                    html_body: guest_email_body(order, guest, &invoice),
                };
                self.try_email(order, "guest", email).await
            },
            None => {
                debug!("📣️ No guest email could be resolved for order #{}. Skipping the guest email.", order.id);
                ChannelOutcome::failed("no guest email address")
            },
        };

        outcome.vendor_message = match vendor.and_then(|v| v.whatsapp_number.as_deref().filter(|p| !p.is_empty())) {
            Some(phone) => {
                let message = OutboundMessage { to: phone.to_string(), body: vendor_message_text(order, guest) };
                self.try_message(order, "vendor", message).await
            },
            None => {
                debug!("📣️ Order #{} has no vendor WhatsApp number. Skipping the vendor message.", order.id);
                ChannelOutcome::failed("no vendor phone number")
            },
        };

        outcome.guest_message = match guest.phone.as_deref().filter(|p| !p.is_empty()) {
            Some(phone) => {
                let message = OutboundMessage { to: phone.to_string(), body: guest_message_text(order, &invoice) };
                self.try_message(order, "guest", message).await
            },
            None => {
                debug!("📣️ No guest phone could be resolved for order #{}. Skipping the guest message.", order.id);
                ChannelOutcome::failed("no guest phone number")
            },
        };

        info!("📣️ Notification dispatch for order #{} complete. {outcome}", order.id);
        outcome
    }

    async fn try_email(&self, order: &Order, audience: &str, email: OutboundEmail) -> ChannelOutcome {
        match self.email.send_email(email).await {
            Ok(receipt) if receipt.mocked => ChannelOutcome::mocked(),
            Ok(_) => {
                debug!("📣️ {audience} email for order #{} accepted for delivery.", order.id);
                ChannelOutcome::delivered()
            },
            Err(e) => {
                warn!("📣️ Could not deliver the {audience} email for order #{}. {e}", order.id);
                ChannelOutcome::failed(e)
            },
        }
    }

    async fn try_message(&self, order: &Order, audience: &str, message: OutboundMessage) -> ChannelOutcome {
        match self.messaging.send_message(message).await {
            Ok(receipt) if receipt.mocked => ChannelOutcome::mocked(),
            Ok(_) => {
                debug!("📣️ {audience} message for order #{} accepted for delivery.", order.id);
                ChannelOutcome::delivered()
            },
            Err(e) => {
                warn!("📣️ Could not deliver the {audience} message for order #{}. {e}", order.id);
                ChannelOutcome::failed(e)
            },
        }
    }
}

//--------------------------------------   Message content    --------------------------------------------------------

fn service_title(order: &Order) -> String {
    order
        .order_details
        .cart_items
        .iter()
        .find(|item| Some(item.upsell_id) == order.upsell_id)
        .and_then(|item| item.upsell_title.clone())
        .unwrap_or_else(|| "your order".to_string())
}

fn schedule_line(order: &Order) -> String {
    order
        .order_details
        .scheduled_date
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "to be scheduled".to_string())
}

fn vendor_email_body(order: &Order, guest: &GuestInfo) -> String {
    let mut body = format!(
        "<h2>New booking</h2>\
         <p>You have a new booking for <strong>{}</strong>.</p>\
         <ul>\
         <li>Order: #{:06}</li>\
         <li>Guest: {}</li>\
         <li>Guests: {}</li>\
         <li>Date: {}</li>\
         <li>Amount: {} {}</li>\
         </ul>",
        service_title(order),
        order.id,
        guest.name,
        order.order_details.guest_count,
        schedule_line(order),
        order.currency,
        order.amount,
    );
    if let Some(notes) = order.order_details.special_requests.as_deref().filter(|s| !s.is_empty()) {
        body.push_str(&format!("<p>Special requests: {notes}</p>"));
    }
    if let Some(menu) = order.order_details.menu_preferences.as_deref().filter(|s| !s.is_empty()) {
        body.push_str(&format!("<p>Menu preferences: {menu}</p>"));
    }
    body
}

fn guest_email_body(order: &Order, guest: &GuestInfo, invoice: &Invoice) -> String {
    format!(
        "<h2>Thank you, {}!</h2>\
         <p>Your payment was received and your booking for <strong>{}</strong> is confirmed.</p>\
         {}",
        guest.name,
        service_title(order),
        invoice_html(invoice),
    )
}

fn invoice_html(invoice: &Invoice) -> String {
    let mut rows = String::new();
    for line in &invoice.lines {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            line.description, line.quantity, line.unit_price, line.total
        ));
    }
    format!(
        "<h3>Invoice {}</h3>\
         <table>\
         <tr><th>Item</th><th>Qty</th><th>Unit</th><th>Total</th></tr>\
         {rows}\
         </table>\
         <p>Subtotal: {} {}<br>Tax (21%): {} {}<br><strong>Total: {} {}</strong></p>\
         <p>Due by {}.</p>",
        invoice.invoice_number,
        invoice.subtotal,
        invoice.currency,
        invoice.tax,
        invoice.currency,
        invoice.total,
        invoice.currency,
        invoice.due_at.format("%Y-%m-%d"),
    )
}

fn vendor_message_text(order: &Order, guest: &GuestInfo) -> String {
    format!(
        "*New booking alert!*\n\nService: *{}*\nGuest: *{}*\nAmount: *{} {}*\nDate: *{}*\n\nPlease check your email \
         for full details.",
        service_title(order),
        guest.name,
        order.currency,
        order.amount,
        schedule_line(order),
    )
}

fn guest_message_text(order: &Order, invoice: &Invoice) -> String {
    format!(
        "*Booking confirmed!*\n\nService: *{}*\nOrder: *{}*\nTotal: *{} {}*\n\nYour confirmation email with the \
         invoice has been sent.",
        service_title(order),
        invoice.order_number,
        invoice.currency,
        invoice.total,
    )
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use gf_common::MoneyAmount;
    use guestflow_engine::{
        db_types::{Json, Order, OrderDetails, OrderStatusType, Vendor},
        GuestInfo,
    };
    use mockall::mock;
    use notify_tools::{DeliveryReceipt, EmailChannel, MessageChannel, NotifyApiError, OutboundEmail, OutboundMessage};

    use super::NotificationDispatcher;

    mock! {
        pub Email {}
        impl Clone for Email {
            fn clone(&self) -> Self;
        }
        impl EmailChannel for Email {
            async fn send_email(&self, email: OutboundEmail) -> Result<DeliveryReceipt, NotifyApiError>;
        }
    }

    mock! {
        pub Messaging {}
        impl Clone for Messaging {
            fn clone(&self) -> Self;
        }
        impl MessageChannel for Messaging {
            async fn send_message(&self, message: OutboundMessage) -> Result<DeliveryReceipt, NotifyApiError>;
        }
    }

    fn order() -> Order {
        let now = Utc::now();
        Order {
            id: 12,
            property_id: 1,
            upsell_id: Some(3),
            vendor_id: Some(9),
            guest_name: None,
            guest_email: None,
            guest_phone: None,
            amount: MoneyAmount::from(10_000),
            currency: "EUR".to_string(),
            status: OrderStatusType::Confirmed,
            payment_intent_id: Some("pi_12".to_string()),
            order_details: Json(OrderDetails {
                guest_count: 2,
                unit_price: MoneyAmount::from(5_000),
                ..OrderDetails::default()
            }),
            fulfilled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn vendor(email: Option<&str>, whatsapp: Option<&str>) -> Vendor {
        Vendor {
            id: 9,
            name: "Sunset Cruises".to_string(),
            email: email.map(String::from),
            whatsapp_number: whatsapp.map(String::from),
            phone: None,
            service_type: None,
            is_active: true,
        }
    }

    fn guest(email: Option<&str>, phone: Option<&str>) -> GuestInfo {
        GuestInfo {
            name: "Greta Guest".to_string(),
            email: email.map(String::from),
            phone: phone.map(String::from),
            passport_url: None,
        }
    }

    #[tokio::test]
    async fn missing_vendor_email_does_not_stop_the_other_channels() {
        let mut email = MockEmail::new();
        // Only the guest email should be attempted.
        email.expect_send_email().times(1).returning(|_| Ok(DeliveryReceipt::default()));
        let mut messaging = MockMessaging::new();
        messaging.expect_send_message().times(2).returning(|_| Ok(DeliveryReceipt::default()));
        let dispatcher = NotificationDispatcher::new(email, messaging);

        let vendor = vendor(None, Some("+34600000001"));
        let guest = guest(Some("greta@example.com"), Some("+34600000002"));
        let outcome = dispatcher.send_order_notifications(&order(), &guest, Some(&vendor)).await;

        assert!(!outcome.vendor_email.ok);
        assert!(outcome.guest_email.ok);
        assert!(outcome.vendor_message.ok);
        assert!(outcome.guest_message.ok);
    }

    #[tokio::test]
    async fn email_provider_failures_do_not_stop_the_message_channels() {
        let mut email = MockEmail::new();
        email
            .expect_send_email()
            .times(2)
            .returning(|_| Err(NotifyApiError::QueryError { status: 500, message: "boom".to_string() }));
        let mut messaging = MockMessaging::new();
        messaging.expect_send_message().times(2).returning(|_| Ok(DeliveryReceipt::default()));
        let dispatcher = NotificationDispatcher::new(email, messaging);

        let vendor = vendor(Some("crew@example.com"), Some("+34600000001"));
        let guest = guest(Some("greta@example.com"), Some("+34600000002"));
        let outcome = dispatcher.send_order_notifications(&order(), &guest, Some(&vendor)).await;

        assert!(!outcome.vendor_email.ok);
        assert!(outcome.vendor_email.detail.is_some());
        assert!(!outcome.guest_email.ok);
        assert!(outcome.vendor_message.ok);
        assert!(outcome.guest_message.ok);
    }

    #[tokio::test]
    async fn mock_deliveries_count_as_handled() {
        let mut email = MockEmail::new();
        email.expect_send_email().times(1).returning(|_| Ok(DeliveryReceipt::default()));
        let mut messaging = MockMessaging::new();
        messaging
            .expect_send_message()
            .times(1)
            .returning(|_| Ok(DeliveryReceipt { provider_id: None, mocked: true }));
        let dispatcher = NotificationDispatcher::new(email, messaging);

        // No vendor at all: only the guest channels are addressable.
        let guest = guest(Some("greta@example.com"), Some("+34600000002"));
        let outcome = dispatcher.send_order_notifications(&order(), &guest, None).await;

        assert!(!outcome.vendor_email.ok);
        assert!(outcome.guest_email.ok);
        assert!(!outcome.vendor_message.ok);
        assert!(outcome.guest_message.ok);
        assert!(outcome.guest_message.detail.as_deref().unwrap_or_default().contains("mock"));
    }
}
