//! The typed view over the payment provider's webhook envelope.
//!
//! Payloads are parsed and validated exactly once, here at the boundary. Downstream code works with
//! [`PaymentConfirmation`] and [`ProviderAccountStatus`] and never re-inspects the raw JSON.
use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};
use gf_common::MoneyAmount;
use guestflow_engine::db_types::{CartItem, PaymentConfirmation, ProviderAccountStatus};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// The header carrying the hex HMAC-SHA256 signature over the raw request body.
pub const SIGNATURE_HEADER: &str = "Signature";

/// Upper bound on the guest count a single cart line may carry. Larger values are clamped, not rejected.
const MAX_GUESTS_PER_ITEM: u32 = 20;

//--------------------------------------      EventKind       --------------------------------------------------------
/// The event kinds this server understands. Everything else lands in `Unrecognized` and is acknowledged without
/// further processing, so that provider-side additions never cause retry storms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    PaymentSucceeded,
    PaymentFailed,
    AccountUpdated,
    AccountDeauthorized,
    Unrecognized(String),
}

impl From<&str> for EventKind {
    fn from(value: &str) -> Self {
        match value {
            "payment_intent.succeeded" => Self::PaymentSucceeded,
            "payment_intent.payment_failed" => Self::PaymentFailed,
            "account.updated" => Self::AccountUpdated,
            "account.application.deauthorized" => Self::AccountDeauthorized,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PaymentSucceeded => write!(f, "payment_intent.succeeded"),
            Self::PaymentFailed => write!(f, "payment_intent.payment_failed"),
            Self::AccountUpdated => write!(f, "account.updated"),
            Self::AccountDeauthorized => write!(f, "account.application.deauthorized"),
            Self::Unrecognized(s) => write!(f, "{s}"),
        }
    }
}

//--------------------------------------     WebhookEvent     --------------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub created: Option<i64>,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: Value,
}

impl WebhookEvent {
    pub fn kind(&self) -> EventKind {
        EventKind::from(self.event_type.as_str())
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.created.and_then(|ts| Utc.timestamp_opt(ts, 0).single()).unwrap_or_else(Utc::now)
    }
}

#[derive(Debug, Error)]
pub enum EventConversionError {
    #[error("The event payload is not in the expected format. {0}")]
    FormatError(String),
    #[error("The event metadata does not carry a usable property id")]
    MissingPropertyId,
}

//--------------------------------------    PaymentIntent     --------------------------------------------------------
/// The provider's payment object. Amounts on the wire are already in minor units; metadata values are always
/// strings, including the JSON-encoded cart list.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub amount: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub metadata: PaymentMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentMetadata {
    #[serde(default)]
    pub property_id: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub cart_items: Option<String>,
    /// Provider metadata values are strings, so this is "true"/"false" rather than a boolean.
    #[serde(default)]
    pub is_guest_payment: Option<String>,
}

/// One cart line as serialized into the payment metadata. Prices here are floats in major units; they are
/// converted to minor units exactly once, during [`payment_confirmation`].
#[derive(Debug, Clone, Deserialize)]
struct MetadataCartItem {
    upsell_id: i64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    guest_count: Option<u32>,
    #[serde(default)]
    unit_price: Option<f64>,
    #[serde(default)]
    total_price: Option<f64>,
    #[serde(default)]
    selected_date: Option<DateTime<Utc>>,
    #[serde(default)]
    menu_options: Option<String>,
    #[serde(default)]
    special_notes: Option<String>,
}

/// Converts a payment-succeeded event into the materializer's input.
///
/// A malformed or missing cart list degrades to an empty cart (the materializer synthesizes a fallback order), so
/// a metadata hiccup never loses a successful payment. Only a payload that cannot identify the payment or the
/// property is a conversion error.
pub fn payment_confirmation(event: &WebhookEvent) -> Result<PaymentConfirmation, EventConversionError> {
    let intent: PaymentIntent =
        serde_json::from_value(event.data.object.clone()).map_err(|e| EventConversionError::FormatError(e.to_string()))?;
    let property_id = intent
        .metadata
        .property_id
        .as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or(EventConversionError::MissingPropertyId)?;
    let cart_items = parse_cart_items(&event.id, intent.metadata.cart_items.as_deref());
    if intent.metadata.is_guest_payment.as_deref() == Some("true") {
        debug!("💳️ Event {} is a guest-initiated payment.", event.id);
    }
    Ok(PaymentConfirmation {
        event_id: event.id.clone(),
        payment_intent_id: intent.id,
        property_id,
        amount: MoneyAmount::from(intent.amount),
        currency: intent.currency.map(|c| c.to_uppercase()),
        access_token: intent.metadata.access_token,
        cart_items,
        occurred_at: event.occurred_at(),
    })
}

fn parse_cart_items(event_id: &str, raw: Option<&str>) -> Vec<CartItem> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let items: Vec<MetadataCartItem> = match serde_json::from_str(raw) {
        Ok(items) => items,
        Err(e) => {
            warn!("💳️ Event {event_id} carries an unreadable cart list ({e}). Falling back to an empty cart.");
            return Vec::new();
        },
    };
    items
        .into_iter()
        .filter_map(|item| {
            let guest_count = item.guest_count.unwrap_or(1).clamp(1, MAX_GUESTS_PER_ITEM);
            let unit_price = item.unit_price.map(MoneyAmount::from_major_units_f64);
            let total_price = item
                .total_price
                .map(MoneyAmount::from_major_units_f64)
                .or_else(|| unit_price.map(|p| p * i64::from(guest_count)));
            let Some(total_price) = total_price else {
                warn!("💳️ Event {event_id}: cart item for upsell {} has no price at all. Skipping it.", item.upsell_id);
                return None;
            };
            Some(CartItem {
                upsell_id: item.upsell_id,
                upsell_title: item.title,
                guest_count,
                unit_price,
                total_price,
                selected_date: item.selected_date,
                menu_options: item.menu_options,
                special_notes: item.special_notes,
            })
        })
        .collect()
}

/// Extracts the sub-account status from an account-updated event.
pub fn account_status(event: &WebhookEvent) -> Result<ProviderAccountStatus, EventConversionError> {
    serde_json::from_value(event.data.object.clone()).map_err(|e| EventConversionError::FormatError(e.to_string()))
}

/// Extracts the sub-account id from a deauthorization event. Deauthorization payloads carry the account id either
/// on the object itself or alongside it in an `account` field.
pub fn deauthorized_account_id(event: &WebhookEvent) -> Result<String, EventConversionError> {
    event.data.object["id"]
        .as_str()
        .or_else(|| event.data.object["account"].as_str())
        .map(String::from)
        .ok_or_else(|| EventConversionError::FormatError("no account id in deauthorization payload".to_string()))
}

#[cfg(test)]
mod test {
    use gf_common::MoneyAmount;

    use super::{payment_confirmation, EventKind, WebhookEvent};

    fn event(json: &str) -> WebhookEvent {
        serde_json::from_str(json).expect("Error parsing test event")
    }

    #[test]
    fn event_kinds_are_classified() {
        assert_eq!(EventKind::from("payment_intent.succeeded"), EventKind::PaymentSucceeded);
        assert_eq!(EventKind::from("account.updated"), EventKind::AccountUpdated);
        assert_eq!(EventKind::from("charge.refunded"), EventKind::Unrecognized("charge.refunded".to_string()));
    }

    #[test]
    fn succeeded_events_convert_with_cart_metadata() {
        let ev = event(
            r#"{
            "id": "evt_1",
            "type": "payment_intent.succeeded",
            "created": 1714764000,
            "data": { "object": {
                "id": "pi_1",
                "amount": 12100,
                "currency": "eur",
                "metadata": {
                    "property_id": "7",
                    "access_token": "tok_x",
                    "cart_items": "[{\"upsell_id\": 3, \"title\": \"Spa\", \"guest_count\": 2, \"unit_price\": 50.0, \"total_price\": 100.0}]"
                }
            }}
        }"#,
        );
        let conf = payment_confirmation(&ev).expect("Error converting event");
        assert_eq!(conf.event_id, "evt_1");
        assert_eq!(conf.payment_intent_id, "pi_1");
        assert_eq!(conf.property_id, 7);
        assert_eq!(conf.amount, MoneyAmount::from(12_100));
        assert_eq!(conf.currency.as_deref(), Some("EUR"));
        assert_eq!(conf.cart_items.len(), 1);
        let item = &conf.cart_items[0];
        assert_eq!(item.upsell_id, 3);
        assert_eq!(item.guest_count, 2);
        assert_eq!(item.unit_price, Some(MoneyAmount::from(5_000)));
        assert_eq!(item.total_price, MoneyAmount::from(10_000));
    }

    #[test]
    fn unreadable_cart_metadata_degrades_to_an_empty_cart() {
        let ev = event(
            r#"{
            "id": "evt_2",
            "type": "payment_intent.succeeded",
            "data": { "object": {
                "id": "pi_2",
                "amount": 5000,
                "metadata": { "property_id": "7", "cart_items": "this is not json" }
            }}
        }"#,
        );
        let conf = payment_confirmation(&ev).expect("Error converting event");
        assert!(conf.cart_items.is_empty());
        assert_eq!(conf.amount, MoneyAmount::from(5_000));
    }

    #[test]
    fn events_without_a_property_id_do_not_convert() {
        let ev = event(
            r#"{
            "id": "evt_3",
            "type": "payment_intent.succeeded",
            "data": { "object": { "id": "pi_3", "amount": 100, "metadata": {} } }
        }"#,
        );
        assert!(payment_confirmation(&ev).is_err());
    }

    #[test]
    fn oversized_guest_counts_are_clamped() {
        let ev = event(
            r#"{
            "id": "evt_4",
            "type": "payment_intent.succeeded",
            "data": { "object": {
                "id": "pi_4",
                "amount": 100000,
                "metadata": {
                    "property_id": "1",
                    "cart_items": "[{\"upsell_id\": 1, \"guest_count\": 500, \"unit_price\": 10.0}]"
                }
            }}
        }"#,
        );
        let conf = payment_confirmation(&ev).expect("Error converting event");
        assert_eq!(conf.cart_items[0].guest_count, 20);
        // No explicit total, so the clamped count drives the derived one.
        assert_eq!(conf.cart_items[0].total_price, MoneyAmount::from(20_000));
    }
}
