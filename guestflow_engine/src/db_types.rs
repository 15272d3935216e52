use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use gf_common::MoneyAmount;
use log::error;
use serde::{Deserialize, Serialize};
pub use sqlx::types::Json;
use sqlx::{FromRow, Type};
use thiserror::Error;

pub const PAYMENT_METHOD_CARD: &str = "stripe";

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order has been created but payment has not been confirmed yet (e.g. bank-transfer flows).
    Pending,
    /// Payment has been confirmed and the booking is awaiting fulfilment.
    Confirmed,
    /// The vendor has delivered the service. Set only by an explicit status transition.
    Fulfilled,
    /// The order has been cancelled by the guest or an admin.
    Cancelled,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Confirmed => write!(f, "Confirmed"),
            OrderStatusType::Fulfilled => write!(f, "Fulfilled"),
            OrderStatusType::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Confirmed" => Ok(Self::Confirmed),
            "Fulfilled" => Ok(Self::Fulfilled),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatusType::Pending
        })
    }
}

//--------------------------------------      CartItem        ---------------------------------------------------------
/// One purchased line item, snapshotted into the order details at materialization time. Prices are in minor units;
/// the provider-boundary conversion from major-unit floats happens before a `CartItem` is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub upsell_id: i64,
    pub upsell_title: Option<String>,
    pub guest_count: u32,
    pub unit_price: Option<MoneyAmount>,
    pub total_price: MoneyAmount,
    pub selected_date: Option<DateTime<Utc>>,
    pub menu_options: Option<String>,
    pub special_notes: Option<String>,
}

//--------------------------------------    OrderDetails      ---------------------------------------------------------
/// The opaque details bag stored against each order: the full cart snapshot for invoice reconstruction, plus the
/// per-item scheduling and preference data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderDetails {
    pub access_token: Option<String>,
    pub cart_items: Vec<CartItem>,
    pub guest_count: u32,
    pub unit_price: MoneyAmount,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub special_requests: Option<String>,
    pub menu_preferences: Option<String>,
    pub payment_method: String,
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: i64,
    pub property_id: i64,
    /// Absent only for the synthetic order created when a success event carried no cart items.
    pub upsell_id: Option<i64>,
    /// Snapshot of the upsell's primary vendor at creation time. Later vendor reassignment on the upsell does not
    /// change historical orders.
    pub vendor_id: Option<i64>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub amount: MoneyAmount,
    pub currency: String,
    pub status: OrderStatusType,
    pub payment_intent_id: Option<String>,
    pub order_details: Json<OrderDetails>,
    pub fulfilled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub property_id: i64,
    pub upsell_id: Option<i64>,
    pub vendor_id: Option<i64>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub amount: MoneyAmount,
    pub currency: String,
    pub status: OrderStatusType,
    pub payment_intent_id: Option<String>,
    pub order_details: OrderDetails,
}

//--------------------------------------  PaymentConfirmation -------------------------------------------------------
/// A verified payment-succeeded event, converted from the provider wire format at the server boundary.
/// This is the sole input to the order materializer.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    /// The provider's event id, used for the at-least-once delivery guard.
    pub event_id: String,
    pub payment_intent_id: String,
    pub property_id: i64,
    /// The event's total monetary amount, already in minor units.
    pub amount: MoneyAmount,
    pub currency: Option<String>,
    pub access_token: Option<String>,
    pub cart_items: Vec<CartItem>,
    pub occurred_at: DateTime<Utc>,
}

//--------------------------------------  MaterializedBatch  ---------------------------------------------------------
/// The outcome of one materializer run. `duplicate_event` is set when the provider event id had already been
/// recorded, in which case no orders were created.
#[derive(Debug, Clone, Default)]
pub struct MaterializedBatch {
    pub orders: Vec<Order>,
    pub duplicate_event: bool,
}

//-------------------------------------- ProviderAccountStatus -------------------------------------------------------
/// The subset of a provider sub-account payload that drives the derived onboarding flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderAccountStatus {
    pub id: String,
    #[serde(default)]
    pub details_submitted: bool,
    #[serde(default)]
    pub charges_enabled: bool,
    #[serde(default)]
    pub payouts_enabled: bool,
}

impl ProviderAccountStatus {
    /// Onboarding is complete only when the sub-account can actually receive funds.
    pub fn onboarding_complete(&self) -> bool {
        self.details_submitted && self.charges_enabled && self.payouts_enabled
    }
}

//--------------------------------------    GuestContact     ---------------------------------------------------------
/// Guest contact fields backfilled onto an order once check-in data becomes available.
#[derive(Debug, Clone, Default)]
pub struct GuestContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

//--------------------------------------       Upsell        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow)]
pub struct Upsell {
    pub id: i64,
    pub property_id: i64,
    pub primary_vendor_id: Option<i64>,
    pub secondary_vendor_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub price: MoneyAmount,
    pub category: Option<String>,
    pub is_active: bool,
}

//--------------------------------------       Vendor        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow)]
pub struct Vendor {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub whatsapp_number: Option<String>,
    pub phone: Option<String>,
    pub service_type: Option<String>,
    pub is_active: bool,
}

//--------------------------------------      Property       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow)]
pub struct Property {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub currency: Option<String>,
    pub access_token: Option<String>,
}

//--------------------------------------    GuestCheckIn     ---------------------------------------------------------
#[derive(Debug, Clone, FromRow)]
pub struct GuestCheckIn {
    pub id: i64,
    pub access_token: String,
    pub property_id: i64,
    pub full_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub passport_url: Option<String>,
    pub check_in_time: Option<DateTime<Utc>>,
}

//--------------------------------------        User         ---------------------------------------------------------
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub provider_account_id: Option<String>,
    pub onboarding_completed: bool,
}
