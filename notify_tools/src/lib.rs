//! Thin delivery clients for the two notification transports Guestflow uses: transactional email and WhatsApp
//! messages. The [`EmailChannel`] and [`MessageChannel`] traits are the seams the notification dispatcher is
//! generic over, so both transports can be mocked in tests.
mod config;
mod data_objects;
mod email;
mod error;
mod messaging;

pub use config::{EmailConfig, MessagingConfig};
pub use data_objects::{DeliveryReceipt, OutboundEmail, OutboundMessage};
pub use email::EmailApi;
pub use error::NotifyApiError;
pub use messaging::{normalize_whatsapp_address, MessagingApi};

/// A transport that can deliver a rendered email.
#[allow(async_fn_in_trait)]
pub trait EmailChannel: Clone {
    async fn send_email(&self, email: OutboundEmail) -> Result<DeliveryReceipt, NotifyApiError>;
}

/// A transport that can deliver a short text message.
#[allow(async_fn_in_trait)]
pub trait MessageChannel: Clone {
    async fn send_message(&self, message: OutboundMessage) -> Result<DeliveryReceipt, NotifyApiError>;
}
