use serde::{Deserialize, Serialize};

/// A rendered email, ready for delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub html_body: String,
}

/// A rendered text message, ready for delivery. The address may be a bare phone number; the messaging client
/// normalizes it into the transport's address scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub to: String,
    pub body: String,
}

/// The provider's acknowledgement of a delivery. `mocked` is set when the channel was not configured and the
/// message was logged instead of sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub provider_id: Option<String>,
    pub mocked: bool,
}
