use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::Client;
use serde::Deserialize;

use crate::{DeliveryReceipt, MessageChannel, MessagingConfig, NotifyApiError, OutboundMessage};

/// A WhatsApp message client speaking the Twilio Messages API.
///
/// When no account credentials are configured, deliveries degrade to log lines and report success. A missing
/// messaging provider should never make order processing look broken in development environments.
#[derive(Clone)]
pub struct MessagingApi {
    config: MessagingConfig,
    client: Arc<Client>,
}

/// Converts a phone number into the transport's WhatsApp address scheme. Addresses already carrying the scheme
/// pass through untouched; a leading "+" on bare numbers is dropped.
pub fn normalize_whatsapp_address(phone: &str) -> String {
    if phone.starts_with("whatsapp:") {
        phone.to_string()
    } else {
        format!("whatsapp:{}", phone.trim_start_matches('+'))
    }
}

/// Upper bound on a single provider call. Notification dispatch runs inside the webhook request, so a hung
/// provider must not hold the handler open.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

impl MessagingApi {
    pub fn new(config: MessagingConfig) -> Result<Self, NotifyApiError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| NotifyApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    fn url(&self) -> String {
        format!("{}/2010-04-01/Accounts/{}/Messages.json", self.config.base_url, self.config.account_sid)
    }
}

impl MessageChannel for MessagingApi {
    async fn send_message(&self, message: OutboundMessage) -> Result<DeliveryReceipt, NotifyApiError> {
        let to = normalize_whatsapp_address(&message.to);
        if !self.config.is_configured() {
            info!("📱️ [MOCK] WhatsApp to {to}: {}", message.body);
            return Ok(DeliveryReceipt { provider_id: None, mocked: true });
        }
        #[derive(Deserialize)]
        struct MessageResponse {
            sid: String,
        }
        let form = [("From", self.config.whatsapp_from.as_str()), ("To", to.as_str()), ("Body", message.body.as_str())];
        trace!("Sending WhatsApp message to {to}");
        let response = self
            .client
            .post(self.url())
            .basic_auth(&self.config.account_sid, Some(self.config.auth_token.reveal()))
            .form(&form)
            .send()
            .await
            .map_err(|e| NotifyApiError::TransportError(e.to_string()))?;
        if response.status().is_success() {
            let result =
                response.json::<MessageResponse>().await.map_err(|e| NotifyApiError::TransportError(e.to_string()))?;
            debug!("📱️ WhatsApp message {} accepted for delivery to {to}", result.sid);
            Ok(DeliveryReceipt { provider_id: Some(result.sid), mocked: false })
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| NotifyApiError::TransportError(e.to_string()))?;
            Err(NotifyApiError::QueryError { status, message })
        }
    }
}

#[cfg(test)]
mod test {
    use super::{normalize_whatsapp_address, MessagingApi};
    use crate::MessagingConfig;

    #[test]
    fn client_builds_with_the_call_timeout() {
        assert!(MessagingApi::new(MessagingConfig::default()).is_ok());
    }

    #[test]
    fn scheme_qualified_addresses_pass_through() {
        assert_eq!(normalize_whatsapp_address("whatsapp:+34666000111"), "whatsapp:+34666000111");
    }

    #[test]
    fn bare_numbers_lose_the_plus_and_gain_the_scheme() {
        assert_eq!(normalize_whatsapp_address("+34666000111"), "whatsapp:34666000111");
        assert_eq!(normalize_whatsapp_address("34666000111"), "whatsapp:34666000111");
    }
}
