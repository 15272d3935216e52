use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde_json::json;

use crate::{DeliveryReceipt, EmailChannel, EmailConfig, NotifyApiError, OutboundEmail};

/// Upper bound on a single provider call. Notification dispatch runs inside the webhook request, so a hung
/// provider must not hold the handler open.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A transactional email client speaking the SendGrid v3 mail-send API.
#[derive(Clone)]
pub struct EmailApi {
    config: EmailConfig,
    client: Arc<Client>,
}

impl EmailApi {
    pub fn new(config: EmailConfig) -> Result<Self, NotifyApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.api_key.reveal());
        let mut val =
            HeaderValue::from_str(bearer.as_str()).map_err(|e| NotifyApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| NotifyApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    fn url(&self) -> String {
        format!("{}/v3/mail/send", self.config.base_url)
    }
}

impl EmailChannel for EmailApi {
    async fn send_email(&self, email: OutboundEmail) -> Result<DeliveryReceipt, NotifyApiError> {
        if !self.config.is_configured() {
            return Err(NotifyApiError::NotConfigured("no email API key is set".to_string()));
        }
        let mut to = json!({ "email": email.to });
        if let Some(name) = &email.to_name {
            to["name"] = json!(name);
        }
        let body = json!({
            "personalizations": [{ "to": [to] }],
            "from": { "email": self.config.from_email, "name": self.config.from_name },
            "subject": email.subject,
            "content": [{ "type": "text/html", "value": email.html_body }],
        });
        trace!("Sending email '{}' to {}", email.subject, email.to);
        let response = self
            .client
            .post(self.url())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyApiError::TransportError(e.to_string()))?;
        if response.status().is_success() {
            let provider_id =
                response.headers().get("X-Message-Id").and_then(|v| v.to_str().ok()).map(String::from);
            debug!("Email '{}' accepted for delivery to {}", email.subject, email.to);
            Ok(DeliveryReceipt { provider_id, mocked: false })
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| NotifyApiError::TransportError(e.to_string()))?;
            Err(NotifyApiError::QueryError { status, message })
        }
    }
}
