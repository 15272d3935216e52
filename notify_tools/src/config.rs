use gf_common::{helpers::parse_boolean_flag, Secret};
use log::*;

const DEFAULT_EMAIL_BASE_URL: &str = "https://api.sendgrid.com";
const DEFAULT_MESSAGING_BASE_URL: &str = "https://api.twilio.com";
// The provider's shared WhatsApp sandbox sender.
const DEFAULT_WHATSAPP_FROM: &str = "whatsapp:+14155238886";

#[derive(Debug, Clone, Default)]
pub struct EmailConfig {
    pub api_key: Secret<String>,
    pub from_email: String,
    pub from_name: String,
    pub base_url: String,
    /// Skip TLS certificate validation on provider calls. For local development against self-signed proxies only.
    pub accept_invalid_certs: bool,
}

impl EmailConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_key = Secret::new(std::env::var("GF_SENDGRID_API_KEY").unwrap_or_else(|_| {
            warn!("GF_SENDGRID_API_KEY not set. Guest and vendor emails will not be delivered.");
            String::new()
        }));
        let from_email = std::env::var("GF_EMAIL_FROM").unwrap_or_else(|_| {
            warn!("GF_EMAIL_FROM not set, using noreply@guestflow.app as default");
            "noreply@guestflow.app".to_string()
        });
        let from_name =
            std::env::var("GF_EMAIL_FROM_NAME").unwrap_or_else(|_| "Guestflow".to_string());
        let base_url = std::env::var("GF_EMAIL_BASE_URL").unwrap_or_else(|_| DEFAULT_EMAIL_BASE_URL.to_string());
        let accept_invalid_certs = accept_invalid_certs_flag();
        Self { api_key, from_email, from_name, base_url, accept_invalid_certs }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MessagingConfig {
    pub account_sid: String,
    pub auth_token: Secret<String>,
    pub whatsapp_from: String,
    pub base_url: String,
    /// Skip TLS certificate validation on provider calls. For local development against self-signed proxies only.
    pub accept_invalid_certs: bool,
}

fn accept_invalid_certs_flag() -> bool {
    let flag = parse_boolean_flag(std::env::var("GF_NOTIFY_ACCEPT_INVALID_CERTS").ok(), false);
    if flag {
        warn!("TLS certificate validation for notification providers is DISABLED. Never run like this in production.");
    }
    flag
}

impl MessagingConfig {
    pub fn new_from_env_or_default() -> Self {
        let account_sid = std::env::var("GF_TWILIO_ACCOUNT_SID").unwrap_or_else(|_| {
            warn!("GF_TWILIO_ACCOUNT_SID not set. WhatsApp messages will be logged instead of sent.");
            String::new()
        });
        let auth_token = Secret::new(std::env::var("GF_TWILIO_AUTH_TOKEN").unwrap_or_default());
        let whatsapp_from = std::env::var("GF_TWILIO_WHATSAPP_FROM").unwrap_or_else(|_| {
            warn!("GF_TWILIO_WHATSAPP_FROM not set, using the sandbox sender as default");
            DEFAULT_WHATSAPP_FROM.to_string()
        });
        let base_url =
            std::env::var("GF_MESSAGING_BASE_URL").unwrap_or_else(|_| DEFAULT_MESSAGING_BASE_URL.to_string());
        let accept_invalid_certs = accept_invalid_certs_flag();
        Self { account_sid, auth_token, whatsapp_from, base_url, accept_invalid_certs }
    }

    pub fn is_configured(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty()
    }
}
