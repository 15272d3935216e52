use std::env;

use gf_common::{helpers::parse_boolean_flag, Secret};
use log::*;
use notify_tools::{EmailConfig, MessagingConfig};

const DEFAULT_GF_HOST: &str = "127.0.0.1";
const DEFAULT_GF_PORT: u16 = 8380;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The shared secret the payment provider signs webhook payloads with.
    pub webhook_secret: Secret<String>,
    /// If false, webhook signature checks are skipped entirely. Only ever disable this in development.
    pub signature_checks: bool,
    pub email: EmailConfig,
    pub messaging: MessagingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_GF_HOST.to_string(),
            port: DEFAULT_GF_PORT,
            database_url: String::default(),
            webhook_secret: Secret::default(),
            signature_checks: true,
            email: EmailConfig::default(),
            messaging: MessagingConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("GF_HOST").ok().unwrap_or_else(|| DEFAULT_GF_HOST.into());
        let port = env::var("GF_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for GF_PORT. {e} Using the default, {DEFAULT_GF_PORT}, instead.");
                    DEFAULT_GF_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_GF_PORT);
        let database_url = env::var("GF_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ GF_DATABASE_URL is not set. Please set it to the URL for the Guestflow database.");
            String::default()
        });
        let webhook_secret = Secret::new(env::var("GF_WEBHOOK_SECRET").unwrap_or_else(|_| {
            error!("🪛️ GF_WEBHOOK_SECRET is not set. Webhook signatures cannot be verified without it.");
            String::default()
        }));
        let signature_checks = parse_boolean_flag(env::var("GF_WEBHOOK_SIGNATURE_CHECKS").ok(), true);
        if !signature_checks {
            warn!("🪛️ Webhook signature checks are DISABLED. Do not run like this in production.");
        }
        let email = EmailConfig::new_from_env_or_default();
        let messaging = MessagingConfig::new_from_env_or_default();
        Self { host, port, database_url, webhook_secret, signature_checks, email, messaging }
    }
}
