use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyApiError {
    #[error("The channel is not configured: {0}")]
    NotConfigured(String),
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach the provider: {0}")]
    TransportError(String),
    #[error("Delivery rejected. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}
