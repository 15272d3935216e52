use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use guestflow_engine::traits::{AccountApiError, PaymentGatewayError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Webhook signature invalid or not provided")]
    InvalidSignature,
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The requested change is not allowed. {0}")]
    ForbiddenChange(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidSignature => StatusCode::FORBIDDEN,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::ForbiddenChange(_) => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<PaymentGatewayError> for ServerError {
    fn from(e: PaymentGatewayError) -> Self {
        match e {
            PaymentGatewayError::OrderIdNotFound(id) => Self::NoRecordFound(format!("Order {id} does not exist")),
            PaymentGatewayError::OrderModificationNoOp | PaymentGatewayError::OrderModificationForbidden => {
                Self::ForbiddenChange(e.to_string())
            },
            PaymentGatewayError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            e => Self::BackendError(e.to_string()),
        }
    }
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        match e {
            AccountApiError::UserNotFound(id) => Self::NoRecordFound(format!("User {id} does not exist")),
            AccountApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}
