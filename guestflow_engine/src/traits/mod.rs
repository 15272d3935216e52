//! The behaviour contracts that a storage backend must fulfil to drive the Guestflow payment pipeline.
//!
//! The server and API layers only ever talk to these traits, so a backend can be swapped (or mocked in tests)
//! without touching the order flow logic.

mod account_management;
mod catalog_management;
mod payment_gateway_database;

pub use account_management::{AccountApiError, AccountManagement};
pub use catalog_management::{CatalogApiError, CatalogManagement};
pub use payment_gateway_database::{PaymentGatewayDatabase, PaymentGatewayError};
