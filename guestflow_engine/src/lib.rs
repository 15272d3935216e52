//! Guestflow Payment Engine
//!
//! The Guestflow payment engine turns verified payment-provider webhook events into persisted guest orders and
//! drives everything that follows from them. It is provider-agnostic and server-agnostic.
//!
//! The library is divided into two main sections:
//! 1. Database management ([`mod@sqlite`]). SQLite is the only supported backend at present. You should never
//!    need to access the database directly; use the public APIs instead. The exception is the data types used in
//!    the database, which are defined in the [`mod@db_types`] module and are public.
//! 2. The engine public API ([`OrderFlowApi`], [`GuestApi`], [`AccountApi`] and the [`mod@invoice`] module).
//!    These provide the public-facing functionality: materializing orders from payment confirmations, managing
//!    order lifecycles, resolving guest identities, deriving invoices and tracking provider sub-accounts.
//!    Backends implement the traits in [`mod@traits`] to plug into these APIs.
pub mod db_types;
mod gfe_api;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use gfe_api::{
    accounts_api::AccountApi,
    guest_api::{GuestApi, GuestInfo},
    invoice,
    order_flow_api::OrderFlowApi,
};
