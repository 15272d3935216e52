//! # Guestflow server
//! This module hosts the webhook server for the Guestflow payment pipeline. It is responsible for:
//! Listening for incoming webhook requests from the payment provider.
//! Verifying the payload signature and parsing the event envelope.
//! Handing verified payment confirmations to the order materializer, and fanning out order notifications.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/webhook/payments`: The webhook route for receiving signed payment and account events.
//! * `/webhook/messaging_status`: A sink for messaging delivery-status callbacks.
//! * `/api/orders/{id}/status`: Explicit order lifecycle transitions.

pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod notifications;
pub mod payment_events;
pub mod payment_routes;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
