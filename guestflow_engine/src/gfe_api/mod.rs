pub mod accounts_api;
pub mod guest_api;
pub mod invoice;
pub mod order_flow_api;
