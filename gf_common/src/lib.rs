mod money;
mod secret;

pub mod helpers;

pub use money::{MoneyAmount, MoneyConversionError, DEFAULT_CURRENCY_CODE};
pub use secret::Secret;
