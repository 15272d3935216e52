use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Sub},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

pub const DEFAULT_CURRENCY_CODE: &str = "USD";

//--------------------------------------     MoneyAmount     ---------------------------------------------------------
/// A monetary amount in minor units (cents). All order, invoice and payment arithmetic is integer arithmetic;
/// floating point only appears at the provider boundary, where amounts are converted exactly once.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct MoneyAmount(i64);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a monetary amount: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for MoneyAmount {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for MoneyAmount {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for MoneyAmount {}

impl TryFrom<u64> for MoneyAmount {
    type Error = MoneyConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MoneyConversionError(format!("Value {} is too large to convert to MoneyAmount", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Add for MoneyAmount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for MoneyAmount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<i64> for MoneyAmount {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for MoneyAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl Display for MoneyAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", cents / 100, cents % 100)
    }
}

impl MoneyAmount {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Converts a major-unit amount (e.g. "100.50" dollars) to minor units, rounding to the nearest cent.
    /// Provider metadata carries prices in major units; everything downstream uses minor units.
    pub fn from_major_units_f64(value: f64) -> Self {
        Self((value * 100.0).round() as i64)
    }

    /// Applies a percentage expressed in whole points (e.g. 21 for 21%), rounding to the nearest cent.
    pub fn percentage(&self, points: i64) -> Self {
        let v = self.0 * points;
        Self((v + v.signum() * 50) / 100)
    }
}
