use std::fmt;

use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::EngineError;

/// Signed money amount represented as **integer cents**.
///
/// Use this type for **all** balances and operation amounts to avoid
/// floating-point drift. The currency is carried next to the amount, never
/// inside it.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Request amounts arrive as major-unit decimals and are rejected when they
/// carry more than 2 decimals:
///
/// ```rust
/// use engine::MoneyCents;
/// use rust_decimal::Decimal;
///
/// assert_eq!(MoneyCents::try_from(Decimal::new(105, 1)).unwrap().cents(), 1050);
/// assert!(MoneyCents::try_from(Decimal::new(12_345, 3)).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }

    /// Major-unit decimal value, e.g. `1050` cents → `10.50`.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl TryFrom<Decimal> for MoneyCents {
    type Error = EngineError;

    /// Converts a major-unit decimal into cents.
    ///
    /// Values with more than 2 significant fraction digits are rejected, the
    /// caller decides how to round.
    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        let scaled = value.normalize();
        if scaled.scale() > 2 {
            return Err(EngineError::InvalidInput("too many decimals".to_string()));
        }
        (scaled * Decimal::ONE_HUNDRED)
            .to_i64()
            .map(MoneyCents)
            .ok_or_else(|| EngineError::InvalidInput("amount too large".to_string()))
    }
}
