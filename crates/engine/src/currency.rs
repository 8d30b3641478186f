use crate::EngineError;

/// ISO-like currency code a wallet is denominated in.
///
/// The whitelist is closed: any code outside it is rejected with
/// [`EngineError::InvalidCurrency`].
///
/// ## Minor units
///
/// Balances are stored as an `i64` number of **minor units** (see `MoneyCents`).
/// Every supported currency uses 2 fraction digits, so `10.50 EUR` ⇄ `1050`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Currency {
    Eur,
    Rub,
    Usd,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Eur, Currency::Rub, Currency::Usd];

    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Rub => "RUB",
            Currency::Usd => "USD",
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        validate(value)
    }
}

/// Check `code` against the whitelist.
///
/// The match is exact: `"eur"` or `" EUR"` are not accepted.
pub fn validate(code: &str) -> Result<Currency, EngineError> {
    Currency::ALL
        .into_iter()
        .find(|currency| currency.code() == code)
        .ok_or_else(|| EngineError::InvalidCurrency(code.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_whitelisted_codes() {
        assert_eq!(validate("EUR"), Ok(Currency::Eur));
        assert_eq!(validate("RUB"), Ok(Currency::Rub));
        assert_eq!(validate("USD"), Ok(Currency::Usd));
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(
            validate("XYZ"),
            Err(EngineError::InvalidCurrency("XYZ".to_string()))
        );
        assert!(validate("").is_err());
        assert!(validate("eur").is_err());
        assert!(validate(" USD").is_err());
    }

    #[test]
    fn display_uses_code() {
        assert_eq!(Currency::Rub.to_string(), "RUB");
    }
}
