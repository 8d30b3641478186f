//! Internal helpers for input validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Parse a wallet identity and report malformed values as `InvalidWalletId`.
pub(crate) fn parse_wallet_id(value: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| EngineError::InvalidWalletId(value.to_string()))
}

/// Trim a required text field, rejecting empty values.
pub(crate) fn normalize_required(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank values count as absent.
pub(crate) fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Funds operations only move strictly positive amounts.
pub(crate) fn ensure_positive(amount: MoneyCents) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidInput(format!(
            "amount must be > 0, got {amount}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_id_is_invalid_wallet_id() {
        assert_eq!(
            parse_wallet_id("not-a-uuid"),
            Err(EngineError::InvalidWalletId("not-a-uuid".to_string()))
        );
        assert!(parse_wallet_id("6a8416ed-b8e6-4732-a591-bf55da9687e7").is_ok());
    }

    #[test]
    fn blank_optional_is_none() {
        assert_eq!(normalize_optional(Some("   ")), None);
        assert_eq!(normalize_optional(Some(" Kate ")), Some("Kate".to_string()));
        assert_eq!(normalize_optional(None), None);
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        assert!(ensure_positive(MoneyCents::ZERO).is_err());
        assert!(ensure_positive(MoneyCents::new(-1)).is_err());
        assert!(ensure_positive(MoneyCents::new(1)).is_ok());
        assert!(normalize_required("  ", "owner").is_err());
    }
}
