use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::{Currency, EngineError, MoneyCents, RateSource, ResultEngine};

/// Converts amounts between currencies using the bid side of a live quote.
///
/// The product `amount * bid` is rounded once, to whole cents, half away from
/// zero. Intermediate values are never rounded.
#[derive(Clone)]
pub struct CurrencyConverter {
    source: Arc<dyn RateSource>,
}

impl std::fmt::Debug for CurrencyConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrencyConverter").finish_non_exhaustive()
    }
}

impl CurrencyConverter {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self { source }
    }

    /// Convert `amount` from `from` into `to`.
    ///
    /// Identical currencies return `amount` untouched without a quote.
    #[tracing::instrument(skip(self))]
    pub async fn convert(
        &self,
        amount: MoneyCents,
        from: Currency,
        to: Currency,
    ) -> ResultEngine<MoneyCents> {
        if from == to {
            return Ok(amount);
        }

        let quote = self.source.quote(from, to).await.map_err(|err| {
            tracing::warn!("quote {from}{to} failed: {err}");
            EngineError::ConversionFailed(err.to_string())
        })?;

        if quote.bid <= Decimal::ZERO {
            return Err(EngineError::ConversionFailed(format!(
                "non-positive bid {} for {from}{to}",
                quote.bid
            )));
        }

        apply_bid(amount, quote.bid)
    }
}

/// `amount * bid` rounded to cents.
pub(crate) fn apply_bid(amount: MoneyCents, bid: Decimal) -> ResultEngine<MoneyCents> {
    Decimal::from(amount.cents())
        .checked_mul(bid)
        .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|cents| cents.to_i64())
        .map(MoneyCents::new)
        .ok_or_else(|| EngineError::ConversionFailed("converted amount overflows".to_string()))
}
