//! Exchange-rate sources.
//!
//! A [`RateSource`] answers with a [`Quote`] for an ordered currency pair. The
//! engine only ever reads the bid side (see `CurrencyConverter`).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Currency;

/// A quote for the ordered pair `from`→`to`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub timestamp: DateTime<Utc>,
    /// Concatenated pair codes, e.g. `"EURUSD"`.
    pub currencies: String,
    pub bid: Decimal,
    pub ask: Decimal,
}

#[derive(Error, Debug)]
pub enum RateError {
    #[error("no rate for {0}{1}")]
    UnknownPair(Currency, Currency),
    #[error("rate source returned status {0}")]
    Status(u16),
    #[error("unusable quote: {0}")]
    Malformed(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn quote(&self, from: Currency, to: Currency) -> Result<Quote, RateError>;
}

/// Rate source backed by the exchange-rate HTTP service.
///
/// Issues `GET {base}/api/v1/xr?from=EUR&to=USD` and decodes the JSON quote.
#[derive(Debug, Clone)]
pub struct HttpRateSource {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpRateSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RateError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| RateError::Malformed(format!("invalid base_url: {err}")))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn quote(&self, from: Currency, to: Currency) -> Result<Quote, RateError> {
        let endpoint = self
            .base_url
            .join("api/v1/xr")
            .map_err(|err| RateError::Malformed(format!("invalid base_url: {err}")))?;

        let res = self
            .http
            .get(endpoint)
            .query(&[("from", from.code()), ("to", to.code())])
            .send()
            .await?;

        let status = res.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RateError::UnknownPair(from, to));
        }
        if !status.is_success() {
            return Err(RateError::Status(status.as_u16()));
        }

        Ok(res.json::<Quote>().await?)
    }
}

/// Fixed bid/ask table used by the exchange-rate stub service and in
/// development setups without a live rate feed.
#[derive(Debug, Clone, Default)]
pub struct StaticRateSource;

impl StaticRateSource {
    /// `(bid, ask)` for a pair, `None` for identical or unknown pairs.
    pub fn rates(from: Currency, to: Currency) -> Option<(Decimal, Decimal)> {
        use Currency::{Eur, Rub, Usd};

        let (bid, ask) = match (from, to) {
            (Eur, Rub) => ((102_27, 2), (108_83, 2)),
            (Eur, Usd) => ((1_08, 2), (1_13, 2)),
            (Rub, Eur) => ((93, 4), (99, 4)),
            (Rub, Usd) => ((108, 4), (112, 4)),
            (Usd, Eur) => ((88, 2), (92, 2)),
            (Usd, Rub) => ((93_04, 2), (99_36, 2)),
            _ => return None,
        };
        Some((Decimal::new(bid.0, bid.1), Decimal::new(ask.0, ask.1)))
    }
}

#[async_trait]
impl RateSource for StaticRateSource {
    async fn quote(&self, from: Currency, to: Currency) -> Result<Quote, RateError> {
        let (bid, ask) = Self::rates(from, to).ok_or(RateError::UnknownPair(from, to))?;
        Ok(Quote {
            timestamp: Utc::now(),
            currencies: format!("{}{}", from.code(), to.code()),
            bid,
            ask,
        })
    }
}
