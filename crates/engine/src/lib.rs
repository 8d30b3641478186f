//! Multi-currency wallet ledger.
//!
//! Wallets hold a single balance in one currency. Funds can be deposited,
//! withdrawn and transferred between wallets; amounts in a foreign currency are
//! converted through a [`RateSource`]. Every mutation is guarded by a
//! caller-supplied transaction key and leaves an append-only history entry.

pub use converter::CurrencyConverter;
pub use currency::{Currency, validate as validate_currency};
pub use error::EngineError;
pub use history::{HistoryEntry, Operation};
pub use money::MoneyCents;
pub use ops::{DEFAULT_MAX_RETRIES, Engine, EngineBuilder, WalletUpdate};
pub use rates::{HttpRateSource, Quote, RateError, RateSource, StaticRateSource};
pub use store::{
    BalanceChange, DEFAULT_PAGE_SIZE, HistoryParams, ListParams, SqlWalletStore, WalletStore,
};
pub use wallets::{Wallet, WalletStatus};

mod converter;
mod currency;
mod error;
mod history;
mod idempotency;
mod money;
mod ops;
mod rates;
mod store;
mod util;
mod wallets;

pub type ResultEngine<T> = Result<T, EngineError>;
