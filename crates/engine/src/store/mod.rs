//! Persistence boundary of the ledger.
//!
//! The engine only talks to a [`WalletStore`]. Every mutating method runs in a
//! single durable transaction that claims the transaction key (when one is
//! given), writes the wallet row(s) and appends history; any failure rolls the
//! whole transaction back.
//!
//! Wallet writes are compare-and-set: a write only applies when the stored row
//! still has the owner, email, balance and currency of the `current` snapshot
//! the engine computed from. Otherwise the store returns [`EngineError::StaleWallet`] and
//! nothing is committed.
//!
//! [`EngineError::StaleWallet`]: crate::EngineError::StaleWallet

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{HistoryEntry, MoneyCents, Operation, ResultEngine, Wallet};

mod sql;

pub use sql::SqlWalletStore;

/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Filtering, sorting and paging of a listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListParams {
    /// Case-insensitive substring matched against owner and currency.
    pub text_filter: Option<String>,
    /// `0` disables the limit.
    pub items_per_page: u64,
    pub offset: u64,
    /// Sort column; unknown names fall back to creation time.
    pub sorting: Option<String>,
    pub descending: bool,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            text_filter: None,
            items_per_page: DEFAULT_PAGE_SIZE,
            offset: 0,
            sorting: None,
            descending: false,
        }
    }
}

/// History listing: a listing restricted to a creation-time window.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryParams {
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    pub list: ListParams,
}

/// New balance for one wallet, computed from the `current` snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceChange {
    pub current: Wallet,
    pub balance: MoneyCents,
    pub operation: Operation,
}

impl BalanceChange {
    /// The wallet as it will be committed.
    pub(crate) fn next(&self, now: DateTime<Utc>) -> Wallet {
        Wallet {
            balance: self.balance,
            updated_at: now,
            ..self.current.clone()
        }
    }
}

#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Claim `key`, insert `wallet` and append its `create` history entry.
    async fn create_wallet(&self, key: Uuid, wallet: &Wallet) -> ResultEngine<Wallet>;

    /// Whether `key` was claimed by a committed mutation.
    async fn is_claimed(&self, key: Uuid) -> ResultEngine<bool>;

    /// Active wallet by id.
    async fn get_wallet(&self, id: Uuid) -> ResultEngine<Wallet>;

    async fn get_wallets_list(&self, params: &ListParams) -> ResultEngine<Vec<Wallet>>;

    async fn get_wallet_history(
        &self,
        id: Uuid,
        params: &HistoryParams,
    ) -> ResultEngine<Vec<HistoryEntry>>;

    /// Replace owner, email, currency and balance of `current` with the values
    /// of `updated`, claiming `key` first when given.
    async fn update_wallet(
        &self,
        key: Option<Uuid>,
        current: &Wallet,
        updated: &Wallet,
    ) -> ResultEngine<Wallet>;

    /// Soft delete an active wallet.
    async fn delete_wallet(&self, id: Uuid) -> ResultEngine<()>;

    /// Single-wallet balance overwrite guarded by `key`.
    async fn manage_balance(&self, key: Uuid, change: &BalanceChange) -> ResultEngine<Wallet>;

    /// Two-wallet balance overwrite guarded by one `key`. Returns the
    /// destination wallet.
    async fn transfer_funds(
        &self,
        key: Uuid,
        src: &BalanceChange,
        dst: &BalanceChange,
    ) -> ResultEngine<Wallet>;
}
