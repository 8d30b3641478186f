use std::{future::Future, sync::Arc};

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::{
    CurrencyConverter, EngineError, RateSource, ResultEngine, SqlWalletStore, WalletStore,
};

mod funds;
mod wallets;

pub use wallets::WalletUpdate;

/// How many times an operation is re-planned after losing a write race.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// The ledger engine.
///
/// Holds no wallet state of its own: every operation reads through the
/// [`WalletStore`] and commits through a single store call.
pub struct Engine {
    store: Arc<dyn WalletStore>,
    converter: CurrencyConverter,
    max_retries: usize,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("converter", &self.converter)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Run `op` again while it fails with `StaleWallet`, up to `max_retries`
    /// extra attempts. Each attempt re-reads the wallets it depends on.
    async fn retry_stale<T, F, Fut>(&self, mut op: F) -> ResultEngine<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ResultEngine<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Err(EngineError::StaleWallet(id)) if attempt < self.max_retries => {
                    attempt += 1;
                    tracing::debug!(wallet_id = %id, attempt, "wallet changed concurrently, retrying");
                }
                other => return other,
            }
        }
    }

    /// Run a keyed mutation.
    ///
    /// A key that was already committed yields `AlreadyClaimed`, whatever the
    /// current wallets would make of the request. The claim inside the store
    /// transaction stays authoritative; the lookups only pick the error.
    async fn run_keyed<T, F, Fut>(&self, key: Uuid, op: F) -> ResultEngine<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ResultEngine<T>>,
    {
        self.ensure_unclaimed(key).await?;
        match self.retry_stale(op).await {
            Err(err @ (EngineError::AlreadyClaimed(_) | EngineError::Database(_))) => Err(err),
            Err(err) => {
                // The key may have been committed by a concurrent attempt.
                self.ensure_unclaimed(key).await?;
                Err(err)
            }
            ok => ok,
        }
    }

    async fn ensure_unclaimed(&self, key: Uuid) -> ResultEngine<()> {
        if self.store.is_claimed(key).await? {
            tracing::info!(%key, "transaction key replayed");
            return Err(EngineError::AlreadyClaimed(key.to_string()));
        }
        Ok(())
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    store: Option<Arc<dyn WalletStore>>,
    rate_source: Option<Arc<dyn RateSource>>,
    max_retries: usize,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            store: None,
            rate_source: None,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl EngineBuilder {
    /// Use the SeaORM store on `db`.
    pub fn database(self, db: DatabaseConnection) -> EngineBuilder {
        self.store(Arc::new(SqlWalletStore::new(db)))
    }

    /// Pass any wallet store implementation.
    pub fn store(mut self, store: Arc<dyn WalletStore>) -> EngineBuilder {
        self.store = Some(store);
        self
    }

    /// Pass the exchange-rate source used for conversions.
    pub fn rate_source(mut self, source: Arc<dyn RateSource>) -> EngineBuilder {
        self.rate_source = Some(source);
        self
    }

    /// Set how many times an operation is re-planned after losing a write race.
    pub fn max_retries(mut self, max_retries: usize) -> EngineBuilder {
        self.max_retries = max_retries;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine> {
        let store = self
            .store
            .ok_or_else(|| EngineError::InvalidInput("missing wallet store".to_string()))?;
        let rate_source = self
            .rate_source
            .ok_or_else(|| EngineError::InvalidInput("missing rate source".to_string()))?;
        Ok(Engine {
            store,
            converter: CurrencyConverter::new(rate_source),
            max_retries: self.max_retries,
        })
    }
}
