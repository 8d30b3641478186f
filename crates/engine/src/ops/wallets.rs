use chrono::Utc;
use uuid::Uuid;

use crate::{
    HistoryEntry, HistoryParams, ListParams, ResultEngine, Wallet, currency,
    util::{normalize_optional, normalize_required, parse_wallet_id},
};

use super::Engine;

/// Requested changes to a wallet. Blank or missing fields keep their current
/// value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalletUpdate {
    /// Optional transaction key; when present the update is applied at most
    /// once, like any funds operation.
    pub transaction_key: Option<Uuid>,
    pub owner: Option<String>,
    pub email: Option<String>,
    pub currency: Option<String>,
}

impl Engine {
    /// Create a wallet with a zero balance.
    #[tracing::instrument(skip(self))]
    pub async fn create_wallet(
        &self,
        transaction_key: Uuid,
        owner: &str,
        email: &str,
        currency: &str,
    ) -> ResultEngine<Wallet> {
        let currency = currency::validate(currency)?;
        let owner = normalize_required(owner, "owner")?;
        let email = normalize_required(email, "email")?;

        let wallet = Wallet::new(owner, email, currency);
        let created = self.store.create_wallet(transaction_key, &wallet).await?;
        tracing::info!(wallet_id = %created.id, "wallet created");
        Ok(created)
    }

    /// Return an active wallet.
    pub async fn wallet(&self, wallet_id: &str) -> ResultEngine<Wallet> {
        let id = parse_wallet_id(wallet_id)?;
        self.store.get_wallet(id).await
    }

    /// Update owner/email/currency of a wallet.
    ///
    /// A currency change re-denominates the current balance through the
    /// converter in the same write.
    #[tracing::instrument(skip(self, update))]
    pub async fn update_wallet(
        &self,
        wallet_id: &str,
        update: WalletUpdate,
    ) -> ResultEngine<Wallet> {
        let id = parse_wallet_id(wallet_id)?;
        let target_currency = normalize_optional(update.currency.as_deref())
            .map(|code| currency::validate(&code))
            .transpose()?;
        let owner = normalize_optional(update.owner.as_deref());
        let email = normalize_optional(update.email.as_deref());
        let transaction_key = update.transaction_key;

        let plan = || async {
            let current = self.store.get_wallet(id).await?;
            let currency = target_currency.unwrap_or(current.currency);
            let balance = self
                .converter
                .convert(current.balance, current.currency, currency)
                .await?;

            let updated = Wallet {
                owner: owner.clone().unwrap_or_else(|| current.owner.clone()),
                email: email.clone().unwrap_or_else(|| current.email.clone()),
                currency,
                balance,
                updated_at: Utc::now(),
                ..current.clone()
            };
            self.store
                .update_wallet(transaction_key, &current, &updated)
                .await
        };
        match transaction_key {
            Some(key) => self.run_keyed(key, plan).await,
            None => self.retry_stale(plan).await,
        }
    }

    /// Soft delete a wallet.
    #[tracing::instrument(skip(self))]
    pub async fn delete_wallet(&self, wallet_id: &str) -> ResultEngine<()> {
        let id = parse_wallet_id(wallet_id)?;
        self.store.delete_wallet(id).await?;
        tracing::info!(%id, "wallet deleted");
        Ok(())
    }

    /// List active wallets.
    pub async fn wallets(&self, params: &ListParams) -> ResultEngine<Vec<Wallet>> {
        self.store.get_wallets_list(params).await
    }

    /// List the history of a wallet, including a deleted one.
    pub async fn wallet_history(
        &self,
        wallet_id: &str,
        params: &HistoryParams,
    ) -> ResultEngine<Vec<HistoryEntry>> {
        let id = parse_wallet_id(wallet_id)?;
        self.store.get_wallet_history(id, params).await
    }
}
