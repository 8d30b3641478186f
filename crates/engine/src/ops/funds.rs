//! Funds operations: deposit, withdraw and two-wallet transfer.
//!
//! Each operation first rejects an already used transaction key, then plans the
//! new balance(s) from a fresh read, converting the requested amount into the
//! wallet currency when needed, and commits through one store call that also
//! claims the key. Overdraft is checked before anything is written.

use uuid::Uuid;

use crate::{
    BalanceChange, Currency, EngineError, MoneyCents, Operation, ResultEngine, Wallet, currency,
    util::{ensure_positive, parse_wallet_id},
};

use super::Engine;

impl Engine {
    /// Amount of `wallet` currency that `amount` of `currency` is worth.
    async fn amount_in_wallet_currency(
        &self,
        wallet: &Wallet,
        currency: Currency,
        amount: MoneyCents,
    ) -> ResultEngine<MoneyCents> {
        self.converter
            .convert(amount, currency, wallet.currency)
            .await
    }

    async fn credit(
        &self,
        wallet: Wallet,
        currency: Currency,
        amount: MoneyCents,
        operation: Operation,
    ) -> ResultEngine<BalanceChange> {
        let converted = self
            .amount_in_wallet_currency(&wallet, currency, amount)
            .await?;
        let balance = wallet
            .balance
            .checked_add(converted)
            .ok_or_else(|| EngineError::InvalidInput("balance overflow".to_string()))?;
        Ok(BalanceChange {
            current: wallet,
            balance,
            operation,
        })
    }

    async fn debit(
        &self,
        wallet: Wallet,
        currency: Currency,
        amount: MoneyCents,
        operation: Operation,
    ) -> ResultEngine<BalanceChange> {
        let converted = self
            .amount_in_wallet_currency(&wallet, currency, amount)
            .await?;
        let balance = wallet
            .balance
            .checked_sub(converted)
            .ok_or_else(|| EngineError::InvalidInput("balance overflow".to_string()))?;
        if balance.is_negative() {
            return Err(EngineError::Overdraft(format!(
                "wallet {} holds {} {}, requested {} {}",
                wallet.id, wallet.balance, wallet.currency, converted, wallet.currency
            )));
        }
        Ok(BalanceChange {
            current: wallet,
            balance,
            operation,
        })
    }

    /// Add `amount` of `currency` to a wallet.
    #[tracing::instrument(skip(self))]
    pub async fn deposit(
        &self,
        transaction_key: Uuid,
        wallet_id: &str,
        currency: &str,
        amount: MoneyCents,
    ) -> ResultEngine<Wallet> {
        ensure_positive(amount)?;
        let currency = currency::validate(currency)?;
        let id = parse_wallet_id(wallet_id)?;

        self.run_keyed(transaction_key, || async {
            let wallet = self.store.get_wallet(id).await?;
            let change = self
                .credit(wallet, currency, amount, Operation::Deposit)
                .await?;
            self.store.manage_balance(transaction_key, &change).await
        })
        .await
    }

    /// Take `amount` of `currency` from a wallet. Fails with `Overdraft` if the
    /// balance would go below zero.
    #[tracing::instrument(skip(self))]
    pub async fn withdraw(
        &self,
        transaction_key: Uuid,
        wallet_id: &str,
        currency: &str,
        amount: MoneyCents,
    ) -> ResultEngine<Wallet> {
        ensure_positive(amount)?;
        let currency = currency::validate(currency)?;
        let id = parse_wallet_id(wallet_id)?;

        self.run_keyed(transaction_key, || async {
            let wallet = self.store.get_wallet(id).await?;
            let change = self
                .debit(wallet, currency, amount, Operation::Withdraw)
                .await?;
            self.store.manage_balance(transaction_key, &change).await
        })
        .await
    }

    /// Move `amount` of `currency` from `src_id` to `dst_id`.
    ///
    /// Each leg is converted independently into its wallet currency. Both
    /// legs commit together or not at all. Returns the destination wallet.
    #[tracing::instrument(skip(self))]
    pub async fn transfer(
        &self,
        transaction_key: Uuid,
        src_id: &str,
        dst_id: &str,
        currency: &str,
        amount: MoneyCents,
    ) -> ResultEngine<Wallet> {
        ensure_positive(amount)?;
        let currency = currency::validate(currency)?;
        let src_id = parse_wallet_id(src_id)?;
        let dst_id = parse_wallet_id(dst_id)?;
        if src_id == dst_id {
            return Err(EngineError::InvalidInput(
                "source and destination wallets must differ".to_string(),
            ));
        }

        self.run_keyed(transaction_key, || async {
            let src = self.store.get_wallet(src_id).await?;
            let src_change = self
                .debit(src, currency, amount, Operation::TransferOut)
                .await?;
            let dst = self.store.get_wallet(dst_id).await?;
            let dst_change = self
                .credit(dst, currency, amount, Operation::TransferIn)
                .await?;
            self.store
                .transfer_funds(transaction_key, &src_change, &dst_change)
                .await
        })
        .await
    }
}
