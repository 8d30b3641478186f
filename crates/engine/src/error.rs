//! The module contains the errors the engine can return.
//!
//! Every failure of a ledger operation is reported as one of these kinds and
//! the enclosing durable transaction is rolled back:
//!
//! - [`InvalidCurrency`] the currency code is outside the whitelist.
//! - [`WalletNotFound`] the wallet is absent or soft-deleted.
//! - [`AlreadyClaimed`] the transaction key was already used.
//! - [`Overdraft`] the operation would leave a negative balance.
//! - [`ConversionFailed`] no usable quote could be obtained.
//!
//!  [`InvalidCurrency`]: EngineError::InvalidCurrency
//!  [`WalletNotFound`]: EngineError::WalletNotFound
//!  [`AlreadyClaimed`]: EngineError::AlreadyClaimed
//!  [`Overdraft`]: EngineError::Overdraft
//!  [`ConversionFailed`]: EngineError::ConversionFailed
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("\"{0}\" wallet not found!")]
    WalletNotFound(String),
    #[error("Invalid wallet id: {0}")]
    InvalidWalletId(String),
    #[error("\"{0}\" email already in use!")]
    EmailNotUnique(String),
    #[error("\"{0}\" transaction key already claimed!")]
    AlreadyClaimed(String),
    #[error("Overdraft: {0}")]
    Overdraft(String),
    #[error("Currency conversion failed: {0}")]
    ConversionFailed(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Wallet changed concurrently: {0}")]
    StaleWallet(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` if repeating the same request may succeed without
    /// changing it.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConversionFailed(_) | Self::StaleWallet(_) | Self::Database(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidCurrency(a), Self::InvalidCurrency(b)) => a == b,
            (Self::WalletNotFound(a), Self::WalletNotFound(b)) => a == b,
            (Self::InvalidWalletId(a), Self::InvalidWalletId(b)) => a == b,
            (Self::EmailNotUnique(a), Self::EmailNotUnique(b)) => a == b,
            (Self::AlreadyClaimed(a), Self::AlreadyClaimed(b)) => a == b,
            (Self::Overdraft(a), Self::Overdraft(b)) => a == b,
            (Self::ConversionFailed(a), Self::ConversionFailed(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::StaleWallet(a), Self::StaleWallet(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
