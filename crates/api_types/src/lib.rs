//! JSON shapes of the wallet HTTP API.
//!
//! Field names are camelCase on the wire. Money amounts are decimals in major
//! units (`"12.34"` is twelve euros and thirty-four cents).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod wallet {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WalletNew {
        pub transaction_key: Uuid,
        pub owner: String,
        pub email: String,
        pub currency: String,
    }

    /// Partial update: absent or blank fields keep their value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WalletUpdate {
        /// Optional key making a retried update safe.
        pub transaction_key: Option<Uuid>,
        pub owner: Option<String>,
        pub email: Option<String>,
        pub currency: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WalletView {
        pub wallet_id: Uuid,
        pub email: String,
        pub owner: String,
        pub currency: String,
        pub balance: Decimal,
        pub created: DateTime<Utc>,
        pub updated: DateTime<Utc>,
    }

    /// Query string of `GET /api/v1/wallets`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WalletList {
        pub text_filter: Option<String>,
        /// `0` or absent means the default page size.
        pub items_per_page: Option<u64>,
        pub offset: Option<u64>,
        pub sorting: Option<String>,
        pub descending: Option<bool>,
    }
}

pub mod history {
    use super::*;

    /// Query string of `GET /api/v1/wallet/{id}/history`.
    ///
    /// Period bounds use the `YYYY-MM-DDTHH:MM:SS` layout, read as UTC.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct HistoryList {
        pub period_start: Option<String>,
        pub period_end: Option<String>,
        pub text_filter: Option<String>,
        pub items_per_page: Option<u64>,
        pub offset: Option<u64>,
        pub sorting: Option<String>,
        pub descending: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct HistoryView {
        pub wallet_id: Uuid,
        pub email: String,
        pub owner: String,
        pub currency: String,
        pub balance: Decimal,
        pub created: DateTime<Utc>,
        pub operation: String,
    }
}

pub mod funds {
    use super::*;

    /// Body of deposit, withdraw and transfer requests.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FundsOperation {
        pub transaction_key: Uuid,
        pub currency: String,
        /// Must be > 0, at most two decimals.
        pub amount: Decimal,
    }
}

pub mod rates {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct QuoteQuery {
        pub from: String,
        pub to: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct QuoteView {
        pub timestamp: DateTime<Utc>,
        pub currencies: String,
        pub bid: Decimal,
        pub ask: Decimal,
    }
}
