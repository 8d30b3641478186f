//! Deposit, withdraw and transfer endpoints.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use engine::MoneyCents;

use crate::{
    ServerError,
    server::ServerState,
    types::{funds::FundsOperation, wallet::WalletView},
    wallets::wallet_view,
};

/// Amount of the request in cents. Non-positive amounts and amounts with more
/// than two decimals are rejected as unprocessable.
fn amount(payload: &FundsOperation) -> Result<MoneyCents, ServerError> {
    let amount = MoneyCents::try_from(payload.amount)?;
    if !amount.is_positive() {
        return Err(engine::EngineError::InvalidInput(format!(
            "amount must be > 0, got {}",
            payload.amount
        ))
        .into());
    }
    Ok(amount)
}

pub async fn deposit(
    State(state): State<ServerState>,
    Path(wallet_id): Path<String>,
    payload: Result<Json<FundsOperation>, JsonRejection>,
) -> Result<Json<WalletView>, ServerError> {
    let Json(payload) = payload?;
    let amount = amount(&payload)?;

    let wallet = state
        .engine
        .deposit(
            payload.transaction_key,
            &wallet_id,
            &payload.currency,
            amount,
        )
        .await?;
    Ok(Json(wallet_view(wallet)))
}

pub async fn withdraw(
    State(state): State<ServerState>,
    Path(wallet_id): Path<String>,
    payload: Result<Json<FundsOperation>, JsonRejection>,
) -> Result<Json<WalletView>, ServerError> {
    let Json(payload) = payload?;
    let amount = amount(&payload)?;

    let wallet = state
        .engine
        .withdraw(
            payload.transaction_key,
            &wallet_id,
            &payload.currency,
            amount,
        )
        .await?;
    Ok(Json(wallet_view(wallet)))
}

/// Returns the destination wallet.
pub async fn transfer(
    State(state): State<ServerState>,
    Path((src_id, dst_id)): Path<(String, String)>,
    payload: Result<Json<FundsOperation>, JsonRejection>,
) -> Result<Json<WalletView>, ServerError> {
    let Json(payload) = payload?;
    let amount = amount(&payload)?;

    let wallet = state
        .engine
        .transfer(
            payload.transaction_key,
            &src_id,
            &dst_id,
            &payload.currency,
            amount,
        )
        .await?;
    Ok(Json(wallet_view(wallet)))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;

    fn payload(amount: Decimal) -> FundsOperation {
        FundsOperation {
            transaction_key: Uuid::new_v4(),
            currency: "EUR".to_string(),
            amount,
        }
    }

    #[test]
    fn amount_is_read_in_cents() {
        let cents = amount(&payload(Decimal::new(1050, 2))).unwrap_or_else(|_| panic!("amount"));
        assert_eq!(cents, MoneyCents::new(1050));
        let cents = amount(&payload(Decimal::new(10_500, 3))).unwrap_or_else(|_| panic!("amount"));
        assert_eq!(cents, MoneyCents::new(1050));
    }

    #[test]
    fn amount_must_be_positive_with_two_decimals() {
        assert!(amount(&payload(Decimal::ZERO)).is_err());
        assert!(amount(&payload(Decimal::new(-100, 2))).is_err());
        assert!(amount(&payload(Decimal::new(1005, 3))).is_err());
    }
}
