//! Wallets API endpoints.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::{JsonRejection, QueryRejection}},
    http::StatusCode,
};
use engine::{DEFAULT_PAGE_SIZE, ListParams};

use crate::{
    ServerError,
    server::ServerState,
    types::wallet::{Wallet, WalletList, WalletNew, WalletUpdate, WalletView},
};

pub(crate) fn wallet_view(wallet: Wallet) -> WalletView {
    WalletView {
        wallet_id: wallet.id,
        email: wallet.email,
        owner: wallet.owner,
        currency: wallet.currency.code().to_string(),
        balance: wallet.balance.to_decimal(),
        created: wallet.created_at,
        updated: wallet.updated_at,
    }
}

/// Listing parameters shared by the wallet and history listings. A missing or
/// zero page size means the default one.
pub(crate) fn list_params(
    text_filter: Option<String>,
    items_per_page: Option<u64>,
    offset: Option<u64>,
    sorting: Option<String>,
    descending: Option<bool>,
) -> ListParams {
    ListParams {
        text_filter,
        items_per_page: items_per_page
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE),
        offset: offset.unwrap_or_default(),
        sorting,
        descending: descending.unwrap_or_default(),
    }
}

/// Handle requests for creating a new wallet
pub async fn wallet_new(
    State(state): State<ServerState>,
    payload: Result<Json<WalletNew>, JsonRejection>,
) -> Result<(StatusCode, Json<WalletView>), ServerError> {
    let Json(payload) = payload?;
    let wallet = state
        .engine
        .create_wallet(
            payload.transaction_key,
            &payload.owner,
            &payload.email,
            &payload.currency,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(wallet_view(wallet))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(wallet_id): Path<String>,
) -> Result<Json<WalletView>, ServerError> {
    let wallet = state.engine.wallet(&wallet_id).await?;
    Ok(Json(wallet_view(wallet)))
}

pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<WalletList>, QueryRejection>,
) -> Result<Json<Vec<WalletView>>, ServerError> {
    let Query(query) = query?;
    let params = list_params(
        query.text_filter,
        query.items_per_page,
        query.offset,
        query.sorting,
        query.descending,
    );

    let wallets = state.engine.wallets(&params).await?;
    Ok(Json(wallets.into_iter().map(wallet_view).collect()))
}

pub async fn wallet_update(
    State(state): State<ServerState>,
    Path(wallet_id): Path<String>,
    payload: Result<Json<WalletUpdate>, JsonRejection>,
) -> Result<Json<WalletView>, ServerError> {
    let Json(payload) = payload?;
    let update = engine::WalletUpdate {
        transaction_key: payload.transaction_key,
        owner: payload.owner,
        email: payload.email,
        currency: payload.currency,
    };

    let wallet = state.engine.update_wallet(&wallet_id, update).await?;
    Ok(Json(wallet_view(wallet)))
}

pub async fn wallet_delete(
    State(state): State<ServerState>,
    Path(wallet_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_wallet(&wallet_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
