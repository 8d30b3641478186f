//! Wallet history endpoint.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use engine::HistoryParams;

use crate::{
    ServerError,
    server::ServerState,
    types::history::{HistoryEntry, HistoryList, HistoryView},
    wallets::list_params,
};

/// Layout of `periodStart`/`periodEnd`.
const PERIOD_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// Window used when `periodStart` is absent.
const DEFAULT_PERIOD_HOURS: i64 = 24;

fn parse_period(value: &str) -> Result<DateTime<Utc>, ServerError> {
    NaiveDateTime::parse_from_str(value, PERIOD_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| ServerError::Generic(format!("invalid period bound: {value}")))
}

fn history_view(entry: HistoryEntry) -> HistoryView {
    HistoryView {
        wallet_id: entry.wallet_id,
        email: entry.email,
        owner: entry.owner,
        currency: entry.currency.code().to_string(),
        balance: entry.balance.to_decimal(),
        created: entry.created_at,
        operation: entry.operation.as_str().to_string(),
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Path(wallet_id): Path<String>,
    query: Result<Query<HistoryList>, QueryRejection>,
) -> Result<Json<Vec<HistoryView>>, ServerError> {
    let Query(query) = query?;
    let now = Utc::now();
    let period_start = match query.period_start.as_deref() {
        Some(value) => parse_period(value)?,
        None => now - Duration::hours(DEFAULT_PERIOD_HOURS),
    };
    let period_end = match query.period_end.as_deref() {
        Some(value) => parse_period(value)?,
        None => now,
    };

    let params = HistoryParams {
        period_start: Some(period_start),
        period_end: Some(period_end),
        list: list_params(
            query.text_filter,
            query.items_per_page,
            query.offset,
            query.sorting,
            query.descending,
        ),
    };

    let entries = state.engine.wallet_history(&wallet_id, &params).await?;
    Ok(Json(entries.into_iter().map(history_view).collect()))
}
