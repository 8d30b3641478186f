//! Exchange-rate stub service.
//!
//! Serves the fixed quote table of [`StaticRateSource`] over the same contract
//! that [`engine::HttpRateSource`] consumes, so a wallet server can run against
//! it without a live rate feed.

use axum::{
    Json, Router,
    extract::{Query, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use engine::{Currency, StaticRateSource};

use crate::types::rates::{QuoteQuery, QuoteView};

async fn quote(query: Result<Query<QuoteQuery>, QueryRejection>) -> Response {
    let Ok(Query(query)) = query else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let (Ok(from), Ok(to)) = (
        Currency::try_from(query.from.as_str()),
        Currency::try_from(query.to.as_str()),
    ) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some((bid, ask)) = StaticRateSource::rates(from, to) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    Json(QuoteView {
        timestamp: Utc::now(),
        currencies: format!("{from}{to}"),
        bid,
        ask,
    })
    .into_response()
}

pub fn xr_router() -> Router {
    Router::new().route("/api/v1/xr", get(quote))
}

pub async fn run_xr_with_listener(listener: tokio::net::TcpListener) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Rate stub listening on {}", addr);

    axum::serve(listener, xr_router()).await
}

pub fn spawn_xr_with_listener(
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_xr_with_listener(listener).await {
            tracing::error!("rate stub failed: {err}");
        }
    });

    Ok(addr)
}
