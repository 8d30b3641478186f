use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run_with_listener};
pub use xr::{run_xr_with_listener, spawn_xr_with_listener, xr_router};

mod funds;
mod history;
mod server;
mod wallets;
mod xr;

pub mod types {
    pub mod wallet {
        pub use api_types::wallet::{WalletList, WalletNew, WalletUpdate, WalletView};
        pub use engine::Wallet;
    }

    pub mod history {
        pub use api_types::history::{HistoryList, HistoryView};
        pub use engine::HistoryEntry;
    }

    pub mod funds {
        pub use api_types::funds::FundsOperation;
    }

    pub mod rates {
        pub use api_types::rates::{QuoteQuery, QuoteView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::InvalidWalletId(_) => StatusCode::BAD_REQUEST,
        EngineError::InvalidCurrency(_) | EngineError::WalletNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::EmailNotUnique(_)
        | EngineError::AlreadyClaimed(_)
        | EngineError::StaleWallet(_) => StatusCode::CONFLICT,
        EngineError::Overdraft(_) | EngineError::InvalidInput(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EngineError::ConversionFailed(_) => StatusCode::BAD_GATEWAY,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::Generic(value.body_text())
    }
}
