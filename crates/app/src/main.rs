use std::{sync::Arc, time::Duration};

use engine::{HttpRateSource, RateSource, StaticRateSource};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

const DEFAULT_RATES_TIMEOUT_SECS: u64 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "wallets={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    if let Some(xr) = settings.xr {
        tasks.spawn(async move {
            tracing::info!("Found rate stub settings...");
            let bind = xr.bind.unwrap_or_else(|| "127.0.0.1".to_string());
            let addr = format!("{}:{}", bind, xr.port);
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(err) => {
                    tracing::error!("failed to bind rate stub listener: {err}");
                    return;
                }
            };
            if let Err(err) = server::run_xr_with_listener(listener).await {
                tracing::error!("rate stub failed: {err}");
            }
        });
    }

    if let Some(server) = settings.server {
        let rates = settings.rates;
        tasks.spawn(async move {
            tracing::info!("Found server settings...");
            let db = match parse_database(&server.database).await {
                Ok(db) => db,
                Err(err) => {
                    tracing::error!("failed to initialize database: {err}");
                    return;
                }
            };
            let rate_source = match parse_rates(&rates) {
                Ok(source) => source,
                Err(err) => {
                    tracing::error!("failed to initialize rate source: {err}");
                    return;
                }
            };

            let mut builder = engine::Engine::builder()
                .database(db)
                .rate_source(rate_source);
            if let Some(max_retries) = server.max_retries {
                builder = builder.max_retries(max_retries);
            }
            let engine = match builder.build() {
                Ok(engine) => engine,
                Err(err) => {
                    tracing::error!("failed to build engine: {err}");
                    return;
                }
            };

            let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
            let addr = format!("{}:{}", bind, server.port);
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(err) => {
                    tracing::error!("failed to bind server listener: {err}");
                    return;
                }
            };
            if let Err(err) = server::run_with_listener(engine, listener).await {
                tracing::error!("server failed: {err}");
            }
        });
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

fn parse_rates(
    config: &settings::Rates,
) -> Result<Arc<dyn RateSource>, Box<dyn std::error::Error + Send + Sync>> {
    let Some(url) = config.url.as_deref() else {
        tracing::warn!("no rates url configured, using the built-in quote table");
        return Ok(Arc::new(StaticRateSource));
    };

    let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_RATES_TIMEOUT_SECS));
    Ok(Arc::new(HttpRateSource::new(url, timeout)?))
}
