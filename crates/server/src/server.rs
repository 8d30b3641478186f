use axum::{
    Router,
    routing::{get, post, put},
};

use std::sync::Arc;

use crate::{funds, history, wallets};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

pub fn router(state: ServerState) -> Router {
    let api = Router::new()
        .route("/wallet/create", post(wallets::wallet_new))
        .route(
            "/wallet/{id}",
            get(wallets::get)
                .patch(wallets::wallet_update)
                .delete(wallets::wallet_delete),
        )
        .route("/wallets", get(wallets::list))
        .route("/wallet/{id}/history", get(history::list))
        .route("/wallet/{id}/deposit", put(funds::deposit))
        .route("/wallet/{id}/withdraw", put(funds::withdraw))
        .route("/wallet/{id}/transfer/{dst}", put(funds::transfer));

    Router::new().nest("/api/v1", api).with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header::CONTENT_TYPE},
    };
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::Database;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;

    async fn app() -> Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder()
            .database(db)
            .rate_source(Arc::new(engine::StaticRateSource))
            .build()
            .unwrap();
        router(ServerState {
            engine: Arc::new(engine),
        })
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, payload)
    }

    async fn create(app: &Router, owner: &str, currency: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/v1/wallet/create",
            Some(json!({
                "transactionKey": Uuid::new_v4(),
                "owner": owner,
                "email": format!("{}@mail.com", owner.to_lowercase()),
                "currency": currency,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["walletId"].as_str().unwrap().to_string()
    }

    fn funds(key: Uuid, currency: &str, amount: Value) -> Option<Value> {
        Some(json!({ "transactionKey": key, "currency": currency, "amount": amount }))
    }

    #[tokio::test]
    async fn create_and_get_wallet() {
        let app = app().await;
        let id = create(&app, "Kate", "EUR").await;

        let (status, body) = send(&app, Method::GET, &format!("/api/v1/wallet/{id}"), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["owner"], "Kate");
        assert_eq!(body["email"], "kate@mail.com");
        assert_eq!(body["currency"], "EUR");
        assert_eq!(body["balance"], "0.00");
    }

    #[tokio::test]
    async fn unknown_currency_is_404() {
        let app = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/wallet/create",
            Some(json!({
                "transactionKey": Uuid::new_v4(),
                "owner": "Kate",
                "email": "kate@mail.com",
                "currency": "XYZ",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("XYZ"));
    }

    #[tokio::test]
    async fn malformed_body_is_400() {
        let app = app().await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/wallet/create",
            Some(json!({ "owner": "Kate" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wallet_lookup_errors() {
        let app = app().await;

        let (status, _) = send(&app, Method::GET, "/api/v1/wallet/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let missing = Uuid::new_v4();
        let (status, _) = send(&app, Method::GET, &format!("/api/v1/wallet/{missing}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deposit_replay_is_409() {
        let app = app().await;
        let id = create(&app, "Kate", "RUB").await;
        let uri = format!("/api/v1/wallet/{id}/deposit");
        let key = Uuid::new_v4();

        let (status, body) = send(&app, Method::PUT, &uri, funds(key, "RUB", json!(1000))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["balance"], "1000.00");

        let (status, _) = send(&app, Method::PUT, &uri, funds(key, "RUB", json!(1000))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = send(&app, Method::GET, &format!("/api/v1/wallet/{id}"), None).await;
        assert_eq!(body["balance"], "1000.00");
    }

    #[tokio::test]
    async fn bad_amounts_are_422() {
        let app = app().await;
        let id = create(&app, "Kate", "EUR").await;
        let uri = format!("/api/v1/wallet/{id}/withdraw");

        for amount in [json!(0), json!(-5), json!("1.005")] {
            let (status, _) = send(&app, Method::PUT, &uri, funds(Uuid::new_v4(), "EUR", amount)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        }

        let (status, _) = send(&app, Method::PUT, &uri, funds(Uuid::new_v4(), "EUR", json!(1))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "overdraft");
    }

    #[tokio::test]
    async fn transfer_returns_destination() {
        let app = app().await;
        let src = create(&app, "Kate", "RUB").await;
        let dst = create(&app, "Alex", "USD").await;
        send(
            &app,
            Method::PUT,
            &format!("/api/v1/wallet/{src}/deposit"),
            funds(Uuid::new_v4(), "RUB", json!("10000")),
        )
        .await;

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/wallet/{src}/transfer/{dst}"),
            funds(Uuid::new_v4(), "RUB", json!("9999")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["walletId"], dst.as_str());
        assert_eq!(body["balance"], "107.99");

        let (_, body) = send(&app, Method::GET, &format!("/api/v1/wallet/{src}"), None).await;
        assert_eq!(body["balance"], "1.00");
    }

    #[tokio::test]
    async fn update_delete_and_history() {
        let app = app().await;
        let id = create(&app, "Kate", "EUR").await;
        let uri = format!("/api/v1/wallet/{id}");
        send(
            &app,
            Method::PUT,
            &format!("{uri}/deposit"),
            funds(Uuid::new_v4(), "EUR", json!("500")),
        )
        .await;

        let (status, body) = send(
            &app,
            Method::PATCH,
            &uri,
            Some(json!({ "currency": "USD" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["currency"], "USD");
        assert_eq!(body["balance"], "540.00");
        assert_eq!(body["owner"], "Kate");

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::GET, &format!("{uri}/history"), None).await;
        assert_eq!(status, StatusCode::OK);
        let operations: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["operation"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(operations, vec!["create", "deposit", "update", "delete"]);
    }

    #[tokio::test]
    async fn history_rejects_bad_period() {
        let app = app().await;
        let id = create(&app, "Kate", "EUR").await;

        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/api/v1/wallet/{id}/history?periodStart=yesterday"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/v1/wallet/{id}/history?periodStart=2000-01-01T00:00:00&periodEnd=2000-01-02T00:00:00"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn list_wallets_with_query() {
        let app = app().await;
        create(&app, "Kate", "EUR").await;
        create(&app, "Alex", "USD").await;
        create(&app, "Katherine", "RUB").await;

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/v1/wallets?textFilter=kat&sorting=owner&descending=true",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let owners: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|w| w["owner"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(owners, vec!["Katherine", "Kate"]);

        let (_, body) = send(&app, Method::GET, "/api/v1/wallets?itemsPerPage=1&offset=1&sorting=owner", None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["owner"], "Kate");

        let (status, _) = send(&app, Method::GET, "/api/v1/wallets?offset=minus-one", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
