//! Payout gateway binary entry point.
//!
//! Loads configuration, initializes tracing, connects to PostgreSQL, wires
//! the adapters into the application state and serves the axum router.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use payout_gateway::adapters::http::{api_router, TransferAppState};
use payout_gateway::adapters::postgres::PostgresTransferStore;
use payout_gateway::adapters::provider::{InteracClient, InteracConfig};
use payout_gateway::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        tracing::info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let store = Arc::new(PostgresTransferStore::new(pool));
    let provider = Arc::new(InteracClient::new(
        InteracConfig::new(config.provider.api_key.clone(), config.provider.base_url.clone())
            .with_timeout_secs(config.provider.timeout_secs),
    )?);

    let state = TransferAppState {
        store,
        provider,
        webhook_secret: config.provider.webhook_secret.clone(),
    };

    let cors = if config.server.cors_origins_list().is_empty() {
        CorsLayer::new()
    } else {
        let origins: Vec<http::HeaderValue> = config
            .server
            .cors_origins_list()
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };

    let app = api_router()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state);

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, "Payout gateway listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
