//! # arquetipo-api: Binary Entry Point
//!
//! Reads configuration from the environment, picks Postgres or in-memory
//! storage, wires the optional Operaciones client and serves on
//! `0.0.0.0:$PORT`.

use arquetipo_api::state::AppState;
use arquetipo_api::AppConfig;
use arquetipo_operaciones::{OperacionesClient, OperacionesConfig};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {e}");
        e
    })?;
    let port = config.port;
    tracing::info!(
        environment = config.environment.as_str(),
        host_name = %config.host_name,
        "configuration loaded"
    );

    // Database pool is optional; absent means in-memory only.
    let db_pool = arquetipo_api::db::init_pool().await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let state = match db_pool {
        Some(pool) => AppState::with_postgres(config, pool),
        None => AppState::in_memory(config),
    };

    let state = match OperacionesConfig::from_env() {
        Ok(operaciones_config) => {
            tracing::info!(base_url = %operaciones_config.base_url, "Operaciones client configured");
            let client = OperacionesClient::new(operaciones_config).map_err(|e| {
                tracing::error!("Failed to create Operaciones client: {e}");
                e
            })?;
            state.with_operaciones(client)
        }
        Err(e) => {
            tracing::warn!("Operaciones client not configured: {e}. Util endpoints will return 503.");
            state
        }
    };

    let app = arquetipo_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Arquetipo API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
