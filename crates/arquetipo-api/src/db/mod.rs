//! # Database Persistence Layer
//!
//! Postgres persistence for clientes and usuarios via SQLx.
//!
//! The database layer is **optional**. When `DATABASE_URL` is set, the API
//! stores everything in PostgreSQL. When absent, the API falls back to the
//! in-memory repositories (suitable for development and testing).
//!
//! Queries are runtime-checked (`sqlx::query_as::<_, Row>`) so the crate
//! builds without a live database.

pub mod clientes;
pub mod usuarios;

pub use clientes::PgClienteRepository;
pub use usuarios::PgUsuarioRepository;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set; running in-memory only mode. \
                 Data will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}
