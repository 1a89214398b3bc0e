use crate::{
    adapters::persistence::PostgresPersistence,
    infra::{
        db::{init_db, run_migrations},
        error::InfraError,
    },
};

pub mod app;
pub mod config;
pub mod csv_import;
pub mod db;
pub mod error;
pub mod http_client;
pub mod setup;

/// Connects, applies pending migrations and wraps the pool.
pub async fn postgres_persistence(
    database_url: &str,
    max_connections: u32,
) -> Result<PostgresPersistence, InfraError> {
    let pool = init_db(database_url, max_connections).await?;
    run_migrations(&pool).await?;
    Ok(PostgresPersistence::new(pool))
}
