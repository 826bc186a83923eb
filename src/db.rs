//! Database connection pool management

use anyhow::{Context, Result};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use std::str::FromStr;
use std::time::Duration;

use crate::config::Settings;

/// Create the PostgreSQL pool, applying migrations when configured to.
pub async fn create_pool(settings: &Settings) -> Result<PgPool> {
    let connect_options = PgConnectOptions::from_str(&settings.database_url)
        .context("Invalid DATABASE_URL")?
        .application_name("sustainable-design-backend");

    let pool = PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .connect_with(connect_options)
        .await
        .context("Failed to connect to PostgreSQL")?;

    tracing::info!(
        max_connections = settings.database_max_connections,
        "Database connection pool established"
    );

    if settings.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}
