//! Session table migrations.
//!
//! Catalog tables live in Supabase and are managed there; the only tables
//! this project owns are the two session stores.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - storefront sessions (falls back to `DATABASE_URL`)
//! - `ADMIN_DATABASE_URL` - admin sessions, schema `admin` (falls back to `DATABASE_URL`)

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

use menudigital_admin::middleware::session as admin_session;
use menudigital_storefront::middleware::session as storefront_session;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0} (or DATABASE_URL)")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Session store error: {0}")]
    Store(String),
}

/// Create the storefront session table.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the migration fails.
pub async fn storefront() -> Result<(), MigrationError> {
    let pool = connect("STOREFRONT_DATABASE_URL").await?;

    tracing::info!("Creating storefront session table...");
    storefront_session::session_store(&pool)
        .migrate()
        .await?;

    tracing::info!("Storefront sessions ready");
    Ok(())
}

/// Create the admin session schema and table.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the migration fails.
pub async fn admin() -> Result<(), MigrationError> {
    let pool = connect("ADMIN_DATABASE_URL").await?;

    tracing::info!(
        schema = admin_session::SESSION_SCHEMA,
        table = admin_session::SESSION_TABLE,
        "Creating admin session table..."
    );
    admin_session::session_store(&pool)
        .map_err(MigrationError::Store)?
        .migrate()
        .await?;

    tracing::info!("Admin sessions ready");
    Ok(())
}

async fn connect(primary_key: &'static str) -> Result<PgPool, MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar(primary_key))?;

    tracing::info!(source = primary_key, "Connecting to database...");
    Ok(PgPool::connect(database_url.expose_secret()).await?)
}
