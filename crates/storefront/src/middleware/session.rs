//! Session middleware configuration.
//!
//! Shopper sessions carry nothing but carts and checkout steps. They use
//! `PostgreSQL`-backed storage so a cart survives restarts and deploys.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "md_session";

/// Session expiry time in seconds (7 days of inactivity).
///
/// This is also the cart lifetime: a cart lives exactly as long as the
/// session that holds it.
pub const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// The shopper session store, in the default `tower_sessions` schema.
#[must_use]
pub fn session_store(pool: &PgPool) -> PostgresStore {
    PostgresStore::new(pool.clone())
}

/// Create the session layer with `PostgreSQL` store.
///
/// The sessions table must exist; create it with `md-cli migrate storefront`.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    configure(session_store(pool), config.is_https())
}

/// Apply cookie settings to any session store.
pub fn configure<S: SessionStore + Clone>(store: S, secure: bool) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
