//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//! 4. Security headers (no third-party scripts at all)
//! 5. Rate limiting on the sign-in and sign-up routes only
//!
//! Authentication is enforced per handler by the extractors in [`auth`].

pub mod auth;
pub mod rate_limit;
pub mod security_headers;
pub mod session;

pub use auth::{
    AdminAuthRejection, OptionalAdminAuth, RequireAdminAuth, RequireCompany, clear_current_admin,
    set_current_admin,
};
pub use rate_limit::auth_rate_limiter;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
