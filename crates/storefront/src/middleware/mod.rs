//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//! 4. CSP nonce (per-request nonce for the inline toast script)
//! 5. Security headers (CSP built with the nonce, framing, sniffing)

pub mod csp;
pub mod security_headers;
pub mod session;

pub use csp::{CspNonce, csp_nonce_middleware};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
