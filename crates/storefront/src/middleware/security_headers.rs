//! Security headers for the public menu.
//!
//! The menu loads htmx from unpkg and shows logos and product photos from
//! arbitrary HTTPS hosts (Supabase storage or URLs the owner pasted), so the
//! policy is looser than a fully self-hosted site: images may come from any
//! HTTPS origin and styles may be inline (the tenant accent color).

use axum::{
    extract::Request,
    http::{
        HeaderValue,
        header::{
            CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::CspNonce;

/// Script origins allowed besides the per-request nonce.
pub const SCRIPT_CDN: &str = "https://unpkg.com";

/// Build the `Content-Security-Policy` value for a nonce.
#[must_use]
pub fn content_security_policy(nonce: &str) -> String {
    format!(
        "default-src 'none'; \
         script-src 'self' 'nonce-{nonce}' {SCRIPT_CDN}; \
         style-src 'self' 'unsafe-inline'; \
         img-src 'self' https: data:; \
         connect-src 'self'; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'"
    )
}

/// Add security headers to all responses.
///
/// - `X-Frame-Options: DENY`
/// - `X-Content-Type-Options: nosniff`
/// - `Referrer-Policy: strict-origin-when-cross-origin` (WhatsApp links keep
///   working, paths do not leak)
/// - `Content-Security-Policy` from [`content_security_policy`]
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let nonce = request
        .extensions()
        .get::<CspNonce>()
        .map(|n| n.0.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    if let Ok(policy) = HeaderValue::from_str(&content_security_policy(&nonce)) {
        headers.insert(CONTENT_SECURITY_POLICY, policy);
    }

    response
}
