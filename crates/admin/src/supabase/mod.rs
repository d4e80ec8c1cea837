//! Supabase client for the admin panel.
//!
//! # Architecture
//!
//! - PostgREST (`/rest/v1`) for `companies`, `categories`, `products` and
//!   `profiles`
//! - GoTrue (`/auth/v1`) for sign-up, password sign-in, token refresh and
//!   sign-out
//! - Storage (`/storage/v1`) for company logos
//!
//! Every call carries the project key as `apikey`. Table and storage calls
//! are authorized with the signed-in owner's access token, so row-level
//! security on the backend scopes them to the owner's company. Nothing is
//! cached: list pages re-fetch after every write.
//!
//! Resource-specific calls live in the submodules as further `impl` blocks.

mod auth;
mod categories;
mod companies;
mod products;
mod profiles;
mod storage;

pub use auth::{AuthSession, AuthUser, SignUp, UserMetadata};
pub use categories::{CategoryChanges, NewCategory};
pub use companies::{CompanySettings, NewCompany, ProfileChanges};
pub use products::ProductInput;
pub use profiles::Profile;
pub use storage::logo_object_path;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::SupabaseConfig;

/// Errors that can occur when calling Supabase.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A write returned no row.
    #[error("No row returned from {0}")]
    MissingRow(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl SupabaseError {
    /// HTTP status of an API error, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend rejected the caller's credentials.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self.status(), Some(400 | 401 | 403))
    }

    /// Whether a unique constraint rejected the write.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self.status(), Some(409))
    }
}

/// Error body shapes returned by PostgREST (`message`), GoTrue
/// (`msg`, `error_description`) and Storage (`error`).
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ApiErrorBody {
    fn into_message(self, raw: &str) -> String {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
            .unwrap_or_else(|| raw.chars().take(200).collect())
    }
}

/// Client for the Supabase APIs.
///
/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl SupabaseClient {
    /// Create a new client.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            inner: Arc::new(SupabaseClientInner {
                client: reqwest::Client::new(),
                base_url: config.url.clone(),
                api_key: config.api_key.clone(),
            }),
        }
    }

    /// The project key. Service-role callers (the CLI) use it as bearer token.
    #[must_use]
    pub fn api_key(&self) -> &str {
        self.inner.api_key.expose_secret()
    }

    /// Build an endpoint URL under the project, with query parameters.
    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, SupabaseError> {
        let mut url = self.inner.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Start a request with the project key and a bearer token.
    fn request(&self, method: Method, url: Url, bearer: &str) -> RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .header("apikey", self.api_key())
            .bearer_auth(bearer)
    }

    /// Send a request and return the raw body of a successful response.
    async fn execute(&self, request: RequestBuilder, what: &str) -> Result<String, SupabaseError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(SupabaseError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            // Bad credentials are routine; everything else is worth an alert
            if status.is_client_error() {
                tracing::warn!(status = %status, what, "Supabase rejected request");
            } else {
                tracing::error!(
                    status = %status,
                    what,
                    body = %body.chars().take(500).collect::<String>(),
                    "Supabase returned non-success status"
                );
            }
            let parsed: ApiErrorBody = serde_json::from_str(&body).unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: parsed.into_message(&body),
            });
        }

        Ok(body)
    }

    /// Send a request and decode its JSON response.
    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, SupabaseError> {
        let body = self.execute(request, what).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, what, "Failed to parse Supabase response");
            SupabaseError::Parse(e)
        })
    }

    // =========================================================================
    // PostgREST helpers
    // =========================================================================

    fn table_url(&self, table: &str, query: &[(&str, &str)]) -> Result<Url, SupabaseError> {
        self.endpoint(&format!("rest/v1/{table}"), query)
    }

    /// `SELECT` rows.
    async fn select<T: DeserializeOwned>(
        &self,
        token: &str,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, SupabaseError> {
        let url = self.table_url(table, query)?;
        let request = self.request(Method::GET, url, token);
        self.execute_json(request, table).await
    }

    /// `INSERT` one row and return it.
    async fn insert<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        token: &str,
        table: &str,
        body: &B,
    ) -> Result<T, SupabaseError> {
        let url = self.table_url(table, &[("select", "*")])?;
        let request = self
            .request(Method::POST, url, token)
            .header("Prefer", "return=representation")
            .json(body);
        first_row(self.execute_json(request, table).await?, table)
    }

    /// `INSERT ... ON CONFLICT DO UPDATE` one row and return it.
    async fn upsert<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        token: &str,
        table: &str,
        on_conflict: &str,
        body: &B,
    ) -> Result<T, SupabaseError> {
        let url = self.table_url(table, &[("select", "*"), ("on_conflict", on_conflict)])?;
        let request = self
            .request(Method::POST, url, token)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(body);
        first_row(self.execute_json(request, table).await?, table)
    }

    /// `UPDATE` the rows matching `filters` and return them.
    async fn update<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        token: &str,
        table: &str,
        filters: &[(&str, &str)],
        body: &B,
    ) -> Result<Vec<T>, SupabaseError> {
        let mut query = vec![("select", "*")];
        query.extend_from_slice(filters);
        let url = self.table_url(table, &query)?;
        let request = self
            .request(Method::PATCH, url, token)
            .header("Prefer", "return=representation")
            .json(body);
        self.execute_json(request, table).await
    }

    /// `DELETE` the rows matching `filters`.
    async fn delete(
        &self,
        token: &str,
        table: &str,
        filters: &[(&str, &str)],
    ) -> Result<(), SupabaseError> {
        let url = self.table_url(table, filters)?;
        let request = self.request(Method::DELETE, url, token);
        self.execute(request, table).await.map(|_| ())
    }
}

/// PostgREST `eq` filter value.
fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

fn first_row<T>(rows: Vec<T>, table: &str) -> Result<T, SupabaseError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| SupabaseError::MissingRow(table.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn client() -> SupabaseClient {
        SupabaseClient::new(&SupabaseConfig {
            url: Url::parse("https://abcd.supabase.co/").unwrap(),
            api_key: SecretString::from("anon"),
        })
    }

    #[test]
    fn test_table_url_with_filters() {
        let url = client()
            .table_url(
                "categories",
                &[("select", "*"), ("company_id", eq("c1").as_str()), ("order", "display_order.asc")],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://abcd.supabase.co/rest/v1/categories?select=*&company_id=eq.c1&order=display_order.asc"
        );
    }

    #[test]
    fn test_auth_error_body() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        )
        .unwrap();
        assert_eq!(body.into_message(""), "Invalid login credentials");
    }

    #[test]
    fn test_postgrest_error_body() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"code":"23505","message":"duplicate key value violates unique constraint \"companies_slug_key\""}"#,
        )
        .unwrap();
        assert!(body.into_message("").starts_with("duplicate key value"));
    }

    #[test]
    fn test_error_classification() {
        let conflict = SupabaseError::Api {
            status: 409,
            message: "duplicate".to_string(),
        };
        assert!(conflict.is_conflict());
        assert!(!conflict.is_auth_failure());

        let expired = SupabaseError::Api {
            status: 401,
            message: "JWT expired".to_string(),
        };
        assert!(expired.is_auth_failure());
        assert_eq!(SupabaseError::RateLimited(5).status(), None);
    }

    #[test]
    fn test_first_row() {
        assert_eq!(first_row(vec![1, 2], "t").unwrap(), 1);
        assert!(matches!(
            first_row::<i32>(vec![], "companies"),
            Err(SupabaseError::MissingRow(table)) if table == "companies"
        ));
    }
}
