//! Read-only Supabase client for the public menu.
//!
//! # Architecture
//!
//! - Talks to the project's PostgREST endpoint (`/rest/v1`) with `reqwest`
//! - Uses the public anon key only; row-level security on the backend decides
//!   what a shopper may read
//! - Whole tenant menus are cached in `moka` (TTL from `MENU_CACHE_TTL_SECS`)
//!
//! The admin binary has its own client with write access; this one cannot
//! modify anything.

mod menu;

use std::sync::Arc;
use std::time::Duration;

use menudigital_core::{Menu, Slug};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::SupabaseConfig;

/// Errors that can occur when reading from Supabase.
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

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// Error body shapes returned by PostgREST (`message`) and the gateway (`msg`, `error`).
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error: Option<String>,
    hint: Option<String>,
}

impl ApiErrorBody {
    fn into_message(self, raw: &str) -> String {
        let message = self
            .message
            .or(self.msg)
            .or(self.error)
            .unwrap_or_else(|| raw.chars().take(200).collect());
        match self.hint {
            Some(hint) => format!("{message} (hint: {hint})"),
            None => message,
        }
    }
}

/// Client for the Supabase REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and menu cache.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    rest_url: Url,
    anon_key: SecretString,
    menus: Cache<Slug, Arc<Menu>>,
}

impl SupabaseClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the REST endpoint URL cannot be derived from the
    /// project URL.
    pub fn new(config: &SupabaseConfig, menu_ttl: Duration) -> Result<Self, SupabaseError> {
        let menus = Cache::builder()
            .max_capacity(500)
            .time_to_live(menu_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(SupabaseClientInner {
                client: reqwest::Client::new(),
                rest_url: config.url.join("rest/v1/")?,
                anon_key: config.anon_key.clone(),
                menus,
            }),
        })
    }

    /// Build a table URL with PostgREST query parameters.
    fn table_url(&self, table: &str, query: &[(&str, &str)]) -> Result<Url, SupabaseError> {
        let mut url = self.inner.rest_url.join(table)?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }

    /// Run a `SELECT` against a table.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, SupabaseError> {
        let url = self.table_url(table, query)?;
        let key = self.inner.anon_key.expose_secret();

        let response = self
            .inner
            .client
            .get(url)
            .header("apikey", key)
            .bearer_auth(key)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
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
            tracing::error!(
                status = %status,
                table,
                body = %body.chars().take(500).collect::<String>(),
                "Supabase returned non-success status"
            );
            let parsed: ApiErrorBody = serde_json::from_str(&body).unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: parsed.into_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, table, "Failed to parse Supabase response");
            SupabaseError::Parse(e)
        })
    }

    /// Check that the REST API answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), SupabaseError> {
        self.select::<serde_json::Value>("companies", &[("select", "id"), ("limit", "1")])
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> SupabaseClient {
        let config = SupabaseConfig {
            url: Url::parse("https://abcd.supabase.co/").unwrap(),
            anon_key: SecretString::from("anon"),
        };
        SupabaseClient::new(&config, Duration::from_secs(60)).unwrap()
    }

    #[test]
    fn test_table_url_encodes_filters() {
        let url = client()
            .table_url("companies", &[("select", "*"), ("slug", "eq.la-casa")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://abcd.supabase.co/rest/v1/companies?select=*&slug=eq.la-casa"
        );
    }

    #[test]
    fn test_api_error_prefers_postgrest_message() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"code":"42501","message":"permission denied for table products","hint":"check RLS"}"#,
        )
        .unwrap();
        assert_eq!(
            body.into_message(""),
            "permission denied for table products (hint: check RLS)"
        );
    }

    #[test]
    fn test_api_error_falls_back_to_raw_body() {
        let body = ApiErrorBody::default();
        assert_eq!(body.into_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_error_display() {
        let err = SupabaseError::Api {
            status: 404,
            message: "relation does not exist".to_string(),
        };
        assert_eq!(err.to_string(), "API error (404): relation does not exist");
        assert_eq!(
            SupabaseError::RateLimited(30).to_string(),
            "Rate limited, retry after 30 seconds"
        );
    }
}
