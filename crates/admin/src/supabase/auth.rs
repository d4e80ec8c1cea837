//! Owner authentication (GoTrue).

use chrono::{DateTime, Duration, Utc};
use menudigital_core::UserId;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use super::{SupabaseClient, SupabaseError};

/// Profile data the owner entered at sign-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// A signed-in owner's tokens.
///
/// Implements `Debug` manually to redact the tokens.
#[derive(Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until `access_token` expires.
    pub expires_in: i64,
    /// Unix timestamp of expiry, when the server sends one.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("user", &self.user)
            .finish()
    }
}

impl AuthSession {
    /// When the access token stops being accepted.
    #[must_use]
    pub fn expiry(&self, received_at: DateTime<Utc>) -> DateTime<Utc> {
        self.expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(|| received_at + Duration::seconds(self.expires_in))
    }
}

/// Result of a sign-up.
#[derive(Debug, Clone)]
pub enum SignUp {
    /// The project auto-confirms emails; the owner is signed in.
    SignedIn(AuthSession),
    /// A confirmation email was sent; no session yet.
    ConfirmationRequired(AuthUser),
}

/// GoTrue answers sign-up with a session or, when confirmation is on, a bare user.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(AuthSession),
    User(AuthUser),
}

impl SupabaseClient {
    /// Register an owner. The business name is kept in the user metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is taken, the password is rejected, or
    /// the request fails.
    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        business_name: &str,
    ) -> Result<SignUp, SupabaseError> {
        let url = self.endpoint("auth/v1/signup", &[])?;
        let request = self
            .request(Method::POST, url, self.api_key())
            .json(&json!({
                "email": email,
                "password": password,
                "data": UserMetadata { name: Some(business_name.to_string()) },
            }));

        let response: SignUpResponse = self.execute_json(request, "auth/signup").await?;
        Ok(match response {
            SignUpResponse::Session(session) => SignUp::SignedIn(session),
            SignUpResponse::User(user) => SignUp::ConfirmationRequired(user),
        })
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an API error with status 400 for wrong credentials.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SupabaseError> {
        let url = self.endpoint("auth/v1/token", &[("grant_type", "password")])?;
        let request = self
            .request(Method::POST, url, self.api_key())
            .json(&json!({ "email": email, "password": password }));
        self.execute_json(request, "auth/token").await
    }

    /// Exchange a refresh token for a new session.
    ///
    /// # Errors
    ///
    /// Returns an API error if the refresh token was revoked or already used.
    #[instrument(skip_all)]
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, SupabaseError> {
        let url = self.endpoint("auth/v1/token", &[("grant_type", "refresh_token")])?;
        let request = self
            .request(Method::POST, url, self.api_key())
            .json(&json!({ "refresh_token": refresh_token }));
        self.execute_json(request, "auth/refresh").await
    }

    /// Revoke the session behind an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let url = self.endpoint("auth/v1/logout", &[])?;
        let request = self.request(Method::POST, url, access_token);
        self.execute(request, "auth/logout").await.map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SESSION_JSON: &str = r#"{
        "access_token": "header.payload.sig",
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": 1760000000,
        "refresh_token": "r3fr3sh",
        "user": {
            "id": "00000000-0000-4000-8000-0000000000aa",
            "email": "dueno@example.com",
            "user_metadata": { "name": "Taquería Demo" }
        }
    }"#;

    #[test]
    fn test_sign_up_with_session() {
        let response: SignUpResponse = serde_json::from_str(SESSION_JSON).unwrap();
        let SignUpResponse::Session(session) = response else {
            panic!("expected a session");
        };
        assert_eq!(session.user.user_metadata.name.as_deref(), Some("Taquería Demo"));
    }

    #[test]
    fn test_sign_up_pending_confirmation() {
        let json = r#"{
            "id": "00000000-0000-4000-8000-0000000000aa",
            "email": "dueno@example.com",
            "confirmation_sent_at": "2026-01-01T00:00:00Z"
        }"#;
        let response: SignUpResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response, SignUpResponse::User(user) if user.email.as_deref() == Some("dueno@example.com")));
    }

    #[test]
    fn test_expiry_prefers_server_timestamp() {
        let session: AuthSession = serde_json::from_str(SESSION_JSON).unwrap();
        let now = Utc::now();
        assert_eq!(session.expiry(now).timestamp(), 1_760_000_000);

        let mut without = session;
        without.expires_at = None;
        assert_eq!(without.expiry(now), now + Duration::seconds(3600));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let session: AuthSession = serde_json::from_str(SESSION_JSON).unwrap();
        let debug_output = format!("{session:?}");
        assert!(!debug_output.contains("r3fr3sh"));
        assert!(!debug_output.contains("header.payload.sig"));
    }
}
