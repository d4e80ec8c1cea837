//! Session-related types for admin authentication.
//!
//! The backend issues the tokens; the session only carries them between
//! requests together with what every page header needs.

use chrono::{DateTime, Duration, Utc};
use menudigital_core::{Company, CompanyId, Slug, UserId};
use serde::{Deserialize, Serialize};

use crate::supabase::AuthSession;

/// Refresh the access token once it is this close to expiry.
pub const REFRESH_MARGIN_SECONDS: i64 = 60;

/// The owner's company, once onboarding is done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyLink {
    pub id: CompanyId,
    pub name: String,
    pub slug: Slug,
}

impl From<&Company> for CompanyLink {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id,
            name: company.name.clone(),
            slug: company.slug.clone(),
        }
    }
}

/// Session-stored owner identity and backend tokens.
///
/// Implements `Debug` manually to redact the tokens.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub user_id: UserId,
    pub email: String,
    /// Business name given at sign-up.
    pub name: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub company: Option<CompanyLink>,
}

impl std::fmt::Debug for CurrentAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentAdmin")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("expires_at", &self.expires_at)
            .field("company", &self.company)
            .finish_non_exhaustive()
    }
}

impl CurrentAdmin {
    /// Build the session identity from a fresh sign-in.
    #[must_use]
    pub fn from_auth(auth: &AuthSession, now: DateTime<Utc>) -> Self {
        Self {
            user_id: auth.user.id,
            email: auth.user.email.clone().unwrap_or_default(),
            name: auth.user.user_metadata.name.clone(),
            access_token: auth.access_token.clone(),
            refresh_token: auth.refresh_token.clone(),
            expires_at: auth.expiry(now),
            company: None,
        }
    }

    /// Swap in the tokens from a refresh.
    pub fn apply_refresh(&mut self, auth: &AuthSession, now: DateTime<Utc>) {
        self.access_token.clone_from(&auth.access_token);
        self.refresh_token.clone_from(&auth.refresh_token);
        self.expires_at = auth.expiry(now);
    }

    /// Whether the access token expires within [`REFRESH_MARGIN_SECONDS`].
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now <= Duration::seconds(REFRESH_MARGIN_SECONDS)
    }

    /// Name shown in the page header.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.company
            .as_ref()
            .map(|c| c.name.as_str())
            .or(self.name.as_deref())
            .unwrap_or(&self.email)
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in owner.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for the one-shot notice shown after a redirect.
    pub const FLASH: &str = "flash";

    /// Key for the form values of a failed post.
    pub const FORM_DRAFT: &str = "form_draft";
}
