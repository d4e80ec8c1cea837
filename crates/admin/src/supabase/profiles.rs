//! Owner profiles: the link from an auth user to their company.

use menudigital_core::{CompanyId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use super::{SupabaseClient, SupabaseError, eq};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    /// `None` until the owner finishes onboarding.
    #[serde(default)]
    pub company_id: Option<CompanyId>,
}

impl SupabaseClient {
    /// Load the profile of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn profile(&self, token: &str, user_id: UserId) -> Result<Option<Profile>, SupabaseError> {
        let id = eq(user_id);
        let rows = self
            .select(token, "profiles", &[("select", "id,company_id"), ("id", id.as_str())])
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Attach a company to the user's profile, creating the profile if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn link_company(
        &self,
        token: &str,
        user_id: UserId,
        company_id: CompanyId,
    ) -> Result<Profile, SupabaseError> {
        self.upsert(
            token,
            "profiles",
            "id",
            &json!({ "id": user_id, "company_id": company_id }),
        )
        .await
    }
}
