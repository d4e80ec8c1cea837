//! Company (tenant) records.

use menudigital_core::{Company, CompanyId, Slug};
use serde::Serialize;
use tracing::instrument;

use super::{SupabaseClient, SupabaseError, eq, first_row};

/// Columns set when a company is created during onboarding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCompany {
    pub name: String,
    pub slug: Slug,
    pub whatsapp: Option<String>,
    pub primary_color: Option<String>,
}

/// Columns edited on the settings page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanySettings {
    pub name: String,
    pub slug: Slug,
    pub whatsapp: Option<String>,
    pub primary_color: Option<String>,
}

/// Columns edited on the restaurant profile page.
///
/// `None` clears a column, except `logo`, which is only sent when a new
/// file was uploaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileChanges {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl SupabaseClient {
    /// Load a company by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn company(&self, token: &str, id: CompanyId) -> Result<Option<Company>, SupabaseError> {
        let id = eq(id);
        let rows = self
            .select(token, "companies", &[("select", "*"), ("id", id.as_str())])
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Load a company by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(slug = %slug))]
    pub async fn company_by_slug(
        &self,
        token: &str,
        slug: &Slug,
    ) -> Result<Option<Company>, SupabaseError> {
        let slug = eq(slug);
        let rows = self
            .select(
                token,
                "companies",
                &[("select", "*"), ("slug", slug.as_str()), ("limit", "1")],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Create a company.
    ///
    /// # Errors
    ///
    /// Returns a 409 API error if the slug is taken.
    #[instrument(skip(self, token, company), fields(slug = %company.slug))]
    pub async fn create_company(
        &self,
        token: &str,
        company: &NewCompany,
    ) -> Result<Company, SupabaseError> {
        self.insert(token, "companies", company).await
    }

    /// Update a company's settings or profile columns.
    ///
    /// # Errors
    ///
    /// Returns a 409 API error if a new slug is taken, or
    /// [`SupabaseError::MissingRow`] if the company is not visible to the
    /// caller.
    #[instrument(skip(self, token, changes))]
    pub async fn update_company<B: Serialize + Sync>(
        &self,
        token: &str,
        id: CompanyId,
        changes: &B,
    ) -> Result<Company, SupabaseError> {
        let id = eq(id);
        let rows = self
            .update(token, "companies", &[("id", id.as_str())], changes)
            .await?;
        first_row(rows, "companies")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_changes_keep_logo_unless_uploaded() {
        let changes = ProfileChanges {
            name: "Demo".to_string(),
            phone: None,
            email: None,
            whatsapp: Some("5215550001111".to_string()),
            address: None,
            lat: Some(19.43),
            lng: Some(-99.13),
            logo: None,
        };
        let json = serde_json::to_value(&changes).unwrap();
        assert!(json.get("logo").is_none());
        assert!(json["phone"].is_null());
        assert_eq!(json["lat"], 19.43);
    }

    #[test]
    fn test_new_company_serializes_slug_as_text() {
        let company = NewCompany {
            name: "La Casa".to_string(),
            slug: Slug::from_name("La Casa").unwrap(),
            whatsapp: None,
            primary_color: Some("#ff6600".to_string()),
        };
        let json = serde_json::to_value(&company).unwrap();
        assert_eq!(json["slug"], "la-casa");
    }
}
