//! Category records.

use menudigital_core::{Category, CategoryId, CompanyId};
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use super::{SupabaseClient, SupabaseError, eq, first_row};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCategory {
    pub company_id: CompanyId,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryChanges {
    pub name: String,
    pub description: Option<String>,
}

impl SupabaseClient {
    /// A company's categories in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn categories(
        &self,
        token: &str,
        company_id: CompanyId,
    ) -> Result<Vec<Category>, SupabaseError> {
        let company = eq(company_id);
        self.select(
            token,
            "categories",
            &[
                ("select", "*"),
                ("company_id", company.as_str()),
                ("order", "display_order.asc"),
            ],
        )
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, category), fields(name = %category.name))]
    pub async fn create_category(
        &self,
        token: &str,
        category: &NewCategory,
    ) -> Result<Category, SupabaseError> {
        self.insert(token, "categories", category).await
    }

    /// # Errors
    ///
    /// Returns [`SupabaseError::MissingRow`] if the category does not belong
    /// to `company_id`.
    #[instrument(skip(self, token, changes))]
    pub async fn update_category(
        &self,
        token: &str,
        company_id: CompanyId,
        id: CategoryId,
        changes: &CategoryChanges,
    ) -> Result<Category, SupabaseError> {
        let (id, company) = (eq(id), eq(company_id));
        let rows = self
            .update(
                token,
                "categories",
                &[("id", id.as_str()), ("company_id", company.as_str())],
                changes,
            )
            .await?;
        first_row(rows, "categories")
    }

    /// Move a category to a new display position.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn set_display_order(
        &self,
        token: &str,
        company_id: CompanyId,
        id: CategoryId,
        display_order: i32,
    ) -> Result<(), SupabaseError> {
        let (id, company) = (eq(id), eq(company_id));
        self.update::<_, serde_json::Value>(
            token,
            "categories",
            &[("id", id.as_str()), ("company_id", company.as_str())],
            &json!({ "display_order": display_order }),
        )
        .await
        .map(|_| ())
    }

    /// Delete a category. Products in it become uncategorized (the foreign
    /// key is `ON DELETE SET NULL` on the backend).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_category(
        &self,
        token: &str,
        company_id: CompanyId,
        id: CategoryId,
    ) -> Result<(), SupabaseError> {
        let (id, company) = (eq(id), eq(company_id));
        self.delete(
            token,
            "categories",
            &[("id", id.as_str()), ("company_id", company.as_str())],
        )
        .await
    }
}
