//! Product records.

use menudigital_core::{CategoryId, CompanyId, Price, Product, ProductId, ProductStatus};
use serde::Serialize;
use tracing::instrument;

use super::{SupabaseClient, SupabaseError, eq, first_row};

/// Columns written when a product is created or edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductInput {
    pub company_id: CompanyId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub image: Option<String>,
    pub status: ProductStatus,
}

impl SupabaseClient {
    /// A company's products, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn products(
        &self,
        token: &str,
        company_id: CompanyId,
    ) -> Result<Vec<Product>, SupabaseError> {
        let company = eq(company_id);
        self.select(
            token,
            "products",
            &[
                ("select", "*"),
                ("company_id", company.as_str()),
                ("order", "created_at.desc"),
            ],
        )
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, product), fields(name = %product.name))]
    pub async fn create_product(
        &self,
        token: &str,
        product: &ProductInput,
    ) -> Result<Product, SupabaseError> {
        self.insert(token, "products", product).await
    }

    /// # Errors
    ///
    /// Returns [`SupabaseError::MissingRow`] if the product does not belong
    /// to the input's company.
    #[instrument(skip(self, token, product))]
    pub async fn update_product(
        &self,
        token: &str,
        id: ProductId,
        product: &ProductInput,
    ) -> Result<Product, SupabaseError> {
        let (id, company) = (eq(id), eq(product.company_id));
        let rows = self
            .update(
                token,
                "products",
                &[("id", id.as_str()), ("company_id", company.as_str())],
                product,
            )
            .await?;
        first_row(rows, "products")
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_product(
        &self,
        token: &str,
        company_id: CompanyId,
        id: ProductId,
    ) -> Result<(), SupabaseError> {
        let (id, company) = (eq(id), eq(company_id));
        self.delete(
            token,
            "products",
            &[("id", id.as_str()), ("company_id", company.as_str())],
        )
        .await
    }
}
