//! Tenant menu queries.

use std::sync::Arc;

use menudigital_core::{Category, Company, Menu, Product, Slug};
use tracing::{debug, instrument};

use super::{SupabaseClient, SupabaseError};

impl SupabaseClient {
    /// Load a tenant's company, categories (by name) and products.
    ///
    /// Returns `Ok(None)` when no company has this slug. Found menus are
    /// cached; misses are not, so a newly created tenant shows up at once.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the three reads fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn menu(&self, slug: &Slug) -> Result<Option<Arc<Menu>>, SupabaseError> {
        if let Some(menu) = self.inner.menus.get(slug).await {
            debug!("Cache hit for menu");
            return Ok(Some(menu));
        }

        let slug_filter = format!("eq.{slug}");
        let companies: Vec<Company> = self
            .select(
                "companies",
                &[("select", "*"), ("slug", slug_filter.as_str()), ("limit", "1")],
            )
            .await?;
        let Some(company) = companies.into_iter().next() else {
            return Ok(None);
        };

        let company_filter = format!("eq.{}", company.id);
        let categories: Vec<Category> = self
            .select(
                "categories",
                &[
                    ("select", "*"),
                    ("company_id", company_filter.as_str()),
                    ("order", "name.asc"),
                ],
            )
            .await?;
        let products: Vec<Product> = self
            .select(
                "products",
                &[
                    ("select", "*"),
                    ("company_id", company_filter.as_str()),
                    ("order", "name.asc"),
                ],
            )
            .await?;

        debug!(
            categories = categories.len(),
            products = products.len(),
            "Loaded menu"
        );

        let menu = Arc::new(Menu {
            company,
            categories,
            products,
        });
        self.inner.menus.insert(slug.clone(), Arc::clone(&menu)).await;
        Ok(Some(menu))
    }
}
