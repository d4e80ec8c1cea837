//! Seed a tenant's catalog from a YAML file.
//!
//! The file is parsed and validated in full before any API call. Seeding
//! is additive: an existing company (by slug), category (by name) or
//! product (by name within its category) is left as it is, so the command
//! can be re-run after editing the file.
//!
//! Writes go through the Supabase REST API with the service role key,
//! which bypasses row-level security.
//!
//! ```yaml
//! company:
//!   name: Taquería Demo
//!   slug: demo            # optional, derived from the name
//!   whatsapp: "5215550001111"
//!   primary_color: "#f97316"
//! categories:
//!   - name: Tacos
//!     products:
//!       - name: Taco al pastor
//!         price: 25.00
//!         active: true    # optional, default true
//! ```

use std::collections::HashSet;
use std::path::Path;

use menudigital_admin::config::SupabaseConfig;
use menudigital_admin::supabase::{NewCategory, NewCompany, ProductInput, SupabaseClient, SupabaseError};
use menudigital_core::{
    CompanyId, Price, ProductStatus, Slug, ThemeColor, UserId, WhatsAppNumber, next_display_order,
};
use serde::Deserialize;
use tracing::{error, info};

// =============================================================================
// File format
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    pub company: CompanySeed,
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompanySeed {
    pub name: String,
    pub slug: Option<String>,
    pub whatsapp: Option<String>,
    pub primary_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategorySeed {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductSeed {
    pub name: String,
    pub description: Option<String>,
    pub price: PriceValue,
    pub image: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// YAML reads `25.00` as a number and `"25.00"` as a string; accept both.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    Number(f64),
    Text(String),
}

impl PriceValue {
    fn parse(&self) -> Option<Price> {
        let parsed = match self {
            Self::Number(n) => Price::parse(&n.to_string()),
            Self::Text(s) => Price::parse(s),
        };
        parsed.ok()
    }
}

const fn default_active() -> bool {
    true
}

// =============================================================================
// Validated plan
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SeedPlan {
    pub company: NewCompany,
    pub categories: Vec<CategoryPlan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPlan {
    pub name: String,
    pub description: Option<String>,
    pub products: Vec<ProductPlan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPlan {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub image: Option<String>,
    pub status: ProductStatus,
}

impl SeedFile {
    /// Validate the whole file, collecting every problem.
    ///
    /// # Errors
    ///
    /// Returns one message per invalid value.
    pub fn plan(self) -> Result<SeedPlan, Vec<String>> {
        let mut errors = Vec::new();

        let company_name = self.company.name.trim().to_string();
        if company_name.is_empty() {
            errors.push("company.name is empty".to_string());
        }
        let slug_source = self.company.slug.as_deref().unwrap_or(&company_name);
        let slug = Slug::from_name(slug_source)
            .map_err(|e| errors.push(format!("company.slug: {e}")))
            .ok();
        if let Some(raw) = &self.company.whatsapp
            && let Err(e) = WhatsAppNumber::parse(raw)
        {
            errors.push(format!("company.whatsapp: {e}"));
        }
        let primary_color = self
            .company
            .primary_color
            .as_deref()
            .and_then(|raw| {
                ThemeColor::parse(raw)
                    .map_err(|e| errors.push(format!("company.primary_color: {e}")))
                    .ok()
            })
            .map(|color| color.to_string());

        let mut category_names = HashSet::new();
        let mut categories = Vec::with_capacity(self.categories.len());
        for (i, category) in self.categories.into_iter().enumerate() {
            let name = category.name.trim().to_string();
            if name.is_empty() {
                errors.push(format!("categories[{i}].name is empty"));
            } else if !category_names.insert(name.clone()) {
                errors.push(format!("categories[{i}]: duplicate category \"{name}\""));
            }

            let mut product_names = HashSet::new();
            let mut products = Vec::with_capacity(category.products.len());
            for (j, product) in category.products.into_iter().enumerate() {
                let at = format!("categories[{i}].products[{j}]");
                let product_name = product.name.trim().to_string();
                if product_name.is_empty() {
                    errors.push(format!("{at}.name is empty"));
                } else if !product_names.insert(product_name.clone()) {
                    errors.push(format!("{at}: duplicate product \"{product_name}\""));
                }
                let Some(price) = product.price.parse() else {
                    errors.push(format!("{at}.price must be a non-negative number"));
                    continue;
                };
                products.push(ProductPlan {
                    name: product_name,
                    description: product.description,
                    price: Price::new(price.amount().round_dp(2)).unwrap_or(price),
                    image: product.image,
                    status: ProductStatus::from_checkbox(product.active),
                });
            }

            categories.push(CategoryPlan {
                name,
                description: category.description,
                products,
            });
        }

        match slug {
            Some(slug) if errors.is_empty() => Ok(SeedPlan {
                company: NewCompany {
                    name: company_name,
                    slug,
                    whatsapp: self.company.whatsapp,
                    primary_color,
                },
                categories,
            }),
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Command
// =============================================================================

/// What a seeding run created and what it found already present.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub company_created: bool,
    pub categories_created: usize,
    pub categories_skipped: usize,
    pub products_created: usize,
    pub products_skipped: usize,
}

/// Seed from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is invalid, the service
/// role key is missing, or an API call fails.
pub async fn run(
    file: &Path,
    owner: Option<UserId>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    info!(path = %file.display(), "Loading seed file");
    let content = tokio::fs::read_to_string(file).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let plan = match seed.plan() {
        Ok(plan) => plan,
        Err(errors) => {
            error!("Seed file validation failed:");
            for err in &errors {
                error!("  - {err}");
            }
            return Err(format!("{} validation errors found", errors.len()).into());
        }
    };

    let product_count: usize = plan.categories.iter().map(|c| c.products.len()).sum();
    info!(
        slug = %plan.company.slug,
        categories = plan.categories.len(),
        products = product_count,
        "Seed file validated"
    );
    if dry_run {
        info!("Dry run, nothing written");
        return Ok(());
    }

    let config = SupabaseConfig::from_env("SUPABASE_SERVICE_ROLE_KEY")?;
    let client = SupabaseClient::new(&config);
    let summary = apply(&client, &plan, owner).await?;

    info!("Seeding complete!");
    info!("  Company created: {}", summary.company_created);
    info!(
        "  Categories created: {} (skipped {})",
        summary.categories_created, summary.categories_skipped
    );
    info!(
        "  Products created: {} (skipped {})",
        summary.products_created, summary.products_skipped
    );
    Ok(())
}

async fn apply(
    client: &SupabaseClient,
    plan: &SeedPlan,
    owner: Option<UserId>,
) -> Result<SeedSummary, SupabaseError> {
    let token = client.api_key();
    let mut summary = SeedSummary::default();

    let company = match client.company_by_slug(token, &plan.company.slug).await? {
        Some(existing) => {
            info!(company_id = %existing.id, "Company exists, topping up its catalog");
            existing
        }
        None => {
            let created = client.create_company(token, &plan.company).await?;
            info!(company_id = %created.id, "Company created");
            summary.company_created = true;
            created
        }
    };

    if let Some(owner) = owner {
        client.link_company(token, owner, company.id).await?;
        info!(user_id = %owner, "Company linked to owner profile");
    }

    seed_catalog(client, token, company.id, &plan.categories, &mut summary).await?;
    Ok(summary)
}

async fn seed_catalog(
    client: &SupabaseClient,
    token: &str,
    company_id: CompanyId,
    categories: &[CategoryPlan],
    summary: &mut SeedSummary,
) -> Result<(), SupabaseError> {
    let mut existing_categories = client.categories(token, company_id).await?;
    let existing_products = client.products(token, company_id).await?;

    for category in categories {
        let category_id = match existing_categories.iter().find(|c| c.name == category.name) {
            Some(existing) => {
                summary.categories_skipped += 1;
                existing.id
            }
            None => {
                let created = client
                    .create_category(
                        token,
                        &NewCategory {
                            company_id,
                            name: category.name.clone(),
                            description: category.description.clone(),
                            display_order: next_display_order(&existing_categories),
                        },
                    )
                    .await?;
                summary.categories_created += 1;
                let id = created.id;
                existing_categories.push(created);
                id
            }
        };

        for product in &category.products {
            let exists = existing_products
                .iter()
                .any(|p| p.category_id == Some(category_id) && p.name == product.name);
            if exists {
                summary.products_skipped += 1;
                continue;
            }
            client
                .create_product(
                    token,
                    &ProductInput {
                        company_id,
                        category_id: Some(category_id),
                        name: product.name.clone(),
                        description: product.description.clone(),
                        price: product.price,
                        image: product.image.clone(),
                        status: product.status,
                    },
                )
                .await?;
            summary.products_created += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> SeedFile {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_demo_seed_file_is_valid() {
        let plan = parse(include_str!("../../../../demo/seed.yaml")).plan().unwrap();
        assert_eq!(plan.company.slug.as_str(), "demo");
        assert!(!plan.categories.is_empty());
        assert!(plan.categories.iter().all(|c| !c.products.is_empty()));
    }

    #[test]
    fn test_plan_normalizes_values() {
        let plan = parse(
            r#"
company:
  name: "Café La Única"
  primary_color: "F97316"
categories:
  - name: Bebidas
    products:
      - name: Café de olla
        price: 25
      - name: Agua fresca
        price: "18.499"
        active: false
"#,
        )
        .plan()
        .unwrap();

        assert_eq!(plan.company.slug.as_str(), "cafe-la-unica");
        assert_eq!(plan.company.primary_color.as_deref(), Some("#f97316"));

        let products = &plan.categories[0].products;
        assert_eq!(products[0].price.fixed(), "25.00");
        assert_eq!(products[0].status, ProductStatus::Active);
        assert_eq!(products[1].price.fixed(), "18.50");
        assert_eq!(products[1].status, ProductStatus::Inactive);
    }

    #[test]
    fn test_plan_collects_every_error() {
        let errors = parse(
            r#"
company:
  name: "Demo"
  whatsapp: "sin número"
categories:
  - name: Tacos
    products:
      - name: Taco
        price: -1
      - name: Taco
        price: 10
  - name: Tacos
"#,
        )
        .plan()
        .unwrap_err();

        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(errors.iter().any(|e| e.starts_with("company.whatsapp")));
        assert!(errors.iter().any(|e| e.contains("price must be")));
        assert!(errors.iter().any(|e| e.contains("duplicate product")));
        assert!(errors.iter().any(|e| e.contains("duplicate category")));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result: Result<SeedFile, _> = serde_yaml::from_str(
            r"
company:
  name: Demo
  colour: red
",
        );
        assert!(result.is_err());
    }
}
