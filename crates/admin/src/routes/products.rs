//! Product management.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, State},
    response::Redirect,
    routing::{get, post},
};
use menudigital_core::{Category, CategoryId, Product, ProductId};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::forms::ProductForm;
use crate::middleware::RequireCompany;
use crate::models::FormDraft;
use crate::routes::{Layout, flash_redirect, flash_redirect_keeping};
use crate::state::AppState;

/// Product display data for the list and its edit forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Two decimals, no currency sign, for the price input
    pub price: String,
    pub image: String,
    pub category_id: String,
    /// Category name, or "Sin categoría" when unfiled or the category is gone
    pub category_name: String,
    pub active: bool,
    /// Show the edit form expanded
    pub open: bool,
}

impl ProductRow {
    /// Rows in the order given (newest first), with category names resolved.
    #[must_use]
    pub fn build(products: &[Product], categories: &[Category]) -> Vec<Self> {
        let names: HashMap<CategoryId, &str> = categories
            .iter()
            .map(|c| (c.id, c.name.as_str()))
            .collect();

        products
            .iter()
            .map(|p| Self {
                id: p.id.to_string(),
                name: p.name.clone(),
                description: p.description.clone().unwrap_or_default(),
                price: p.price.fixed(),
                image: p.image.clone().unwrap_or_default(),
                category_id: p.category_id.map(|id| id.to_string()).unwrap_or_default(),
                category_name: p
                    .category_id
                    .and_then(|id| names.get(&id))
                    .map_or_else(|| "Sin categoría".to_string(), |name| (*name).to_string()),
                active: p.status.is_active(),
                open: false,
            })
            .collect()
    }

    /// Empty values for the "new product" form; new products start active.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            description: String::new(),
            price: String::new(),
            image: String::new(),
            category_id: String::new(),
            category_name: String::new(),
            active: true,
            open: false,
        }
    }

    /// Replace the editable values with those of a failed post.
    #[must_use]
    pub fn with_draft(self, form: ProductForm) -> Self {
        Self {
            name: form.name,
            description: form.description,
            price: form.price,
            image: form.image,
            category_id: form.category_id,
            active: form.active.is_some(),
            open: true,
            ..self
        }
    }

    /// Rows and the new-product form, with `draft` applied to the form it
    /// was posted from.
    #[must_use]
    pub fn with_pending_draft(
        mut rows: Vec<Self>,
        draft: Option<FormDraft<ProductForm>>,
    ) -> (Vec<Self>, Self) {
        let Some(draft) = draft else {
            return (rows, Self::blank());
        };
        if let Some(form) = draft.clone().for_action("/products") {
            return (rows, Self::blank().with_draft(form));
        }
        if let Some(row) = rows
            .iter_mut()
            .find(|row| draft.action == format!("/products/{}", row.id))
        {
            *row = row.clone().with_draft(draft.form);
        }
        (rows, Self::blank())
    }
}

/// A choice in the category select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
struct ProductsTemplate {
    layout: Layout,
    products: Vec<ProductRow>,
    categories: Vec<CategoryOption>,
    /// Always `Some`; lets the new-product form share the edit fields
    blank: Option<ProductRow>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/{id}", post(update))
        .route("/products/{id}/delete", post(delete))
}

/// GET /products
#[instrument(skip_all)]
async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireCompany { admin, company }: RequireCompany,
) -> Result<ProductsTemplate> {
    let supabase = state.supabase();
    let (products, categories) = tokio::try_join!(
        supabase.products(&admin.access_token, company.id),
        supabase.categories(&admin.access_token, company.id),
    )?;

    let draft = FormDraft::<ProductForm>::take(&session).await;
    let (products, blank) =
        ProductRow::with_pending_draft(ProductRow::build(&products, &categories), draft);

    Ok(ProductsTemplate {
        layout: Layout::load(&state, &session, &admin, "/products").await,
        products,
        categories: categories
            .iter()
            .map(|c| CategoryOption {
                id: c.id.to_string(),
                name: c.name.clone(),
            })
            .collect(),
        blank: Some(blank),
    })
}

/// POST /products
#[instrument(skip_all)]
async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireCompany { admin, company }: RequireCompany,
    Form(form): Form<ProductForm>,
) -> Result<Redirect> {
    let outcome = async {
        let input = form.parse(company.id)?;
        let product = state
            .supabase()
            .create_product(&admin.access_token, &input)
            .await?;
        tracing::info!(product_id = %product.id, "Product created");
        Ok::<_, AppError>(())
    }
    .await;

    let draft = FormDraft::new("/products", form);
    flash_redirect_keeping(&session, outcome, draft, "Producto creado", "/products").await
}

/// POST /products/{id}
#[instrument(skip_all)]
async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireCompany { admin, company }: RequireCompany,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Redirect> {
    let outcome = async {
        let input = form.parse(company.id)?;
        state
            .supabase()
            .update_product(&admin.access_token, id, &input)
            .await?;
        tracing::info!(product_id = %id, "Product updated");
        Ok::<_, AppError>(())
    }
    .await;

    let draft = FormDraft::new(format!("/products/{id}"), form);
    flash_redirect_keeping(&session, outcome, draft, "Producto actualizado", "/products").await
}

/// POST /products/{id}/delete
#[instrument(skip_all)]
async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireCompany { admin, company }: RequireCompany,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    let outcome = state
        .supabase()
        .delete_product(&admin.access_token, company.id, id)
        .await
        .map_err(AppError::from);
    if outcome.is_ok() {
        tracing::info!(product_id = %id, "Product deleted");
    }
    flash_redirect(&session, outcome, "Producto eliminado", "/products").await
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use menudigital_core::{CompanyId, Price, ProductStatus};
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::models::Flash;

    #[test]
    fn test_rows_resolve_category_names() {
        let company_id = CompanyId::generate();
        let tacos = Category {
            id: CategoryId::generate(),
            company_id,
            name: "Tacos".to_string(),
            description: None,
            display_order: 0,
        };
        let filed = Product {
            id: ProductId::generate(),
            company_id,
            category_id: Some(tacos.id),
            name: "Pastor".to_string(),
            description: Some("Con piña".to_string()),
            price: Price::from_cents(2550),
            image: None,
            status: ProductStatus::Active,
            created_at: None,
        };
        let orphaned = Product {
            id: ProductId::generate(),
            category_id: Some(CategoryId::generate()),
            name: "Agua".to_string(),
            description: None,
            status: ProductStatus::Inactive,
            ..filed.clone()
        };

        let rows = ProductRow::build(&[filed, orphaned], &[tacos]);
        assert_eq!(rows[0].category_name, "Tacos");
        assert_eq!(rows[0].price, "25.50");
        assert_eq!(rows[0].description, "Con piña");
        assert!(rows[0].active);
        assert_eq!(rows[1].category_name, "Sin categoría");
        assert!(!rows[1].active);
    }

    fn rows() -> Vec<ProductRow> {
        let company_id = CompanyId::generate();
        let product = Product {
            id: ProductId::generate(),
            company_id,
            category_id: None,
            name: "Pastor".to_string(),
            description: None,
            price: Price::from_cents(2500),
            image: None,
            status: ProductStatus::Active,
            created_at: None,
        };
        ProductRow::build(&[product], &[])
    }

    fn typed() -> ProductForm {
        ProductForm {
            name: "Taco de suadero".to_string(),
            price: "diez".to_string(),
            ..ProductForm::default()
        }
    }

    #[test]
    fn test_failed_create_refills_new_product_form() {
        let draft = FormDraft::new("/products", typed());
        let (rows, blank) = ProductRow::with_pending_draft(rows(), Some(draft));

        assert_eq!(blank.name, "Taco de suadero");
        assert_eq!(blank.price, "diez");
        assert!(!blank.active);
        assert_eq!(rows[0].name, "Pastor");
        assert!(!rows[0].open);
    }

    #[test]
    fn test_failed_update_refills_and_opens_its_row() {
        let rows = rows();
        let draft = FormDraft::new(format!("/products/{}", rows[0].id), typed());
        let (rows, blank) = ProductRow::with_pending_draft(rows, Some(draft));

        assert_eq!(rows[0].name, "Taco de suadero");
        assert!(rows[0].open);
        assert_eq!(rows[0].category_name, "Sin categoría");
        assert_eq!(blank, ProductRow::blank());
    }

    #[tokio::test]
    async fn test_rejected_product_comes_back_filled_in() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let company_id = CompanyId::generate();
        let form = typed();

        let outcome = form.parse(company_id);
        let _redirect = flash_redirect_keeping(
            &session,
            outcome,
            FormDraft::new("/products", form),
            "Producto creado",
            "/products",
        )
        .await
        .unwrap();

        let draft = FormDraft::<ProductForm>::take(&session).await;
        let (products, blank) = ProductRow::with_pending_draft(rows(), draft);
        let page = ProductsTemplate {
            layout: Layout {
                admin_name: "Dueño".to_string(),
                email: "dueno@example.com".to_string(),
                company_name: Some("Taquería Demo".to_string()),
                menu_url: None,
                current_path: "/products",
                flash: Flash::take(&session).await,
            },
            products,
            categories: Vec::new(),
            blank: Some(blank),
        };
        let html = page.render().unwrap();

        assert!(html.contains("value=\"Taco de suadero\""));
        assert!(html.contains("value=\"diez\""));
        assert!(html.contains("El precio debe ser un número"));
    }
}
