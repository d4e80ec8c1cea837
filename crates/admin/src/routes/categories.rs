//! Category management.
//!
//! Categories are listed by `display_order`. New ones go last; deleting one
//! renumbers the rest `0..n` so the order stays gap-free.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, State},
    response::Redirect,
    routing::{get, post},
};
use menudigital_core::{Category, CategoryId, CompanyId, Product, next_display_order, resequence};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::forms::CategoryForm;
use crate::middleware::RequireCompany;
use crate::models::FormDraft;
use crate::routes::{Layout, flash_redirect, flash_redirect_keeping};
use crate::state::AppState;
use crate::supabase::NewCategory;

/// One row of the category table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub position: i32,
    pub product_count: usize,
    /// Show the edit form expanded
    pub open: bool,
}

impl CategoryRow {
    /// Rows in display order, each with the number of products filed under it.
    #[must_use]
    pub fn build(categories: &[Category], products: &[Product]) -> Vec<Self> {
        let mut counts: HashMap<CategoryId, usize> = HashMap::new();
        for category_id in products.iter().filter_map(|p| p.category_id) {
            *counts.entry(category_id).or_default() += 1;
        }

        let mut rows: Vec<Self> = categories
            .iter()
            .map(|c| Self {
                id: c.id.to_string(),
                name: c.name.clone(),
                description: c.description.clone().unwrap_or_default(),
                position: c.display_order + 1,
                product_count: counts.get(&c.id).copied().unwrap_or(0),
                open: false,
            })
            .collect();
        rows.sort_by_key(|row| row.position);
        rows
    }

    /// Apply the values of a failed post to the rows or the new-category
    /// form, whichever it was posted from.
    #[must_use]
    pub fn with_pending_draft(
        mut rows: Vec<Self>,
        draft: Option<FormDraft<CategoryForm>>,
    ) -> (Vec<Self>, CategoryForm) {
        let Some(draft) = draft else {
            return (rows, CategoryForm::default());
        };
        if let Some(form) = draft.clone().for_action("/categories") {
            return (rows, form);
        }
        if let Some(row) = rows
            .iter_mut()
            .find(|row| draft.action == format!("/categories/{}", row.id))
        {
            row.name = draft.form.name;
            row.description = draft.form.description;
            row.open = true;
        }
        (rows, CategoryForm::default())
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
struct CategoriesTemplate {
    layout: Layout,
    categories: Vec<CategoryRow>,
    new_category: CategoryForm,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(index).post(create))
        .route("/categories/{id}", post(update))
        .route("/categories/{id}/delete", post(delete))
}

/// GET /categories
#[instrument(skip_all)]
async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireCompany { admin, company }: RequireCompany,
) -> Result<CategoriesTemplate> {
    let supabase = state.supabase();
    let (categories, products) = tokio::try_join!(
        supabase.categories(&admin.access_token, company.id),
        supabase.products(&admin.access_token, company.id),
    )?;

    let draft = FormDraft::<CategoryForm>::take(&session).await;
    let (categories, new_category) =
        CategoryRow::with_pending_draft(CategoryRow::build(&categories, &products), draft);

    Ok(CategoriesTemplate {
        layout: Layout::load(&state, &session, &admin, "/categories").await,
        categories,
        new_category,
    })
}

/// POST /categories
#[instrument(skip_all)]
async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireCompany { admin, company }: RequireCompany,
    Form(form): Form<CategoryForm>,
) -> Result<Redirect> {
    let outcome = async {
        let changes = form.parse()?;
        let supabase = state.supabase();
        let existing = supabase.categories(&admin.access_token, company.id).await?;
        let category = supabase
            .create_category(
                &admin.access_token,
                &NewCategory {
                    company_id: company.id,
                    name: changes.name,
                    description: changes.description,
                    display_order: next_display_order(&existing),
                },
            )
            .await?;
        tracing::info!(category_id = %category.id, display_order = category.display_order, "Category created");
        Ok::<_, AppError>(())
    }
    .await;

    let draft = FormDraft::new("/categories", form);
    flash_redirect_keeping(&session, outcome, draft, "Categoría creada", "/categories").await
}

/// POST /categories/{id}
#[instrument(skip_all)]
async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireCompany { admin, company }: RequireCompany,
    Path(id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Result<Redirect> {
    let outcome = async {
        let changes = form.parse()?;
        state
            .supabase()
            .update_category(&admin.access_token, company.id, id, &changes)
            .await?;
        tracing::info!(category_id = %id, "Category updated");
        Ok::<_, AppError>(())
    }
    .await;

    let draft = FormDraft::new(format!("/categories/{id}"), form);
    flash_redirect_keeping(&session, outcome, draft, "Categoría actualizada", "/categories").await
}

/// POST /categories/{id}/delete
#[instrument(skip_all)]
async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireCompany { admin, company }: RequireCompany,
    Path(id): Path<CategoryId>,
) -> Result<Redirect> {
    let outcome = delete_and_resequence(&state, &admin.access_token, company.id, id).await;
    flash_redirect(&session, outcome, "Categoría eliminada", "/categories").await
}

async fn delete_and_resequence(
    state: &AppState,
    token: &str,
    company_id: CompanyId,
    id: CategoryId,
) -> Result<()> {
    let supabase = state.supabase();
    supabase.delete_category(token, company_id, id).await?;

    let remaining = supabase.categories(token, company_id).await?;
    let changes = resequence(&remaining);
    for (category_id, display_order) in &changes {
        supabase
            .set_display_order(token, company_id, *category_id, *display_order)
            .await?;
    }

    tracing::info!(category_id = %id, renumbered = changes.len(), "Category deleted");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use menudigital_core::{Price, ProductId, ProductStatus};

    use super::*;

    fn category(name: &str, display_order: i32, company_id: CompanyId) -> Category {
        Category {
            id: CategoryId::generate(),
            company_id,
            name: name.to_string(),
            description: None,
            display_order,
        }
    }

    fn product(category_id: Option<CategoryId>, company_id: CompanyId) -> Product {
        Product {
            id: ProductId::generate(),
            company_id,
            category_id,
            name: "Taco".to_string(),
            description: None,
            price: Price::from_cents(250),
            image: None,
            status: ProductStatus::Active,
            created_at: None,
        }
    }

    #[test]
    fn test_rows_are_ordered_and_counted() {
        let company_id = CompanyId::generate();
        let bebidas = category("Bebidas", 1, company_id);
        let tacos = category("Tacos", 0, company_id);
        let products = vec![
            product(Some(tacos.id), company_id),
            product(Some(tacos.id), company_id),
            product(None, company_id),
        ];

        let rows = CategoryRow::build(&[bebidas, tacos], &products);
        let summary: Vec<_> = rows
            .iter()
            .map(|r| (r.name.as_str(), r.position, r.product_count))
            .collect();
        assert_eq!(summary, vec![("Tacos", 1, 2), ("Bebidas", 2, 0)]);
    }

    #[test]
    fn test_failed_posts_refill_their_form() {
        let company_id = CompanyId::generate();
        let rows = CategoryRow::build(&[category("Tacos", 0, company_id)], &[]);
        let typed = CategoryForm {
            name: "  ".to_string(),
            description: "Del día".to_string(),
        };

        let draft = FormDraft::new("/categories", typed.clone());
        let (unchanged, new_category) = CategoryRow::with_pending_draft(rows.clone(), Some(draft));
        assert_eq!(new_category, typed);
        assert_eq!(unchanged, rows);

        let draft = FormDraft::new(format!("/categories/{}", rows[0].id), typed);
        let (edited, new_category) = CategoryRow::with_pending_draft(rows, Some(draft));
        assert_eq!(new_category, CategoryForm::default());
        assert_eq!(edited[0].description, "Del día");
        assert!(edited[0].open);
    }
}
