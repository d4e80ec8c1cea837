//! Dashboard overview.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, routing::get};
use menudigital_core::Product;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireCompany;
use crate::routes::Layout;
use crate::state::AppState;

/// Catalog counts shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogStats {
    pub categories: usize,
    pub products: usize,
    pub active_products: usize,
    pub uncategorized: usize,
}

impl CatalogStats {
    #[must_use]
    pub fn new(category_count: usize, products: &[Product]) -> Self {
        Self {
            categories: category_count,
            products: products.len(),
            active_products: products.iter().filter(|p| p.status.is_active()).count(),
            uncategorized: products.iter().filter(|p| p.category_id.is_none()).count(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    layout: Layout,
    stats: CatalogStats,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

/// GET /
#[instrument(skip_all)]
async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireCompany { admin, company }: RequireCompany,
) -> Result<DashboardTemplate> {
    let supabase = state.supabase();
    let (categories, products) = tokio::try_join!(
        supabase.categories(&admin.access_token, company.id),
        supabase.products(&admin.access_token, company.id),
    )?;

    Ok(DashboardTemplate {
        layout: Layout::load(&state, &session, &admin, "/").await,
        stats: CatalogStats::new(categories.len(), &products),
    })
}
