//! Public menu page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use menudigital_core::Menu;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart_store::CartStore;
use crate::error::Result;
use crate::middleware::CspNonce;
use crate::routes::cart::CartView;
use crate::routes::load_menu;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub image: Option<String>,
}

/// A category heading with its products.
#[derive(Clone)]
pub struct SectionView {
    pub name: String,
    pub description: Option<String>,
    pub products: Vec<ProductView>,
}

/// Tenant header and sections.
#[derive(Clone)]
pub struct MenuView {
    pub name: String,
    pub slug: String,
    pub logo: Option<String>,
    /// CSS color for `--primary`, already `#`-prefixed
    pub theme_color: Option<String>,
    pub sections: Vec<SectionView>,
}

impl From<&Menu> for MenuView {
    fn from(menu: &Menu) -> Self {
        Self {
            name: menu.company.name.clone(),
            slug: menu.company.slug.to_string(),
            logo: menu.company.logo.clone(),
            theme_color: menu.company.theme_color().map(|c| c.to_string()),
            sections: menu
                .sections()
                .into_iter()
                .map(|section| SectionView {
                    name: section.category.name.clone(),
                    description: section.category.description.clone(),
                    products: section
                        .products
                        .into_iter()
                        .map(|p| ProductView {
                            id: p.id.to_string(),
                            name: p.name.clone(),
                            description: p.description.clone(),
                            price: p.price.to_string(),
                            image: p.image.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Full menu page, including the cart panel.
#[derive(Template, WebTemplate)]
#[template(path = "menu.html")]
pub struct MenuTemplate {
    pub menu: MenuView,
    pub cart: CartView,
    pub nonce: String,
}

/// Display a tenant's menu.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> Result<MenuTemplate> {
    let (slug, menu) = load_menu(&state, &slug).await?;

    let store = CartStore::new(&session, &slug);
    let cart = store.load().await?;
    let step = store.load_step().await?;

    Ok(MenuTemplate {
        menu: MenuView::from(menu.as_ref()),
        cart: CartView::new(&slug, &cart, step),
        nonce,
    })
}
