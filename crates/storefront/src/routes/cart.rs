//! Cart route handlers.
//!
//! Every handler answers with the re-rendered cart panel so htmx can swap
//! it in place, and emits `cart-updated` so the header badge follows.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use menudigital_core::{Cart, CheckoutStep, ProductId, Slug};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart_store::CartStore;
use crate::error::{AppError, Result};
use crate::htmx::{CART_UPDATED, HxTrigger, Toast};
use crate::routes::{ShopperForm, load_menu, parse_slug};
use crate::state::AppState;

/// One cart line prepared for display.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    /// Unit price, shown as `$x.xx c/u`
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

/// Cart panel state for templates.
#[derive(Clone)]
pub struct CartView {
    pub slug: String,
    pub items: Vec<CartItemView>,
    pub total: String,
    pub count: u32,
    /// The customer details form replaces the item list.
    pub collecting_details: bool,
}

impl CartView {
    #[must_use]
    pub fn new(slug: &Slug, cart: &Cart, step: CheckoutStep) -> Self {
        Self {
            slug: slug.to_string(),
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView {
                    id: item.id.to_string(),
                    name: item.name.clone(),
                    unit_price: item.price.to_string(),
                    quantity: item.quantity,
                    line_total: item.line_total().to_string(),
                })
                .collect(),
            total: cart.total().to_string(),
            count: cart.count(),
            collecting_details: step == CheckoutStep::CustomerInfo && !cart.is_empty(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart panel fragment.
#[derive(Template, WebTemplate)]
#[template(path = "cart/_panel.html")]
pub struct CartPanelTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment.
#[derive(Template, WebTemplate)]
#[template(path = "cart/_count.html")]
pub struct CartCountTemplate {
    pub slug: String,
    pub count: u32,
}

/// Form input naming a product.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub product_id: ProductId,
}

/// Form input for a quantity change.
#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    pub product_id: ProductId,
    pub delta: i64,
}

/// Render the cart panel for the current step.
#[instrument(skip(session))]
pub async fn panel(Path(slug): Path<String>, session: Session) -> Result<CartPanelTemplate> {
    let slug = parse_slug(&slug)?;
    let store = CartStore::new(&session, &slug);
    let cart = store.load().await?;
    let step = store.load_step().await?;

    Ok(CartPanelTemplate {
        cart: CartView::new(&slug, &cart, step),
    })
}

/// Render the cart count badge.
#[instrument(skip(session))]
pub async fn count(Path(slug): Path<String>, session: Session) -> Result<CartCountTemplate> {
    let slug = parse_slug(&slug)?;
    let cart = CartStore::new(&session, &slug).load().await?;

    Ok(CartCountTemplate {
        slug: slug.to_string(),
        count: cart.count(),
    })
}

/// Add one unit of a product.
///
/// The item is snapshotted from the catalog, so only products the tenant
/// currently offers can be added.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    session: Session,
    ShopperForm(form): ShopperForm<ProductForm>,
) -> Result<impl IntoResponse> {
    let (slug, menu) = load_menu(&state, &slug).await?;
    let product = menu
        .orderable_product(form.product_id)
        .ok_or(AppError::ProductUnavailable)?;

    let store = CartStore::new(&session, &slug);
    let mut cart = store.load().await?;
    let quantity = cart.add_item(product);
    store.save(&cart).await?;
    let step = store.load_step().await?;

    tracing::debug!(product_id = %product.id, quantity, "Added to cart");

    let trigger = HxTrigger::new()
        .event(CART_UPDATED)
        .toast(Toast::success("Agregado al carrito"));
    Ok((
        trigger,
        CartPanelTemplate {
            cart: CartView::new(&slug, &cart, step),
        },
    ))
}

/// Change a quantity by a signed delta. Reaching zero removes the item.
#[instrument(skip(session))]
pub async fn update(
    Path(slug): Path<String>,
    session: Session,
    ShopperForm(form): ShopperForm<UpdateForm>,
) -> Result<impl IntoResponse> {
    let slug = parse_slug(&slug)?;
    let store = CartStore::new(&session, &slug);
    let mut cart = store.load().await?;
    if cart.update_quantity(form.product_id, form.delta) {
        store.save(&cart).await?;
    }
    let step = store.load_step().await?;

    Ok((
        HxTrigger::new().event(CART_UPDATED),
        CartPanelTemplate {
            cart: CartView::new(&slug, &cart, step),
        },
    ))
}

/// Remove an item regardless of quantity.
#[instrument(skip(session))]
pub async fn remove(
    Path(slug): Path<String>,
    session: Session,
    ShopperForm(form): ShopperForm<ProductForm>,
) -> Result<impl IntoResponse> {
    let slug = parse_slug(&slug)?;
    let store = CartStore::new(&session, &slug);
    let mut cart = store.load().await?;
    if cart.remove_item(form.product_id) {
        store.save(&cart).await?;
    }
    let step = store.load_step().await?;

    Ok((
        HxTrigger::new().event(CART_UPDATED),
        CartPanelTemplate {
            cart: CartView::new(&slug, &cart, step),
        },
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use menudigital_core::{Price, Product, ProductStatus};

    fn product(name: &str, price: &str) -> Product {
        Product {
            id: ProductId::generate(),
            company_id: menudigital_core::CompanyId::generate(),
            category_id: None,
            name: name.to_string(),
            description: None,
            price: Price::parse(price).unwrap(),
            image: None,
            status: ProductStatus::Active,
            created_at: None,
        }
    }

    #[test]
    fn test_cart_view_formats_prices() {
        let slug = Slug::parse("demo").unwrap();
        let taco = product("Taco", "2.5");
        let mut cart = Cart::new();
        cart.add_item(&taco);
        cart.add_item(&taco);

        let view = CartView::new(&slug, &cart, CheckoutStep::Cart);
        assert_eq!(view.count, 2);
        assert_eq!(view.total, "$5.00");
        assert_eq!(view.items[0].unit_price, "$2.50");
        assert_eq!(view.items[0].line_total, "$5.00");
        assert!(!view.collecting_details);
    }

    #[test]
    fn test_empty_cart_never_shows_details_form() {
        let slug = Slug::parse("demo").unwrap();
        let view = CartView::new(&slug, &Cart::new(), CheckoutStep::CustomerInfo);
        assert!(view.is_empty());
        assert!(!view.collecting_details);
    }
}
