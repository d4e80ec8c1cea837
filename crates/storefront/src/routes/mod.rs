//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                               - Landing page
//!
//! # Menu
//! GET  /menu/{slug}                    - Tenant menu page (404 page for unknown slugs)
//!
//! # Cart (HTMX fragments, scoped to the tenant)
//! GET  /menu/{slug}/cart               - Cart panel fragment
//! GET  /menu/{slug}/cart/count         - Cart count badge fragment
//! POST /menu/{slug}/cart/add           - Add one unit (product_id)
//! POST /menu/{slug}/cart/update        - Change quantity (product_id, delta)
//! POST /menu/{slug}/cart/remove        - Remove item (product_id)
//!
//! # Checkout
//! POST /menu/{slug}/checkout           - Begin: show customer form
//! POST /menu/{slug}/checkout/back      - Back to the cart
//! POST /menu/{slug}/checkout/submit    - Send order: redirect to wa.me
//! ```

pub mod cart;
pub mod checkout;
pub mod home;
pub mod menu;

use std::sync::Arc;

use axum::{
    Form, Router,
    extract::FromRequest,
    routing::{get, post},
};
use menudigital_core::{Menu, Slug};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the tenant menu routes.
pub fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/menu/{slug}", get(menu::show))
        .route("/menu/{slug}/cart", get(cart::panel))
        .route("/menu/{slug}/cart/count", get(cart::count))
        .route("/menu/{slug}/cart/add", post(cart::add))
        .route("/menu/{slug}/cart/update", post(cart::update))
        .route("/menu/{slug}/cart/remove", post(cart::remove))
        .route("/menu/{slug}/checkout", post(checkout::begin))
        .route("/menu/{slug}/checkout/back", post(checkout::back))
        .route("/menu/{slug}/checkout/submit", post(checkout::submit))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(menu_routes())
}

/// A urlencoded form body. Unreadable bodies become
/// [`AppError::InvalidForm`], answered with an error toast like any other
/// shopper mistake.
#[derive(Debug, FromRequest)]
#[from_request(via(Form), rejection(AppError))]
pub struct ShopperForm<T>(pub T);

/// Normalize the slug from the path. Unusable slugs are simply unknown menus.
pub(crate) fn parse_slug(raw: &str) -> Result<Slug> {
    Slug::parse(raw).map_err(|_| AppError::MenuNotFound(raw.to_string()))
}

/// Resolve a tenant's menu or fail with [`AppError::MenuNotFound`].
pub(crate) async fn load_menu(state: &AppState, raw_slug: &str) -> Result<(Slug, Arc<Menu>)> {
    let slug = parse_slug(raw_slug)?;
    let menu = state
        .catalog()
        .menu(&slug)
        .await?
        .ok_or_else(|| AppError::MenuNotFound(slug.to_string()))?;
    Ok((slug, menu))
}
