//! Checkout route handlers.
//!
//! The step lives in the session next to the cart, so each request resumes
//! the [`CheckoutFlow`] where the previous one left it.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use menudigital_core::{CheckoutCommand, CheckoutFlow, CheckoutOutcome, OrderForm};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart_store::CartStore;
use crate::error::Result;
use crate::htmx::{CART_UPDATED, HxRedirect, HxTrigger, Toast};
use crate::routes::cart::{CartPanelTemplate, CartView};
use crate::routes::{ShopperForm, load_menu};
use crate::state::AppState;

/// Shown once the WhatsApp link has been handed to the browser.
pub const ORDER_SENT_MESSAGE: &str = "Pedido enviado con éxito. ¡Gracias por tu compra!";

/// Run one command against the stored cart and step.
///
/// Rejected commands leave both untouched.
async fn run(
    state: &AppState,
    raw_slug: &str,
    session: &Session,
    command: CheckoutCommand,
) -> Result<(CheckoutOutcome, CartView)> {
    let (slug, menu) = load_menu(state, raw_slug).await?;
    let store = CartStore::new(session, &slug);
    let mut cart = store.load().await?;
    let mut flow = CheckoutFlow::resume(store.load_step().await?);

    let outcome = flow.handle(command, &mut cart, &menu.company)?;

    if matches!(outcome, CheckoutOutcome::Submitted(_)) {
        store.clear().await?;
    } else {
        store.save_step(flow.step()).await?;
    }

    Ok((outcome, CartView::new(&slug, &cart, flow.step())))
}

/// Move to the customer details form.
#[instrument(skip(state, session))]
pub async fn begin(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    session: Session,
) -> Result<CartPanelTemplate> {
    let (_, cart) = run(&state, &slug, &session, CheckoutCommand::Begin).await?;
    Ok(CartPanelTemplate { cart })
}

/// Return to the cart, discarding typed details.
#[instrument(skip(state, session))]
pub async fn back(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    session: Session,
) -> Result<CartPanelTemplate> {
    let (_, cart) = run(&state, &slug, &session, CheckoutCommand::Back).await?;
    Ok(CartPanelTemplate { cart })
}

/// Submit the order and send the shopper to WhatsApp.
///
/// htmx requests get an `HX-Redirect` plus the emptied panel; plain form
/// posts get a 303 to the `wa.me` link.
#[instrument(skip(state, session, headers, form))]
pub async fn submit(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    session: Session,
    headers: HeaderMap,
    ShopperForm(form): ShopperForm<OrderForm>,
) -> Result<Response> {
    let (outcome, cart) = run(&state, &slug, &session, CheckoutCommand::Submit(form)).await?;

    let CheckoutOutcome::Submitted(link) = outcome else {
        return Ok(CartPanelTemplate { cart }.into_response());
    };

    tracing::info!(slug = %cart.slug, "Order handed off to WhatsApp");

    if headers.contains_key("hx-request") {
        let trigger = HxTrigger::new()
            .event(CART_UPDATED)
            .toast(Toast::success(ORDER_SENT_MESSAGE));
        Ok((HxRedirect(link.url), trigger, CartPanelTemplate { cart }).into_response())
    } else {
        Ok(Redirect::to(&link.url).into_response())
    }
}
