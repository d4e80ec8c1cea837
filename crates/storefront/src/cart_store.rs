//! Session-backed cart persistence.
//!
//! Each shopper's session holds one cart per tenant under `cart-<slug>`,
//! plus the checkout step under `checkout-<slug>`. The whole cart is
//! rewritten after every mutation; there is no partial update, so the last
//! write wins.

use menudigital_core::{Cart, CheckoutStep, Slug};
use thiserror::Error;
use tower_sessions::Session;
use tower_sessions::session;

#[derive(Debug, Error)]
pub enum CartStoreError {
    #[error("session store error: {0}")]
    Session(#[from] session::Error),
}

/// Cart storage for one tenant within one shopper's session.
pub struct CartStore<'a> {
    session: &'a Session,
    cart_key: String,
    step_key: String,
}

impl<'a> CartStore<'a> {
    #[must_use]
    pub fn new(session: &'a Session, slug: &Slug) -> Self {
        Self {
            session,
            cart_key: format!("cart-{slug}"),
            step_key: format!("checkout-{slug}"),
        }
    }

    /// Load the stored cart, or an empty cart if none was saved.
    ///
    /// A stored value that no longer deserializes is discarded with a
    /// warning rather than locking the shopper out of the menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn load(&self) -> Result<Cart, CartStoreError> {
        match self.session.get::<Cart>(&self.cart_key).await {
            Ok(cart) => Ok(cart.unwrap_or_default()),
            Err(session::Error::SerdeJson(e)) => {
                tracing::warn!(key = %self.cart_key, error = %e, "Discarding unreadable stored cart");
                Ok(Cart::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the stored cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn save(&self, cart: &Cart) -> Result<(), CartStoreError> {
        self.session.insert(&self.cart_key, cart).await?;
        Ok(())
    }

    /// Remove the stored cart and checkout step.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn clear(&self) -> Result<(), CartStoreError> {
        self.session.remove_value(&self.cart_key).await?;
        self.session.remove_value(&self.step_key).await?;
        Ok(())
    }

    /// The checkout step, defaulting to [`CheckoutStep::Cart`].
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn load_step(&self) -> Result<CheckoutStep, CartStoreError> {
        Ok(self
            .session
            .get::<CheckoutStep>(&self.step_key)
            .await?
            .unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn save_step(&self, step: CheckoutStep) -> Result<(), CartStoreError> {
        self.session.insert(&self.step_key, step).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use menudigital_core::{CompanyId, Price, Product, ProductId, ProductStatus};
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn taco() -> Product {
        Product {
            id: ProductId::generate(),
            company_id: CompanyId::generate(),
            category_id: None,
            name: "Taco".to_string(),
            description: Some("Al pastor".to_string()),
            price: Price::from_cents(250),
            image: None,
            status: ProductStatus::Active,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_missing_cart_loads_empty() {
        let session = session();
        let store = CartStore::new(&session, &Slug::parse("demo").unwrap());
        assert!(store.load().await.unwrap().is_empty());
        assert_eq!(store.load_step().await.unwrap(), CheckoutStep::Cart);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let session = session();
        let store = CartStore::new(&session, &Slug::parse("demo").unwrap());

        let mut cart = Cart::new();
        let taco = taco();
        cart.add_item(&taco);
        cart.add_item(&taco);
        store.save(&cart).await.unwrap();

        assert_eq!(store.load().await.unwrap(), cart);
    }

    #[tokio::test]
    async fn test_carts_are_tenant_scoped() {
        let session = session();
        let demo = CartStore::new(&session, &Slug::parse("demo").unwrap());
        let other = CartStore::new(&session, &Slug::parse("otro").unwrap());

        let mut cart = Cart::new();
        cart.add_item(&taco());
        demo.save(&cart).await.unwrap();

        assert!(other.load().await.unwrap().is_empty());
        assert_eq!(demo.load().await.unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_clear_removes_cart_and_step() {
        let session = session();
        let store = CartStore::new(&session, &Slug::parse("demo").unwrap());

        let mut cart = Cart::new();
        cart.add_item(&taco());
        store.save(&cart).await.unwrap();
        store.save_step(CheckoutStep::CustomerInfo).await.unwrap();

        store.clear().await.unwrap();
        assert!(session.get_value("cart-demo").await.unwrap().is_none());
        assert_eq!(store.load_step().await.unwrap(), CheckoutStep::Cart);
    }

    #[tokio::test]
    async fn test_unreadable_cart_is_discarded() {
        let session = session();
        session
            .insert("cart-demo", serde_json::json!({"not": "a cart"}))
            .await
            .unwrap();

        let store = CartStore::new(&session, &Slug::parse("demo").unwrap());
        assert!(store.load().await.unwrap().is_empty());
    }
}
