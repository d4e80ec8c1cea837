//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Health check
//! GET  /health/ready                - Readiness (database)
//!
//! # Dashboard
//! GET  /                            - Counts and menu link
//!
//! # Auth (rate limited POSTs)
//! GET  /auth/login                  - Sign-in page
//! POST /auth/login                  - Sign in with email and password
//! GET  /auth/register               - Sign-up page
//! POST /auth/register               - Create an account
//! POST /auth/logout                 - Sign out
//!
//! # Company
//! GET  /settings                    - Onboarding / company settings
//! POST /settings                    - Create or update the company
//! GET  /profile                     - Restaurant profile
//! POST /profile                     - Update profile (multipart, logo upload)
//!
//! # Catalog
//! GET  /categories                  - Category list
//! POST /categories                  - Create category
//! POST /categories/{id}             - Update category
//! POST /categories/{id}/delete      - Delete category and re-sequence
//! GET  /products                    - Product list
//! POST /products                    - Create product
//! POST /products/{id}               - Update product
//! POST /products/{id}/delete        - Delete product
//! ```
//!
//! Every form post ends in a flash notice and a redirect to the page that
//! lists the changed records, which re-fetches them. A failed create or
//! update also leaves a [`FormDraft`] so that page shows the typed values
//! again.

use axum::{Router, response::Redirect};
use serde::{Serialize, de::DeserializeOwned};
use tower_sessions::Session;

use crate::error::{AppError, Result};
use crate::models::{CurrentAdmin, Flash, FormDraft};
use crate::state::AppState;

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod products;
pub mod profile;
pub mod settings;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(settings::router())
        .merge(profile::router())
        .merge(categories::router())
        .merge(products::router())
}

/// Page chrome shared by every signed-in page.
pub struct Layout {
    pub admin_name: String,
    pub email: String,
    pub company_name: Option<String>,
    /// Public menu link, once a company exists
    pub menu_url: Option<String>,
    /// Path of the current page, for the active nav item
    pub current_path: &'static str,
    pub flash: Option<Flash>,
}

impl Layout {
    /// Build the chrome and consume the pending flash notice.
    pub async fn load(
        state: &AppState,
        session: &Session,
        admin: &CurrentAdmin,
        current_path: &'static str,
    ) -> Self {
        Self {
            admin_name: admin.display_name().to_string(),
            email: admin.email.clone(),
            company_name: admin.company.as_ref().map(|c| c.name.clone()),
            menu_url: admin
                .company
                .as_ref()
                .map(|c| state.config().menu_url(c.slug.as_str())),
            current_path,
            flash: Flash::take(session).await,
        }
    }

    /// Whether `path` is the current nav item.
    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        self.current_path == path
    }
}

/// Turn a form outcome into a flash notice and redirect to `to`.
///
/// Errors are reported (server-side failures reach Sentry) and shown with
/// their public message; the owner's data is left as it was.
///
/// # Errors
///
/// Returns an error only if the notice cannot be written to the session.
pub async fn flash_redirect<T>(
    session: &Session,
    outcome: Result<T>,
    success: &str,
    to: &str,
) -> Result<Redirect> {
    let flash = match outcome {
        Ok(_) => Flash::success(success),
        Err(err) => {
            err.report();
            Flash::error(err.public_message())
        }
    };
    flash.set(session).await.map_err(AppError::from)?;
    Ok(Redirect::to(to))
}

/// [`flash_redirect`] that keeps `draft` in the session when `outcome` failed.
///
/// # Errors
///
/// Returns an error only if the notice or draft cannot be written.
pub async fn flash_redirect_keeping<T, F>(
    session: &Session,
    outcome: Result<T>,
    draft: FormDraft<F>,
    success: &str,
    to: &str,
) -> Result<Redirect>
where
    F: Serialize + DeserializeOwned + Send + Sync,
{
    if outcome.is_err() {
        draft.set(session).await.map_err(AppError::from)?;
    }
    flash_redirect(session, outcome, success, to).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::response::IntoResponse;
    use tower_sessions::{MemoryStore, Session};

    use menudigital_core::CompanyId;

    use super::*;
    use crate::forms::{CategoryForm, ProductForm};
    use crate::models::FlashLevel;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_flash_redirect_success() {
        let session = session();
        let redirect = flash_redirect(&session, Ok(()), "Categoría creada", "/categories")
            .await
            .unwrap();

        let response = redirect.into_response();
        assert_eq!(response.headers()["location"], "/categories");

        let flash = Flash::take(&session).await.unwrap();
        assert_eq!(flash.level, FlashLevel::Success);
        assert_eq!(flash.message, "Categoría creada");
    }

    #[tokio::test]
    async fn test_flash_redirect_shows_validation_message() {
        let session = session();
        let outcome: Result<()> = Err(AppError::Validation("El nombre es obligatorio".into()));
        let redirect = flash_redirect(&session, outcome, "Guardado", "/products")
            .await
            .unwrap();
        assert_eq!(redirect.into_response().headers()["location"], "/products");

        let flash = Flash::take(&session).await.unwrap();
        assert_eq!(flash.level, FlashLevel::Error);
        assert_eq!(flash.message, "El nombre es obligatorio");
    }

    #[tokio::test]
    async fn test_flash_redirect_hides_internal_details() {
        let session = session();
        let outcome: Result<()> = Err(AppError::Internal("pool exhausted".into()));
        let _redirect = flash_redirect(&session, outcome, "Guardado", "/").await.unwrap();

        let flash = Flash::take(&session).await.unwrap();
        assert!(!flash.message.contains("pool"));
    }

    #[tokio::test]
    async fn test_failed_post_keeps_typed_values() {
        let session = session();
        let form = ProductForm {
            name: "Taco de suadero".to_string(),
            price: "diez".to_string(),
            ..ProductForm::default()
        };
        let outcome = form.parse(CompanyId::generate());
        let _redirect = flash_redirect_keeping(
            &session,
            outcome,
            FormDraft::new("/products", form.clone()),
            "Producto creado",
            "/products",
        )
        .await
        .unwrap();

        let draft = FormDraft::<ProductForm>::take(&session).await.unwrap();
        assert_eq!(draft.for_action("/products"), Some(form));
        let flash = Flash::take(&session).await.unwrap();
        assert_eq!(flash.message, "El precio debe ser un número");
    }

    #[tokio::test]
    async fn test_successful_post_leaves_no_draft() {
        let session = session();
        let _redirect = flash_redirect_keeping(
            &session,
            Ok(()),
            FormDraft::new("/categories", CategoryForm::default()),
            "Categoría creada",
            "/categories",
        )
        .await
        .unwrap();

        assert_eq!(FormDraft::<CategoryForm>::take(&session).await, None);
    }
}
