//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Backend and session failures
//! are captured to Sentry; shopper mistakes become a toast notification and
//! leave the cart untouched.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use menudigital_core::CheckoutError;
use thiserror::Error;

use crate::cart_store::CartStoreError;
use crate::htmx::Toast;
use crate::supabase::SupabaseError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Reading the catalog failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] SupabaseError),

    /// The session store failed.
    #[error("Session error: {0}")]
    Session(#[from] CartStoreError),

    /// No tenant has this slug.
    #[error("Menu not found: {0}")]
    MenuNotFound(String),

    /// The product is unknown or no longer offered.
    #[error("Product not available")]
    ProductUnavailable,

    /// The checkout command was rejected.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The posted form could not be read.
    #[error("Invalid form: {0}")]
    InvalidForm(#[from] FormRejection),
}

/// Menu not found page.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate;

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(_) => StatusCode::BAD_GATEWAY,
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MenuNotFound(_) | Self::ProductUnavailable => StatusCode::NOT_FOUND,
            Self::Checkout(_) | Self::InvalidForm(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Text shown to the shopper. Internal details never leave the server.
    fn public_message(&self) -> String {
        match self {
            Self::Catalog(_) => "Error al cargar el menú".to_string(),
            Self::Session(_) => "No pudimos guardar tu carrito, intenta de nuevo".to_string(),
            Self::MenuNotFound(_) => "Menú no encontrado".to_string(),
            Self::ProductUnavailable => "Este producto ya no está disponible".to_string(),
            Self::Checkout(err) => err.to_string(),
            Self::InvalidForm(_) => "Solicitud inválida".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::InvalidForm(rejection) = &self {
            tracing::debug!(error = %rejection.body_text(), "Rejected form");
        }

        // Capture server errors to Sentry
        if matches!(self, Self::Catalog(_) | Self::Session(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        if matches!(self, Self::MenuNotFound(_)) {
            return (status, NotFoundTemplate).into_response();
        }

        let message = self.public_message();
        let trigger = crate::htmx::HxTrigger::from(Toast::error(message.clone()));
        (status, trigger, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use menudigital_core::OrderError;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::MenuNotFound("nada".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(get_status(AppError::ProductUnavailable), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::EmptyCart)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Catalog(SupabaseError::RateLimited(1))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_checkout_errors_surface_their_message() {
        let err = AppError::Checkout(CheckoutError::Order(OrderError::MissingAddress));
        assert_eq!(err.public_message(), "Por favor ingresa tu dirección");
    }

    #[test]
    fn test_backend_details_are_hidden() {
        let err = AppError::Catalog(SupabaseError::Api {
            status: 500,
            message: "relation \"companies\" does not exist".to_string(),
        });
        assert_eq!(err.public_message(), "Error al cargar el menú");
    }

    #[test]
    fn test_validation_errors_carry_toast_header() {
        let response = AppError::Checkout(CheckoutError::EmptyCart).into_response();
        assert!(response.headers().contains_key("hx-trigger"));
    }
}
