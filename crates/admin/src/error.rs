//! Unified error handling for admin.
//!
//! Form handlers usually turn an error into a flash notice with
//! [`AppError::public_message`] and redirect; the `IntoResponse` impl covers
//! the rest (page loads).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use menudigital_core::UserId;
use thiserror::Error;

use crate::supabase::SupabaseError;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Supabase call failed.
    #[error("Supabase error: {0}")]
    Supabase(#[from] SupabaseError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Submitted form data is invalid. The message is shown as is.
    #[error("{0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Supabase(SupabaseError::Api { status: 409, .. }) => StatusCode::CONFLICT,
            Self::Supabase(SupabaseError::RateLimited(_)) => StatusCode::TOO_MANY_REQUESTS,
            Self::Supabase(_) => StatusCode::BAD_GATEWAY,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    const fn is_server_error(&self) -> bool {
        match self {
            Self::Supabase(err) => !err.is_conflict() && !matches!(err, SupabaseError::RateLimited(_)),
            Self::Session(_) | Self::Internal(_) => true,
            Self::Validation(_) | Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }

    /// Text shown to the owner. Internal details never leave the server.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Supabase(err) if err.is_conflict() => {
                "Ya existe un registro con esos datos (¿slug en uso?)".to_string()
            }
            Self::Supabase(SupabaseError::RateLimited(_)) => {
                "Demasiadas solicitudes, espera un momento".to_string()
            }
            Self::Supabase(_) => "Error al comunicarse con el servidor".to_string(),
            Self::Session(_) | Self::Internal(_) => "Error interno, intenta de nuevo".to_string(),
            Self::Validation(message) => message.clone(),
            Self::NotFound(_) => "No encontrado".to_string(),
            Self::BadRequest(_) => "Solicitud inválida".to_string(),
        }
    }

    /// Log the error and capture server-side failures to Sentry.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        } else {
            tracing::debug!(error = %self, "Admin request rejected");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();
        (self.status(), self.public_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the signed-in owner.
pub fn set_sentry_user(user_id: UserId, email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Validation("Nombre requerido".to_string())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::NotFound("category".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Supabase(SupabaseError::Api {
                status: 409,
                message: "duplicate key".to_string(),
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Supabase(SupabaseError::MissingRow("products".to_string()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_public_messages_hide_internals() {
        let err = AppError::Supabase(SupabaseError::Api {
            status: 500,
            message: "relation \"companies\" does not exist".to_string(),
        });
        assert!(!err.public_message().contains("relation"));

        let err = AppError::Validation("El precio no puede ser negativo".to_string());
        assert_eq!(err.public_message(), "El precio no puede ser negativo");
    }
}
