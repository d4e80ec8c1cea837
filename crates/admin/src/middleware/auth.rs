//! Authentication extractors for admin.
//!
//! [`RequireAdminAuth`] loads the owner from the session and keeps the
//! backend access token fresh: when it is within a minute of expiry it is
//! refreshed before the handler runs, and a failed refresh signs the owner
//! out. [`RequireCompany`] additionally requires finished onboarding.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{CompanyLink, CurrentAdmin, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in owner.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hola, {}!", admin.display_name())
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Extractor that requires a signed-in owner with a company.
pub struct RequireCompany {
    pub admin: CurrentAdmin,
    pub company: CompanyLink,
}

/// Why an authenticated extractor refused the request.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// Not signed in, or the backend session could not be renewed.
    RedirectToLogin,
    /// Signed in but onboarding is not finished.
    RedirectToSettings,
    /// No session layer in front of the handler.
    MissingSession,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::RedirectToSettings => Redirect::to("/settings").into_response(),
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AdminAuthRejection::MissingSession)?;

        let mut admin: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or(AdminAuthRejection::RedirectToLogin)?;

        let now = Utc::now();
        if admin.needs_refresh(now) {
            match state.supabase().refresh_session(&admin.refresh_token).await {
                Ok(auth) => {
                    admin.apply_refresh(&auth, now);
                    set_current_admin(&session, &admin)
                        .await
                        .map_err(|_| AdminAuthRejection::MissingSession)?;
                    tracing::debug!(user_id = %admin.user_id, "Access token refreshed");
                }
                Err(e) => {
                    tracing::info!(user_id = %admin.user_id, error = %e, "Token refresh failed, signing out");
                    let _ = clear_current_admin(&session).await;
                    return Err(AdminAuthRejection::RedirectToLogin);
                }
            }
        }

        set_sentry_user(admin.user_id, &admin.email);
        Ok(Self(admin))
    }
}

impl FromRequestParts<AppState> for RequireCompany {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAdminAuth(admin) = RequireAdminAuth::from_request_parts(parts, state).await?;
        let company = admin
            .company
            .clone()
            .ok_or(AdminAuthRejection::RedirectToSettings)?;
        Ok(Self { admin, company })
    }
}

/// Extractor that optionally gets the current owner, without refreshing.
pub struct OptionalAdminAuth(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdminAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(admin))
    }
}

/// Helper to set the current owner in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current owner from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    clear_sentry_user();
    Ok(())
}
