//! Sign-in, sign-up and sign-out.
//!
//! Credentials are checked by the backend; on success the returned tokens,
//! the owner's company and its slug are stored in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::forms::{LoginForm, RegisterForm};
use crate::middleware::{OptionalAdminAuth, auth_rate_limiter, clear_current_admin, set_current_admin};
use crate::models::{CompanyLink, CurrentAdmin, Flash};
use crate::state::AppState;
use crate::supabase::{AuthSession, SignUp, SupabaseError};

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
struct LoginTemplate {
    flash: Option<Flash>,
    email: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
struct RegisterTemplate {
    flash: Option<Flash>,
    business_name: String,
    email: String,
}

/// Build the auth router. Credential posts are rate limited per client IP.
pub fn router() -> Router<AppState> {
    let credential_posts = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/auth/login", get(login_page))
        .route("/auth/register", get(register_page))
        .route("/auth/logout", post(logout))
        .merge(credential_posts)
}

/// GET /auth/login
async fn login_page(OptionalAdminAuth(admin): OptionalAdminAuth, session: Session) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }
    LoginTemplate {
        flash: Flash::take(&session).await,
        email: String::new(),
    }
    .into_response()
}

/// GET /auth/register
async fn register_page(OptionalAdminAuth(admin): OptionalAdminAuth, session: Session) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }
    RegisterTemplate {
        flash: Flash::take(&session).await,
        business_name: String::new(),
        email: String::new(),
    }
    .into_response()
}

/// POST /auth/login
#[instrument(skip(state, session, form))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let email = match form.parse() {
        Ok(email) => email,
        Err(err) => return Ok(login_error(&err.public_message(), form.email)),
    };

    let auth = match state
        .supabase()
        .sign_in_with_password(email.as_str(), &form.password)
        .await
    {
        Ok(auth) => auth,
        Err(err) if err.is_auth_failure() => {
            tracing::info!(error = %err, "Sign-in rejected");
            return Ok(login_error("Correo o contraseña incorrectos", form.email));
        }
        Err(err) => {
            let err = AppError::from(err);
            err.report();
            return Ok(login_error(&err.public_message(), form.email));
        }
    };

    let admin = start_session(&state, &session, &auth).await?;
    tracing::info!(user_id = %admin.user_id, "Owner signed in");
    Ok(Redirect::to(home_for(&admin)).into_response())
}

/// POST /auth/register
#[instrument(skip(state, session, form))]
async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let registration = match form.parse() {
        Ok(registration) => registration,
        Err(err) => return Ok(register_error(&err.public_message(), form)),
    };

    let outcome = state
        .supabase()
        .sign_up(
            registration.email.as_str(),
            &form.password,
            &registration.business_name,
        )
        .await;

    match outcome {
        Ok(SignUp::SignedIn(auth)) => {
            let admin = start_session(&state, &session, &auth).await?;
            tracing::info!(user_id = %admin.user_id, "Owner registered");
            Flash::success("Cuenta creada. Configura tu empresa para publicar tu menú.")
                .set(&session)
                .await?;
            Ok(Redirect::to("/settings").into_response())
        }
        Ok(SignUp::ConfirmationRequired(user)) => {
            tracing::info!(user_id = %user.id, "Owner registered, confirmation pending");
            Flash::success("Revisa tu correo para confirmar tu cuenta y luego inicia sesión.")
                .set(&session)
                .await?;
            Ok(Redirect::to("/auth/login").into_response())
        }
        Err(err @ SupabaseError::Api { status, .. }) if (400..500).contains(&status) => {
            tracing::info!(error = %err, "Sign-up rejected");
            Ok(register_error(
                "No se pudo crear la cuenta. ¿El correo ya está registrado?",
                form,
            ))
        }
        Err(err) => {
            let err = AppError::from(err);
            err.report();
            Ok(register_error(&err.public_message(), form))
        }
    }
}

/// POST /auth/logout
#[instrument(skip_all)]
async fn logout(
    State(state): State<AppState>,
    OptionalAdminAuth(admin): OptionalAdminAuth,
    session: Session,
) -> Result<Redirect> {
    if let Some(admin) = admin {
        if let Err(e) = state.supabase().sign_out(&admin.access_token).await {
            tracing::warn!(user_id = %admin.user_id, error = %e, "Failed to revoke backend session");
        }
        tracing::info!(user_id = %admin.user_id, "Owner signed out");
    }
    clear_current_admin(&session).await?;
    Ok(Redirect::to("/auth/login"))
}

/// Store a fresh sign-in in the session, with the owner's company if any.
async fn start_session(
    state: &AppState,
    session: &Session,
    auth: &AuthSession,
) -> Result<CurrentAdmin> {
    let mut admin = CurrentAdmin::from_auth(auth, Utc::now());
    admin.company = load_company_link(state, &admin).await?;

    // New session id on privilege change
    session.cycle_id().await?;
    set_current_admin(session, &admin).await?;
    Ok(admin)
}

async fn load_company_link(state: &AppState, admin: &CurrentAdmin) -> Result<Option<CompanyLink>> {
    let supabase = state.supabase();
    let Some(company_id) = supabase
        .profile(&admin.access_token, admin.user_id)
        .await?
        .and_then(|profile| profile.company_id)
    else {
        return Ok(None);
    };

    let company = supabase.company(&admin.access_token, company_id).await?;
    if company.is_none() {
        tracing::warn!(user_id = %admin.user_id, %company_id, "Profile points at a missing company");
    }
    Ok(company.as_ref().map(CompanyLink::from))
}

/// Where a signed-in owner lands: onboarding until a company exists.
const fn home_for(admin: &CurrentAdmin) -> &'static str {
    if admin.company.is_some() { "/" } else { "/settings" }
}

fn login_error(message: &str, email: String) -> Response {
    let page = LoginTemplate {
        flash: Some(Flash::error(message)),
        email,
    };
    (StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
}

fn register_error(message: &str, form: RegisterForm) -> Response {
    let page = RegisterTemplate {
        flash: Some(Flash::error(message)),
        business_name: form.business_name,
        email: form.email,
    };
    (StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use menudigital_core::{CompanyId, Slug, UserId};

    use super::*;

    fn admin(company: Option<CompanyLink>) -> CurrentAdmin {
        CurrentAdmin {
            user_id: UserId::generate(),
            email: "dueno@example.com".to_string(),
            name: Some("Taquería".to_string()),
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
            company,
        }
    }

    #[test]
    fn test_home_depends_on_onboarding() {
        assert_eq!(home_for(&admin(None)), "/settings");

        let link = CompanyLink {
            id: CompanyId::generate(),
            name: "Taquería".to_string(),
            slug: Slug::parse("taqueria").unwrap(),
        };
        assert_eq!(home_for(&admin(Some(link))), "/");
    }

    #[test]
    fn test_login_error_keeps_email() {
        let response = login_error("Correo o contraseña incorrectos", "ana@example.com".into());
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_login_page_renders_flash() {
        let html = LoginTemplate {
            flash: Some(Flash::error("Correo o contraseña incorrectos")),
            email: "ana@example.com".to_string(),
        }
        .render()
        .unwrap();
        assert!(html.contains("Correo o contraseña incorrectos"));
        assert!(html.contains("value=\"ana@example.com\""));
    }
}
