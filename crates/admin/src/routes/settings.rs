//! Company settings and onboarding.
//!
//! Without a company the page creates one and links it to the owner's
//! profile; afterwards it edits name, slug, WhatsApp number and accent
//! color.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::Redirect,
    routing::get,
};
use menudigital_core::{Company, CompanyId, Slug, ThemeColor};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::forms::SettingsForm;
use crate::middleware::{RequireAdminAuth, set_current_admin};
use crate::models::{CompanyLink, CurrentAdmin, FormDraft};
use crate::routes::{Layout, flash_redirect_keeping};
use crate::state::AppState;
use crate::supabase::{CompanySettings, NewCompany};

/// Current values for the settings form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsView {
    pub name: String,
    pub slug: String,
    pub whatsapp: String,
    pub primary_color: String,
}

impl From<&Company> for SettingsView {
    fn from(company: &Company) -> Self {
        Self {
            name: company.name.clone(),
            slug: company.slug.to_string(),
            whatsapp: company.whatsapp.clone().unwrap_or_default(),
            primary_color: company
                .theme_color()
                .map(|c| c.to_string())
                .unwrap_or_default(),
        }
    }
}

impl SettingsView {
    /// The accent color swatch, when the field holds a valid color.
    #[must_use]
    pub fn preview_color(&self) -> Option<String> {
        ThemeColor::parse(&self.primary_color)
            .ok()
            .map(|color| color.to_string())
    }
}

impl From<SettingsForm> for SettingsView {
    fn from(form: SettingsForm) -> Self {
        Self {
            name: form.name,
            slug: form.slug,
            whatsapp: form.whatsapp,
            primary_color: form.primary_color,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "settings.html")]
struct SettingsTemplate {
    layout: Layout,
    form: SettingsView,
    onboarding: bool,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(index).post(save))
}

/// GET /settings
#[instrument(skip_all)]
async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<SettingsTemplate> {
    let draft = FormDraft::<SettingsForm>::take(&session)
        .await
        .and_then(|draft| draft.for_action("/settings"));

    let form = match (draft, &admin.company) {
        (Some(typed), _) => SettingsView::from(typed),
        (None, Some(link)) => state
            .supabase()
            .company(&admin.access_token, link.id)
            .await?
            .as_ref()
            .map(SettingsView::from)
            .ok_or_else(|| AppError::NotFound(format!("company {}", link.id)))?,
        // Pre-fill the business name given at sign-up
        (None, None) => SettingsView {
            name: admin.name.clone().unwrap_or_default(),
            ..SettingsView::default()
        },
    };

    Ok(SettingsTemplate {
        layout: Layout::load(&state, &session, &admin, "/settings").await,
        onboarding: admin.company.is_none(),
        form,
    })
}

/// POST /settings
#[instrument(skip_all)]
async fn save(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
    Form(form): Form<SettingsForm>,
) -> Result<Redirect> {
    match admin.company.clone() {
        Some(link) => {
            let outcome = update_settings(&state, &session, admin, link.id, &form).await;
            let draft = FormDraft::new("/settings", form);
            flash_redirect_keeping(&session, outcome, draft, "Configuración guardada", "/settings")
                .await
        }
        None => {
            let outcome = create_company(&state, &session, admin, &form).await;
            let to = if outcome.is_ok() { "/" } else { "/settings" };
            let draft = FormDraft::new("/settings", form);
            flash_redirect_keeping(
                &session,
                outcome,
                draft,
                "Empresa creada. Ya puedes cargar tu menú.",
                to,
            )
            .await
        }
    }
}

async fn create_company(
    state: &AppState,
    session: &Session,
    mut admin: CurrentAdmin,
    form: &SettingsForm,
) -> Result<()> {
    let settings = form.parse()?;
    ensure_slug_available(state, &admin, &settings.slug, None).await?;

    let supabase = state.supabase();
    let company = supabase
        .create_company(
            &admin.access_token,
            &NewCompany {
                name: settings.name,
                slug: settings.slug,
                whatsapp: settings.whatsapp,
                primary_color: settings.primary_color,
            },
        )
        .await?;
    supabase
        .link_company(&admin.access_token, admin.user_id, company.id)
        .await?;

    tracing::info!(user_id = %admin.user_id, company_id = %company.id, slug = %company.slug, "Company created");
    admin.company = Some(CompanyLink::from(&company));
    set_current_admin(session, &admin).await?;
    Ok(())
}

async fn update_settings(
    state: &AppState,
    session: &Session,
    mut admin: CurrentAdmin,
    company_id: CompanyId,
    form: &SettingsForm,
) -> Result<()> {
    let settings: CompanySettings = form.parse()?;
    ensure_slug_available(state, &admin, &settings.slug, Some(company_id)).await?;

    let company = state
        .supabase()
        .update_company(&admin.access_token, company_id, &settings)
        .await?;

    tracing::info!(company_id = %company.id, slug = %company.slug, "Company settings updated");
    admin.company = Some(CompanyLink::from(&company));
    set_current_admin(session, &admin).await?;
    Ok(())
}

/// Reject a slug that another company already uses.
///
/// The unique index still guards against races; this only turns the
/// common case into a readable message.
async fn ensure_slug_available(
    state: &AppState,
    admin: &CurrentAdmin,
    slug: &Slug,
    own: Option<CompanyId>,
) -> Result<()> {
    let existing = state
        .supabase()
        .company_by_slug(&admin.access_token, slug)
        .await?;
    match existing {
        Some(company) if Some(company.id) != own => Err(AppError::Validation(format!(
            "El slug \"{slug}\" ya está en uso"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_view_from_company() {
        let company = Company {
            id: CompanyId::generate(),
            name: "Taquería El Güero".to_string(),
            slug: Slug::parse("taqueria-el-guero").unwrap(),
            phone: None,
            email: None,
            address: None,
            lat: None,
            lng: None,
            whatsapp: None,
            logo: None,
            primary_color: Some("ff6600".to_string()),
            created_at: None,
            updated_at: None,
        };

        let view = SettingsView::from(&company);
        assert_eq!(view.slug, "taqueria-el-guero");
        assert_eq!(view.whatsapp, "");
        assert_eq!(view.primary_color, "#ff6600");
    }

    #[test]
    fn test_typed_values_survive_a_failed_save() {
        let view = SettingsView::from(SettingsForm {
            name: "Demo".to_string(),
            slug: "ya-usado".to_string(),
            whatsapp: "sin número".to_string(),
            primary_color: "naranja".to_string(),
        });
        assert_eq!(view.slug, "ya-usado");
        assert_eq!(view.whatsapp, "sin número");
        assert_eq!(view.primary_color, "naranja");
        assert_eq!(view.preview_color(), None);

        let view = SettingsView {
            primary_color: "FF6600".to_string(),
            ..view
        };
        assert_eq!(view.preview_color().as_deref(), Some("#ff6600"));
    }
}
