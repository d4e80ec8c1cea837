//! Restaurant profile: contact details, location and logo.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State},
    response::Redirect,
    routing::get,
};
use chrono::Utc;
use menudigital_core::{Company, CompanyId};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::forms::ProfileForm;
use crate::middleware::{RequireCompany, set_current_admin};
use crate::models::{CompanyLink, CurrentAdmin, FormDraft};
use crate::routes::{Layout, flash_redirect, flash_redirect_keeping};
use crate::state::AppState;
use crate::supabase::logo_object_path;

/// Largest accepted logo file.
const MAX_LOGO_BYTES: usize = 2 * 1024 * 1024;

/// Multipart overhead allowed on top of the logo itself.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileView {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub whatsapp: String,
    pub address: String,
    pub lat: String,
    pub lng: String,
    pub logo: Option<String>,
}

impl From<&Company> for ProfileView {
    fn from(company: &Company) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let coordinate = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
        Self {
            name: company.name.clone(),
            phone: text(&company.phone),
            email: text(&company.email),
            whatsapp: text(&company.whatsapp),
            address: text(&company.address),
            lat: coordinate(company.lat),
            lng: coordinate(company.lng),
            logo: company.logo.clone(),
        }
    }
}

impl ProfileView {
    /// Replace the text fields with those of a failed post. The current
    /// logo stays.
    #[must_use]
    pub fn with_draft(self, form: ProfileForm) -> Self {
        Self {
            name: form.name,
            phone: form.phone,
            email: form.email,
            whatsapp: form.whatsapp,
            address: form.address,
            lat: form.lat,
            lng: form.lng,
            logo: self.logo,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
struct ProfileTemplate {
    layout: Layout,
    profile: ProfileView,
    max_logo_mb: usize,
}

/// An uploaded logo, already checked to be an image.
#[derive(Debug)]
struct LogoUpload {
    content_type: String,
    extension: &'static str,
    bytes: Vec<u8>,
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/profile",
        get(index)
            .post(save)
            .layer(DefaultBodyLimit::max(MAX_LOGO_BYTES + FORM_OVERHEAD_BYTES)),
    )
}

/// GET /profile
#[instrument(skip_all)]
async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireCompany { admin, company }: RequireCompany,
) -> Result<ProfileTemplate> {
    let record = state
        .supabase()
        .company(&admin.access_token, company.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("company {}", company.id)))?;

    let mut profile = ProfileView::from(&record);
    if let Some(typed) = FormDraft::<ProfileForm>::take(&session)
        .await
        .and_then(|draft| draft.for_action("/profile"))
    {
        profile = profile.with_draft(typed);
    }

    Ok(ProfileTemplate {
        layout: Layout::load(&state, &session, &admin, "/profile").await,
        profile,
        max_logo_mb: MAX_LOGO_BYTES / (1024 * 1024),
    })
}

/// POST /profile
#[instrument(skip_all)]
async fn save(
    State(state): State<AppState>,
    session: Session,
    RequireCompany { admin, company }: RequireCompany,
    multipart: Multipart,
) -> Result<Redirect> {
    let (form, logo) = match read_profile_form(multipart).await {
        Ok(parts) => parts,
        Err(err) => {
            return flash_redirect(&session, Err::<(), _>(err), "Perfil actualizado", "/profile")
                .await;
        }
    };
    let outcome = update_profile(&state, &session, admin, company.id, &form, logo).await;
    let draft = FormDraft::new("/profile", form);
    flash_redirect_keeping(&session, outcome, draft, "Perfil actualizado", "/profile").await
}

async fn update_profile(
    state: &AppState,
    session: &Session,
    mut admin: CurrentAdmin,
    company_id: CompanyId,
    form: &ProfileForm,
    logo: Option<LogoPart>,
) -> Result<()> {
    let mut changes = form.parse()?;
    let logo = logo.map(LogoPart::into_upload).transpose()?;

    if let Some(logo) = logo {
        let path = logo_object_path(company_id, Utc::now().timestamp_millis(), logo.extension);
        let url = state
            .supabase()
            .upload_public_object(
                &admin.access_token,
                &state.config().logo_bucket,
                &path,
                &logo.content_type,
                logo.bytes,
            )
            .await?;
        tracing::info!(%company_id, %path, "Logo uploaded");
        changes.logo = Some(url.to_string());
    }

    let company = state
        .supabase()
        .update_company(&admin.access_token, company_id, &changes)
        .await?;

    // The header shows the company name
    admin.company = Some(CompanyLink::from(&company));
    set_current_admin(session, &admin).await?;
    Ok(())
}

/// The logo file part as received.
#[derive(Debug)]
struct LogoPart {
    content_type: String,
    file_name: String,
    bytes: Vec<u8>,
}

impl LogoPart {
    /// Check size and image type.
    fn into_upload(self) -> Result<LogoUpload> {
        if self.bytes.len() > MAX_LOGO_BYTES {
            return Err(AppError::Validation(
                "El logo no puede pesar más de 2 MB".to_string(),
            ));
        }
        let extension = logo_extension(&self.content_type, &self.file_name).ok_or_else(|| {
            AppError::Validation("El logo debe ser una imagen (PNG, JPG, WEBP o GIF)".to_string())
        })?;
        Ok(LogoUpload {
            content_type: self.content_type,
            extension,
            bytes: self.bytes,
        })
    }
}

/// Split the multipart body into text fields and an optional logo file.
async fn read_profile_form(mut multipart: Multipart) -> Result<(ProfileForm, Option<LogoPart>)> {
    let mut form = ProfileForm::default();
    let mut logo = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == "logo" {
            let content_type = field.content_type().unwrap_or_default().to_owned();
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            // An untouched file input still sends an empty part
            if bytes.is_empty() {
                continue;
            }
            logo = Some(LogoPart {
                content_type,
                file_name,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.set(&name, value);
        }
    }

    Ok((form, logo))
}

/// File extension for an uploaded image, or `None` if it is not one.
fn logo_extension(content_type: &str, file_name: &str) -> Option<&'static str> {
    let by_type = match content_type.to_ascii_lowercase().as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    };
    if by_type.is_some() || !content_type.is_empty() {
        return by_type;
    }

    // Some browsers send no type; fall back to the file name
    let extension = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("png"),
        "jpg" | "jpeg" => Some("jpg"),
        "webp" => Some("webp"),
        "gif" => Some("gif"),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_logo_extension_from_content_type() {
        assert_eq!(logo_extension("image/png", "logo.png"), Some("png"));
        assert_eq!(logo_extension("IMAGE/JPEG", "foto"), Some("jpg"));
        assert_eq!(logo_extension("image/webp", ""), Some("webp"));
    }

    #[test]
    fn test_logo_extension_rejects_non_images() {
        assert_eq!(logo_extension("application/pdf", "menu.pdf"), None);
        // A declared type wins over a misleading file name
        assert_eq!(logo_extension("text/html", "logo.png"), None);
        assert_eq!(logo_extension("image/svg+xml", "logo.svg"), None);
    }

    #[test]
    fn test_logo_extension_from_file_name() {
        assert_eq!(logo_extension("", "Logo.JPEG"), Some("jpg"));
        assert_eq!(logo_extension("", "logo"), None);
    }

    #[test]
    fn test_profile_view_formats_coordinates() {
        let company = Company {
            id: CompanyId::generate(),
            name: "Demo".to_string(),
            slug: menudigital_core::Slug::parse("demo").unwrap(),
            phone: Some("555 000 1111".to_string()),
            email: None,
            address: None,
            lat: Some(19.4326),
            lng: None,
            whatsapp: None,
            logo: None,
            primary_color: None,
            created_at: None,
            updated_at: None,
        };
        let view = ProfileView::from(&company);
        assert_eq!(view.phone, "555 000 1111");
        assert_eq!(view.lat, "19.4326");
        assert_eq!(view.lng, "");
    }

    #[test]
    fn test_logo_part_is_checked_before_upload() {
        let oversized = LogoPart {
            content_type: "image/png".to_string(),
            file_name: "logo.png".to_string(),
            bytes: vec![0; MAX_LOGO_BYTES + 1],
        };
        assert!(matches!(oversized.into_upload(), Err(AppError::Validation(_))));

        let pdf = LogoPart {
            content_type: "application/pdf".to_string(),
            file_name: "menu.pdf".to_string(),
            bytes: vec![1, 2, 3],
        };
        assert!(pdf.into_upload().is_err());

        let png = LogoPart {
            content_type: "image/png".to_string(),
            file_name: "logo.png".to_string(),
            bytes: vec![1, 2, 3],
        };
        assert_eq!(png.into_upload().unwrap().extension, "png");
    }

    #[test]
    fn test_failed_save_shows_typed_values_and_current_logo() {
        let view = ProfileView {
            name: "Demo".to_string(),
            logo: Some("https://cdn.example.com/logo.png".to_string()),
            ..ProfileView::default()
        };
        let mut typed = ProfileForm::default();
        typed.set("name", "Demo Centro".to_string());
        typed.set("lat", "91".to_string());

        let view = view.with_draft(typed);
        assert_eq!(view.name, "Demo Centro");
        assert_eq!(view.lat, "91");
        assert_eq!(view.logo.as_deref(), Some("https://cdn.example.com/logo.png"));
    }
}
