//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use tracing::instrument;

/// Slug of the tenant linked from the landing page.
pub const DEMO_SLUG: &str = "demo";

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub demo_slug: &'static str,
}

/// Display the landing page.
#[instrument]
pub async fn home() -> HomeTemplate {
    HomeTemplate {
        demo_slug: DEMO_SLUG,
    }
}
