//! Logo uploads (Supabase Storage).

use menudigital_core::CompanyId;
use reqwest::Method;
use tracing::instrument;
use url::Url;

use super::{SupabaseClient, SupabaseError};

/// Object path for a new logo: `{company_id}/logo-{unix_ms}.{ext}`.
///
/// The timestamp makes every upload a new object, so browsers and CDNs
/// never serve a stale logo.
#[must_use]
pub fn logo_object_path(company_id: CompanyId, unix_ms: i64, extension: &str) -> String {
    format!("{company_id}/logo-{unix_ms}.{extension}")
}

impl SupabaseClient {
    /// Upload an object and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket rejects the upload or the request fails.
    #[instrument(skip(self, token, bytes), fields(size = bytes.len()))]
    pub async fn upload_public_object(
        &self,
        token: &str,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Url, SupabaseError> {
        let url = self.endpoint(&format!("storage/v1/object/{bucket}/{path}"), &[])?;
        let request = self
            .request(Method::POST, url, token)
            .header("Content-Type", content_type)
            .header("Cache-Control", "3600")
            .body(bytes);
        self.execute(request, "storage/upload").await?;

        self.public_object_url(bucket, path)
    }

    /// Public URL of an object in a public bucket.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not form a valid URL.
    pub fn public_object_url(&self, bucket: &str, path: &str) -> Result<Url, SupabaseError> {
        self.endpoint(&format!("storage/v1/object/public/{bucket}/{path}"), &[])
    }
}
