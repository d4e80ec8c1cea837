//! Submitted form values kept across the redirect after a failed post.
//!
//! The page the post redirects to takes the draft once and fills the form
//! that posted to `action` with it, so the owner can correct and retry.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tower_sessions::Session;

use super::session_keys;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDraft<F> {
    /// Path the form posted to, e.g. `/products` or `/products/{id}`
    pub action: String,
    pub form: F,
}

impl<F> FormDraft<F>
where
    F: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(action: impl Into<String>, form: F) -> Self {
        Self {
            action: action.into(),
            form,
        }
    }

    /// Store the draft for the next page.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn set(self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(session_keys::FORM_DRAFT, self).await
    }

    /// Take the pending draft, if any.
    ///
    /// A draft of another form shape is dropped.
    pub async fn take(session: &Session) -> Option<Self> {
        session
            .remove::<Self>(session_keys::FORM_DRAFT)
            .await
            .ok()
            .flatten()
    }

    /// The form values if this draft was posted to `action`.
    #[must_use]
    pub fn for_action(self, action: &str) -> Option<F> {
        (self.action == action).then_some(self.form)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;
    use crate::forms::CategoryForm;

    #[tokio::test]
    async fn test_draft_is_taken_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let form = CategoryForm {
            name: "Postres".to_string(),
            description: "Caseros".to_string(),
        };

        FormDraft::new("/categories", form.clone())
            .set(&session)
            .await
            .unwrap();

        let draft = FormDraft::<CategoryForm>::take(&session).await.unwrap();
        assert_eq!(draft.for_action("/categories"), Some(form));
        assert_eq!(FormDraft::<CategoryForm>::take(&session).await, None);
    }

    #[test]
    fn test_draft_only_fills_its_own_form() {
        let draft = FormDraft::new("/categories/abc", CategoryForm::default());
        assert_eq!(draft.clone().for_action("/categories"), None);
        assert!(draft.for_action("/categories/abc").is_some());
    }
}
