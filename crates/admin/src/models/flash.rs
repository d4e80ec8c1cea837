//! One-shot notices carried across a redirect.
//!
//! Form posts end in a redirect to the list page; the outcome is stored in
//! the session and shown once by the next page render.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session_keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    /// CSS class for the notice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    /// Store a notice for the next page.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn set(self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(session_keys::FLASH, self).await
    }

    /// Take the pending notice, if any. Unreadable notices are dropped.
    pub async fn take(session: &Session) -> Option<Self> {
        session
            .remove::<Self>(session_keys::FLASH)
            .await
            .ok()
            .flatten()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flash_is_shown_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        Flash::success("Categoría creada").set(&session).await.unwrap();
        assert_eq!(
            Flash::take(&session).await,
            Some(Flash::success("Categoría creada"))
        );
        assert_eq!(Flash::take(&session).await, None);
    }
}
