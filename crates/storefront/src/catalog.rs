//! Menu lookup seam.
//!
//! Route handlers only need "give me the menu for this slug". The trait lets
//! the production Supabase client and the in-memory catalog used by tests
//! and local demos sit behind the same `AppState`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use menudigital_core::{Menu, Slug};

use crate::supabase::{SupabaseClient, SupabaseError};

/// Source of tenant menus.
#[async_trait]
pub trait MenuCatalog: Send + Sync {
    /// Load the menu for a tenant, or `None` if the slug is unknown.
    async fn menu(&self, slug: &Slug) -> Result<Option<Arc<Menu>>, SupabaseError>;

    /// Check that the catalog backend is reachable.
    async fn ping(&self) -> Result<(), SupabaseError>;
}

#[async_trait]
impl MenuCatalog for SupabaseClient {
    async fn menu(&self, slug: &Slug) -> Result<Option<Arc<Menu>>, SupabaseError> {
        Self::menu(self, slug).await
    }

    async fn ping(&self) -> Result<(), SupabaseError> {
        Self::ping(self).await
    }
}

/// A fixed set of menus held in memory.
#[derive(Debug, Default, Clone)]
pub struct StaticCatalog {
    menus: HashMap<Slug, Arc<Menu>>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new(menus: impl IntoIterator<Item = Menu>) -> Self {
        Self {
            menus: menus
                .into_iter()
                .map(|menu| (menu.company.slug.clone(), Arc::new(menu)))
                .collect(),
        }
    }
}

#[async_trait]
impl MenuCatalog for StaticCatalog {
    async fn menu(&self, slug: &Slug) -> Result<Option<Arc<Menu>>, SupabaseError> {
        Ok(self.menus.get(slug).cloned())
    }

    async fn ping(&self) -> Result<(), SupabaseError> {
        Ok(())
    }
}
