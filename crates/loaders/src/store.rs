use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;

use crate::{category::CategoryData, error::LoadError, loader::UserDataLoader};

/// Persistence seam for the default loaders. The storage format is owned by
/// the implementation; `None` means the user has no data in that category.
#[async_trait]
pub trait UserDataStore: Send + Sync {
    async fn fetch(
        &self,
        category: &str,
        user_id: &str,
    ) -> Result<Option<serde_json::Value>, LoadError>;
}

/// In-memory store for tests and development.
#[derive(Default)]
pub struct MemoryUserDataStore {
    entries: RwLock<HashMap<(String, String), serde_json::Value>>,
}

impl MemoryUserDataStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, category: &str, user_id: &str, data: serde_json::Value) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert((category.to_string(), user_id.to_string()), data);
    }
}

#[async_trait]
impl UserDataStore for MemoryUserDataStore {
    async fn fetch(
        &self,
        category: &str,
        user_id: &str,
    ) -> Result<Option<serde_json::Value>, LoadError> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries
            .get(&(category.to_string(), user_id.to_string()))
            .cloned())
    }
}

/// Default loader: reads one category straight from a [`UserDataStore`].
pub struct StoreLoader {
    category: String,
    store: Arc<dyn UserDataStore>,
}

impl StoreLoader {
    #[must_use]
    pub fn new(category: impl Into<String>, store: Arc<dyn UserDataStore>) -> Self {
        Self {
            category: category.into(),
            store,
        }
    }
}

#[async_trait]
impl UserDataLoader for StoreLoader {
    async fn load(&self, user_id: &str) -> Result<CategoryData, LoadError> {
        let data = self.store.fetch(&self.category, user_id).await?;
        match data {
            Some(data) => Ok(CategoryData {
                category: self.category.clone(),
                user_id: user_id.to_string(),
                data,
            }),
            None => Err(LoadError::not_found(&self.category, user_id)),
        }
    }
}
