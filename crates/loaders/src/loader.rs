use std::sync::Arc;

use async_trait::async_trait;

use crate::{category::CategoryData, error::LoadError};

/// A pluggable retriever for one category of user data.
///
/// Storage format and location are the loader's business; the registry only
/// defines the call contract.
#[async_trait]
pub trait UserDataLoader: Send + Sync {
    async fn load(&self, user_id: &str) -> Result<CategoryData, LoadError>;
}

impl std::fmt::Debug for dyn UserDataLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("UserDataLoader")
    }
}

/// Registry value for one category.
///
/// The loader is optional so a misconfigured ("registered but unbound")
/// entry is representable and diagnosable, distinct from a missing key.
#[derive(Clone)]
pub struct LoaderEntry {
    pub loader: Option<Arc<dyn UserDataLoader>>,
}

impl LoaderEntry {
    #[must_use]
    pub fn bound(loader: Arc<dyn UserDataLoader>) -> Self {
        Self {
            loader: Some(loader),
        }
    }

    #[must_use]
    pub fn unbound() -> Self {
        Self { loader: None }
    }
}

impl std::fmt::Debug for LoaderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderEntry")
            .field("bound", &self.loader.is_some())
            .finish()
    }
}
