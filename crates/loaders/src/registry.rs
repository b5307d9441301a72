use std::sync::Arc;

use tracing::debug;

use nestor_registry::{OverwritePolicy, Registry};

use crate::{
    category::{CategoryData, DataCategory},
    error::{Error, Result},
    loader::{LoaderEntry, UserDataLoader},
    store::{StoreLoader, UserDataStore},
};

/// Registry mapping category names to loader entries.
///
/// Cloning is cheap and shares the underlying registry — every module that
/// holds a clone sees the same entries, which is the single-shared-instance
/// topology the bootstrap contract depends on.
#[derive(Clone)]
pub struct LoaderRegistry {
    inner: Arc<Registry<LoaderEntry>>,
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LoaderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Registry::new()),
        }
    }

    /// Register an explicit loader for `category`, replacing any previous
    /// entry (default or otherwise). Explicit registrations always win over
    /// later default bootstraps.
    pub fn register(&self, category: &str, loader: Arc<dyn UserDataLoader>) -> Result<()> {
        self.register_entry(category, LoaderEntry::bound(loader))
    }

    /// Register a raw entry. An unbound entry models the "registered but
    /// loader is null" configuration defect.
    pub fn register_entry(&self, category: &str, entry: LoaderEntry) -> Result<()> {
        self.inner
            .register(category, entry, OverwritePolicy::Replace)?;
        Ok(())
    }

    /// Bootstrap: bind every required category that is still missing to a
    /// store-backed default loader.
    ///
    /// Safe to call any number of times from any entry module in any order.
    /// Defaults fill gaps; they never clobber an existing registration.
    /// Returns how many categories were newly bound.
    pub fn register_default_loaders(&self, store: Arc<dyn UserDataStore>) -> Result<usize> {
        let defaults = DataCategory::REQUIRED.iter().map(|category| {
            let loader = StoreLoader::new(category.as_str(), Arc::clone(&store));
            (
                category.as_str().to_string(),
                LoaderEntry::bound(Arc::new(loader)),
            )
        });
        let inserted = self.inner.ensure_defaults(defaults)?;
        if inserted > 0 {
            debug!(inserted, "default user-data loaders registered");
        }
        Ok(inserted)
    }

    /// Resolve the loader for `category`.
    ///
    /// A missing entry is `NotFound`; an entry without a loader is the
    /// distinct `LoaderUnbound` configuration defect.
    pub fn loader_for(&self, category: &str) -> Result<Arc<dyn UserDataLoader>> {
        let entry = self.inner.get(category)?;
        entry
            .value
            .loader
            .ok_or_else(|| Error::loader_unbound(category))
    }

    /// Load one category for one user. Loader-internal failures pass through
    /// untouched.
    pub async fn load(&self, category: &str, user_id: &str) -> Result<CategoryData> {
        let loader = self.loader_for(category)?;
        Ok(loader.load(user_id).await?)
    }

    /// Whether every required category resolves to a bound loader.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        DataCategory::REQUIRED
            .iter()
            .all(|c| self.loader_for(c.as_str()).is_ok())
    }

    /// Sorted list of registered category names.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.inner.keys()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{error::LoadError, store::MemoryUserDataStore},
        async_trait::async_trait,
    };

    struct CannedLoader {
        marker: &'static str,
    }

    #[async_trait]
    impl UserDataLoader for CannedLoader {
        async fn load(&self, user_id: &str) -> std::result::Result<CategoryData, LoadError> {
            Ok(CategoryData {
                category: self.marker.to_string(),
                user_id: user_id.to_string(),
                data: serde_json::json!({ "marker": self.marker }),
            })
        }
    }

    fn store() -> Arc<MemoryUserDataStore> {
        Arc::new(MemoryUserDataStore::new())
    }

    #[test]
    fn bootstrap_covers_all_required_categories() {
        let registry = LoaderRegistry::new();
        assert!(!registry.is_complete());
        registry.register_default_loaders(store()).unwrap();
        assert!(registry.is_complete());
        assert_eq!(
            registry.categories(),
            vec!["account", "context", "preferences", "schedules"]
        );
    }

    #[test]
    fn bootstrap_is_idempotent() {
        let registry = LoaderRegistry::new();
        let s = store();
        let first = registry
            .register_default_loaders(Arc::clone(&s) as Arc<dyn UserDataStore>)
            .unwrap();
        assert_eq!(first, 4);
        for _ in 0..5 {
            let again = registry
                .register_default_loaders(Arc::clone(&s) as Arc<dyn UserDataStore>)
                .unwrap();
            assert_eq!(again, 0);
        }
        assert!(registry.is_complete());
    }

    #[test]
    fn bootstrap_converges_from_two_entry_modules() {
        // Simulates two modules sharing one underlying registry, each running
        // the bootstrap on its own schedule; both paths must converge.
        let module_a = LoaderRegistry::new();
        let module_b = module_a.clone();

        module_a.register_default_loaders(store()).unwrap();
        module_b.register_default_loaders(store()).unwrap();
        module_b.register_default_loaders(store()).unwrap();

        assert!(module_a.is_complete());
        assert!(module_b.is_complete());
        assert_eq!(module_a.categories(), module_b.categories());
    }

    #[tokio::test]
    async fn custom_loader_survives_later_default_bootstrap() {
        let registry = LoaderRegistry::new();
        registry
            .register("schedules", Arc::new(CannedLoader { marker: "custom" }))
            .unwrap();
        registry.register_default_loaders(store()).unwrap();

        // Defaults filled the other three categories but left schedules alone.
        assert!(registry.is_complete());
        let data = registry.load("schedules", "u1").await.unwrap();
        assert_eq!(data.data["marker"], "custom");
    }

    #[test]
    fn missing_category_is_not_found() {
        let registry = LoaderRegistry::new();
        let err = registry.loader_for("account").unwrap_err();
        assert!(matches!(
            err,
            Error::Registry(nestor_registry::Error::NotFound { .. })
        ));
    }

    #[test]
    fn unbound_entry_is_distinct_from_not_found() {
        let registry = LoaderRegistry::new();
        registry
            .register_entry("account", LoaderEntry::unbound())
            .unwrap();
        let err = registry.loader_for("account").unwrap_err();
        assert!(matches!(err, Error::LoaderUnbound { .. }));
    }

    #[tokio::test]
    async fn load_passes_loader_errors_through() {
        let registry = LoaderRegistry::new();
        registry.register_default_loaders(store()).unwrap();
        // Store is empty, so the default loader reports NotFound — untouched.
        let err = registry.load("account", "ghost").await.unwrap_err();
        assert!(matches!(err, Error::Load(LoadError::NotFound { .. })));
    }

    #[tokio::test]
    async fn load_reads_through_default_loader() {
        let registry = LoaderRegistry::new();
        let s = store();
        s.insert("preferences", "u1", serde_json::json!({"tz": "UTC"}));
        registry
            .register_default_loaders(s as Arc<dyn UserDataStore>)
            .unwrap();

        let data = registry.load("preferences", "u1").await.unwrap();
        assert_eq!(data.data["tz"], "UTC");
    }

    #[test]
    fn custom_categories_are_allowed() {
        let registry = LoaderRegistry::new();
        registry
            .register("horoscope", Arc::new(CannedLoader { marker: "h" }))
            .unwrap();
        assert!(registry.loader_for("horoscope").is_ok());
    }
}
