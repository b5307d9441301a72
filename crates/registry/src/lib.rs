//! Generic key→entry registry shared by the channel orchestrator and the
//! user-data loader registry.
//!
//! One registry instance is constructed per process and handed to consumers
//! as `Arc<Registry<V>>`. Registration is idempotent and order-insensitive:
//! `ensure_defaults` fills missing keys only, so any number of bootstrap
//! paths converge on the same required-key coverage without clobbering
//! externally registered entries.

pub mod error;

pub use error::{Error, Result};

use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

/// What `register` does when the key is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Replace the existing entry atomically.
    Replace,
    /// Leave the existing entry untouched.
    KeepExisting,
}

/// A single registered entry.
#[derive(Debug, Clone)]
pub struct RegistryEntry<V> {
    pub key: String,
    pub value: V,
    /// Set when the entry was installed by `ensure_defaults` rather than an
    /// explicit `register` call. Defaults fill gaps; they never clobber.
    pub default_provider: bool,
}

/// String-keyed entry store with idempotent registration.
///
/// Readers proceed concurrently; writers take the exclusive section. No lock
/// is ever held across blocking I/O — values are published after they are
/// fully constructed.
pub struct Registry<V> {
    entries: RwLock<HashMap<String, RegistryEntry<V>>>,
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Registry<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, RegistryEntry<V>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, RegistryEntry<V>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert or replace the entry for `key` per `policy`.
    ///
    /// Returns `true` when the value was written, `false` when an existing
    /// entry was kept under [`OverwritePolicy::KeepExisting`]. Replacement is
    /// atomic: concurrent readers observe either the old or the new entry,
    /// never a partial state.
    pub fn register(&self, key: &str, value: V, policy: OverwritePolicy) -> Result<bool> {
        validate_key(key)?;
        let mut entries = self.write();
        if entries.contains_key(key) && policy == OverwritePolicy::KeepExisting {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            RegistryEntry {
                key: key.to_string(),
                value,
                default_provider: false,
            },
        );
        Ok(true)
    }

    /// Populate missing keys with built-in defaults.
    ///
    /// Existing entries — default or explicit — are never overwritten, so the
    /// call is idempotent and safe from any bootstrap path in any order.
    /// Returns the number of entries inserted. All inserts happen in one
    /// exclusive section.
    pub fn ensure_defaults<I>(&self, defaults: I) -> Result<usize>
    where
        I: IntoIterator<Item = (String, V)>,
    {
        let defaults: Vec<(String, V)> = defaults.into_iter().collect();
        for (key, _) in &defaults {
            validate_key(key)?;
        }
        let mut entries = self.write();
        let mut inserted = 0;
        for (key, value) in defaults {
            if entries.contains_key(&key) {
                continue;
            }
            entries.insert(
                key.clone(),
                RegistryEntry {
                    key,
                    value,
                    default_provider: true,
                },
            );
            inserted += 1;
        }
        Ok(inserted)
    }

    /// Remove the entry for `key`, returning it if present.
    ///
    /// Entries are never dropped implicitly; this exists for explicit
    /// reinitialization only.
    pub fn remove(&self, key: &str) -> Option<RegistryEntry<V>> {
        self.write().remove(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Sorted snapshot of all registered keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl<V: Clone> Registry<V> {
    /// Look up the entry for `key`.
    ///
    /// A missing key is [`Error::NotFound`]. "Registered but unbound" is a
    /// consumer-level defect and is diagnosed by the consumer, not here.
    pub fn get(&self, key: &str) -> Result<RegistryEntry<V>> {
        self.read()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::not_found(key))
    }
}

/// Keys must be non-empty and free of whitespace and control characters.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(Error::invalid_key(key));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use {super::*, std::sync::Arc};

    #[test]
    fn register_and_get() {
        let registry = Registry::new();
        registry
            .register("account", 1u32, OverwritePolicy::Replace)
            .unwrap();
        let entry = registry.get("account").unwrap();
        assert_eq!(entry.value, 1);
        assert!(!entry.default_provider);
    }

    #[test]
    fn get_missing_key_is_not_found() {
        let registry: Registry<u32> = Registry::new();
        let err = registry.get("nope").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn empty_key_rejected() {
        let registry = Registry::new();
        let err = registry
            .register("", 1u32, OverwritePolicy::Replace)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidKey { .. }));
    }

    #[test]
    fn whitespace_key_rejected() {
        let registry = Registry::new();
        assert!(
            registry
                .register("bad key", 1u32, OverwritePolicy::Replace)
                .is_err()
        );
        assert!(
            registry
                .register("bad\nkey", 1u32, OverwritePolicy::Replace)
                .is_err()
        );
    }

    #[test]
    fn replace_policy_overwrites() {
        let registry = Registry::new();
        registry
            .register("k", 1u32, OverwritePolicy::Replace)
            .unwrap();
        let wrote = registry
            .register("k", 2u32, OverwritePolicy::Replace)
            .unwrap();
        assert!(wrote);
        assert_eq!(registry.get("k").unwrap().value, 2);
    }

    #[test]
    fn keep_existing_policy_preserves() {
        let registry = Registry::new();
        registry
            .register("k", 1u32, OverwritePolicy::Replace)
            .unwrap();
        let wrote = registry
            .register("k", 2u32, OverwritePolicy::KeepExisting)
            .unwrap();
        assert!(!wrote);
        assert_eq!(registry.get("k").unwrap().value, 1);
    }

    #[test]
    fn ensure_defaults_fills_gaps_only() {
        let registry = Registry::new();
        registry
            .register("account", 99u32, OverwritePolicy::Replace)
            .unwrap();

        let inserted = registry
            .ensure_defaults(vec![
                ("account".to_string(), 0u32),
                ("preferences".to_string(), 0u32),
            ])
            .unwrap();

        assert_eq!(inserted, 1);
        // Explicit registration untouched.
        let account = registry.get("account").unwrap();
        assert_eq!(account.value, 99);
        assert!(!account.default_provider);
        // Gap filled and marked as a default.
        assert!(registry.get("preferences").unwrap().default_provider);
    }

    #[test]
    fn ensure_defaults_is_idempotent() {
        let registry = Registry::new();
        let defaults = || {
            vec![
                ("account".to_string(), 0u32),
                ("preferences".to_string(), 0u32),
                ("context".to_string(), 0u32),
                ("schedules".to_string(), 0u32),
            ]
        };

        registry.ensure_defaults(defaults()).unwrap();
        let keys_once = registry.keys();
        for _ in 0..5 {
            let inserted = registry.ensure_defaults(defaults()).unwrap();
            assert_eq!(inserted, 0);
        }
        assert_eq!(registry.keys(), keys_once);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn ensure_defaults_order_insensitive() {
        // Two independent bootstrap sequences must converge on the same
        // required-key coverage.
        let forward = vec![("a".to_string(), 0u32), ("b".to_string(), 0u32)];
        let backward = vec![("b".to_string(), 0u32), ("a".to_string(), 0u32)];

        let first = Registry::new();
        first.ensure_defaults(forward.clone()).unwrap();
        first.ensure_defaults(backward.clone()).unwrap();

        let second = Registry::new();
        second.ensure_defaults(backward).unwrap();
        second.ensure_defaults(forward).unwrap();

        assert_eq!(first.keys(), second.keys());
    }

    #[test]
    fn ensure_defaults_validates_all_keys_before_writing() {
        let registry: Registry<u32> = Registry::new();
        let result = registry.ensure_defaults(vec![
            ("good".to_string(), 0u32),
            ("".to_string(), 0u32),
        ]);
        assert!(result.is_err());
        // Nothing was written: the batch is atomic.
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_returns_entry() {
        let registry = Registry::new();
        registry
            .register("k", 7u32, OverwritePolicy::Replace)
            .unwrap();
        let removed = registry.remove("k");
        assert_eq!(removed.map(|e| e.value), Some(7));
        assert!(!registry.contains("k"));
    }

    #[test]
    fn shared_instance_visible_across_threads() {
        let registry = Arc::new(Registry::new());
        let writer = Arc::clone(&registry);
        let handle = std::thread::spawn(move || {
            writer
                .register("from-thread", 42u32, OverwritePolicy::Replace)
                .unwrap();
        });
        handle.join().unwrap();
        assert_eq!(registry.get("from-thread").unwrap().value, 42);
    }
}
