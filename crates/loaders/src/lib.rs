//! User-data loader registry.
//!
//! Maps data categories (account, preferences, context, schedules) to
//! pluggable loader implementations. Bootstrap is idempotent and
//! order-insensitive: `register_default_loaders` fills gaps with
//! store-backed defaults and never clobbers an explicitly registered
//! loader, so any number of entry modules can run it in any order and
//! converge on full required-category coverage.

pub mod category;
pub mod error;
pub mod loader;
pub mod registry;
pub mod store;

pub use {
    category::{CategoryData, DataCategory},
    error::{Error, LoadError, Result},
    loader::{LoaderEntry, UserDataLoader},
    registry::LoaderRegistry,
    store::{MemoryUserDataStore, StoreLoader, UserDataStore},
};
