use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors from the loader registry itself.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Lookup or registration failure in the underlying registry core.
    /// `NotFound` here means no entry exists for the category at all.
    #[error(transparent)]
    Registry(#[from] nestor_registry::Error),

    /// An entry exists but carries no loader. This is a configuration
    /// defect, deliberately distinct from a lookup miss.
    #[error("loader for category '{category}' is registered but unbound")]
    LoaderUnbound { category: String },

    /// A loader-internal failure, passed through untouched.
    #[error(transparent)]
    Load(#[from] LoadError),
}

impl Error {
    #[must_use]
    pub fn loader_unbound(category: impl Into<String>) -> Self {
        Self::LoaderUnbound {
            category: category.into(),
        }
    }
}

/// Failure inside a loader. The registry never interprets these.
#[derive(Debug, ThisError)]
pub enum LoadError {
    /// The store has no data for this user/category pair.
    #[error("no {category} data for user {user_id}")]
    NotFound { category: String, user_id: String },

    /// Wrapped source error from the persistence layer.
    #[error("loading {category} failed: {context}: {source}")]
    Failed {
        category: String,
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl LoadError {
    #[must_use]
    pub fn not_found(category: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::NotFound {
            category: category.into(),
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn failed(
        category: impl Into<String>,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Failed {
            category: category.into(),
            context: context.into(),
            source: Box::new(source),
        }
    }
}
