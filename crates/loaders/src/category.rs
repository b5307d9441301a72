use std::str::FromStr;

/// The built-in user-data categories.
///
/// Registry keys are plain strings, so additional categories can be
/// registered beyond these; the four below are required after bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataCategory {
    Account,
    Preferences,
    Context,
    Schedules,
}

impl DataCategory {
    /// Categories every bootstrapped registry must resolve.
    pub const REQUIRED: &[DataCategory] = &[
        DataCategory::Account,
        DataCategory::Preferences,
        DataCategory::Context,
        DataCategory::Schedules,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Preferences => "preferences",
            Self::Context => "context",
            Self::Schedules => "schedules",
        }
    }
}

impl std::fmt::Display for DataCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "account" => Ok(Self::Account),
            "preferences" => Ok(Self::Preferences),
            "context" => Ok(Self::Context),
            "schedules" => Ok(Self::Schedules),
            other => Err(format!("unknown data category: {other}")),
        }
    }
}

/// One category's worth of data for one user.
#[derive(Debug, Clone)]
pub struct CategoryData {
    pub category: String,
    pub user_id: String,
    pub data: serde_json::Value,
}
