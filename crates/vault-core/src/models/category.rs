//! Entry category

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fixed set of categories an entry can be filed under
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Journal,
    #[default]
    Note,
    Til,
    Project,
    Snippet,
}

impl Category {
    pub const ALL: [Self; 5] = [
        Self::Journal,
        Self::Note,
        Self::Til,
        Self::Project,
        Self::Snippet,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Journal => "journal",
            Self::Note => "note",
            Self::Til => "til",
            Self::Project => "project",
            Self::Snippet => "snippet",
        }
    }

    /// Parse a stored category, falling back to the default for unknown values.
    #[must_use]
    pub fn from_stored(value: Option<&str>) -> Self {
        value.and_then(|value| value.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == needle)
            .ok_or_else(|| format!("unknown category '{}'", s.trim()))
    }
}
