use serde::{Deserialize, Serialize};

/// One row of the local movie catalog. Source of truth for identity;
/// immutable once read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub local_id: i64,
    pub raw_title: String,
    pub hinted_year: Option<i32>,
}

/// A user rating row as delivered by the ratings file, already type-coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRatingRow {
    pub movie_id: i64,
    pub user_id: i64,
    pub rating: f64,
    pub timestamp: Option<i64>,
}

/// How a catalog entry fared by the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOutcome {
    /// Loaded with metadata from the external service.
    Enriched,
    /// Loaded with default field values after resolution failed.
    Defaulted,
    /// Not loaded; reason is in the log.
    Skipped,
}

impl EntryOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enriched => "enriched",
            Self::Defaulted => "defaulted",
            Self::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for EntryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
