pub mod omdb;
pub mod provider;
pub mod resolve;
pub mod throttle;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    /// The service answered definitively that there is no match.
    #[error("no match found")]
    NotFound,
    /// Transport failure or malformed payload, after retry.
    #[error("lookup unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("no candidate resolved")]
    Unresolved,
}

/// Metadata accepted from the external lookup for one catalog entry.
/// Absent fields stay `None`; default substitution happens at load time.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResolvedMetadata {
    pub external_id: Option<String>,
    pub plot: Option<String>,
    pub director: Option<String>,
    pub box_office_cents: Option<i64>,
    pub runtime_minutes: Option<i64>,
    pub external_rating: Option<f64>,
    pub release_year: Option<i32>,
    pub genre_names: Vec<String>,
}
