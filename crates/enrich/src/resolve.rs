//! Match Resolver: drives normalizer candidates through the lookup client.
//!
//! The attempt chain is an explicit short-circuiting sequence: candidates in
//! rank order, each tried with its year first and then without. The first
//! success is accepted as-is; there is no post-hoc scoring of alternatives.

use tracing::{debug, warn};

use cinedex_catalog::titles;
use cinedex_core::CatalogEntry;

use crate::provider::MovieLookup;
use crate::{LookupError, ResolutionError, ResolvedMetadata};

pub async fn resolve(
    provider: &dyn MovieLookup,
    entry: &CatalogEntry,
) -> Result<ResolvedMetadata, ResolutionError> {
    let candidates = titles::generate_candidates(&entry.raw_title, entry.hinted_year);

    for candidate in &candidates {
        let mut attempts = Vec::with_capacity(2);
        if candidate.query_year.is_some() {
            attempts.push(candidate.query_year);
        }
        attempts.push(None);

        for year in attempts {
            match provider.lookup(&candidate.query_title, year).await {
                Ok(meta) => {
                    debug!(
                        local_id = entry.local_id,
                        candidate = %candidate.query_title,
                        rank = candidate.rank,
                        ?year,
                        provider = provider.name(),
                        "candidate matched"
                    );
                    return Ok(meta);
                }
                Err(LookupError::NotFound) => {
                    debug!(
                        local_id = entry.local_id,
                        candidate = %candidate.query_title,
                        ?year,
                        "no match, trying next"
                    );
                }
                Err(LookupError::Unavailable(e)) => {
                    warn!(
                        local_id = entry.local_id,
                        candidate = %candidate.query_title,
                        ?year,
                        error = %e,
                        "lookup unavailable, trying next"
                    );
                }
            }
        }
    }

    warn!(
        local_id = entry.local_id,
        title = %entry.raw_title,
        candidates = candidates.len(),
        "no candidate resolved"
    );
    Err(ResolutionError::Unresolved)
}
