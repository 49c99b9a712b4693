//! Pipeline orchestrator: normalize, resolve, load, strictly sequential.
//!
//! Recovery policy per entry: an unresolved title is loaded with default
//! field values; a constraint violation skips that entry and is tallied;
//! storage failure aborts the run. Every catalog entry ends as either a
//! loaded row or a logged skip with its reason.

use sqlx::SqlitePool;
use tracing::{error, info, warn};

use cinedex_catalog::ingest::CatalogRecord;
use cinedex_catalog::titles;
use cinedex_core::{CatalogEntry, EntryOutcome, RawRatingRow};
use cinedex_db::LoadError;
use cinedex_db::repo::{self, movies, ratings};
use cinedex_enrich::provider::MovieLookup;
use cinedex_enrich::resolve::resolve;
use cinedex_enrich::{ResolutionError, ResolvedMetadata};

/// Per-run tally, reported at run end.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub enriched: usize,
    pub defaulted: usize,
    pub skipped: usize,
    pub ratings_loaded: u64,
}

/// Process the whole catalog, then the ratings file.
pub async fn run(
    pool: &SqlitePool,
    provider: &dyn MovieLookup,
    records: &[CatalogRecord],
    rating_rows: &[RawRatingRow],
) -> Result<RunStats, LoadError> {
    let mut stats = RunStats::default();

    for record in records {
        let entry = &record.entry;

        let resolved = match resolve(provider, entry).await {
            Ok(meta) => Some(meta),
            // Recovered here: the entry is still loaded, with defaults.
            Err(ResolutionError::Unresolved) => None,
        };
        let outcome = if resolved.is_some() {
            EntryOutcome::Enriched
        } else {
            EntryOutcome::Defaulted
        };

        let movie = to_movie_record(entry, resolved.as_ref());

        // Genres come from both the catalog column and the resolved
        // metadata; the loader canonicalizes and deduplicates.
        let mut genre_names = record.genres.clone();
        if let Some(meta) = &resolved {
            genre_names.extend(meta.genre_names.iter().cloned());
        }

        // One transaction per entry; an interrupted run leaves a valid
        // prefix of whole entries behind, never a movie without its links.
        match repo::load_movie(pool, &movie, &genre_names).await {
            Ok(()) => {
                info!(
                    movie_id = movie.movie_id,
                    title = %movie.title,
                    outcome = %outcome,
                    "entry loaded"
                );
                match outcome {
                    EntryOutcome::Enriched => stats.enriched += 1,
                    _ => stats.defaulted += 1,
                }
            }
            Err(LoadError::ConstraintViolation(reason)) => {
                warn!(
                    movie_id = entry.local_id,
                    outcome = %EntryOutcome::Skipped,
                    reason = %reason,
                    "entry skipped"
                );
                stats.skipped += 1;
            }
            Err(e @ LoadError::StorageUnavailable(_)) => {
                error!(movie_id = entry.local_id, error = %e, "storage failure, aborting run");
                return Err(e);
            }
        }
    }

    stats.ratings_loaded = ratings::load_if_empty(pool, rating_rows).await?;

    info!(
        enriched = stats.enriched,
        defaulted = stats.defaulted,
        skipped = stats.skipped,
        ratings_loaded = stats.ratings_loaded,
        "run complete"
    );
    Ok(stats)
}

/// Build the persisted row from the catalog entry and whatever resolution
/// produced, substituting documented defaults for absences. The release
/// year comes from the catalog hint, the title itself, or the metadata, in
/// that order; it is never guessed from anything else.
pub fn to_movie_record(
    entry: &CatalogEntry,
    resolved: Option<&ResolvedMetadata>,
) -> movies::MovieRecord {
    let release_year = entry
        .hinted_year
        .or_else(|| titles::extract_year(&entry.raw_title))
        .or_else(|| resolved.and_then(|r| r.release_year));

    movies::MovieRecord {
        movie_id: entry.local_id,
        title: titles::canonical_title(&entry.raw_title),
        release_year,
        imdb_id: resolved.and_then(|r| r.external_id.clone()),
        plot: resolved
            .and_then(|r| r.plot.clone())
            .unwrap_or_else(|| movies::DEFAULT_PLOT.to_string()),
        director: resolved
            .and_then(|r| r.director.clone())
            .unwrap_or_else(|| movies::DEFAULT_DIRECTOR.to_string()),
        box_office_cents: resolved.and_then(|r| r.box_office_cents),
        runtime_mins: resolved.and_then(|r| r.runtime_minutes),
        imdb_rating: resolved.and_then(|r| r.external_rating),
    }
}
