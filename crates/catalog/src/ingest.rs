//! CSV ingestion for the local catalog and ratings files.
//!
//! MovieLens-shaped input: `movies.csv` with `movieId,title,genres`
//! (pipe-separated genre column) and `ratings.csv` with
//! `userId,movieId,rating,timestamp`.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use cinedex_core::{CatalogEntry, RawRatingRow};

use crate::CatalogError;

/// A catalog entry together with the genre names the catalog itself carries.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    pub entry: CatalogEntry,
    pub genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MovieCsvRow {
    #[serde(rename = "movieId")]
    movie_id: i64,
    title: String,
    genres: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RatingCsvRow {
    #[serde(rename = "userId")]
    user_id: i64,
    #[serde(rename = "movieId")]
    movie_id: i64,
    rating: f64,
    timestamp: Option<i64>,
}

/// Read the movie catalog. Raw titles are kept verbatim; the hinted year is
/// left unset because MovieLens embeds the year in the title string, where
/// the normalizer extracts it.
pub fn read_movies(path: impl AsRef<Path>) -> Result<Vec<CatalogRecord>, CatalogError> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut records = Vec::new();

    for row in reader.deserialize() {
        let row: MovieCsvRow = row?;
        let genres = row
            .genres
            .as_deref()
            .map(split_genre_column)
            .unwrap_or_default();
        records.push(CatalogRecord {
            entry: CatalogEntry {
                local_id: row.movie_id,
                raw_title: row.title,
                hinted_year: None,
            },
            genres,
        });
    }

    info!(path = %path.as_ref().display(), movies = records.len(), "catalog loaded");
    Ok(records)
}

/// Read the ratings file into raw rows. Range validation happens at load.
pub fn read_ratings(path: impl AsRef<Path>) -> Result<Vec<RawRatingRow>, CatalogError> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut rows = Vec::new();

    for row in reader.deserialize() {
        let row: RatingCsvRow = row?;
        rows.push(RawRatingRow {
            movie_id: row.movie_id,
            user_id: row.user_id,
            rating: row.rating,
            timestamp: row.timestamp,
        });
    }

    info!(path = %path.as_ref().display(), ratings = rows.len(), "ratings loaded");
    Ok(rows)
}

fn split_genre_column(column: &str) -> Vec<String> {
    column
        .split('|')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}
