use sqlx::SqlitePool;
use tracing::debug;

use crate::LoadError;

/// Placeholder some catalogs put in their genre column; never persisted.
pub const NO_GENRES_SENTINEL: &str = "(no genres listed)";

/// Canonical form used for uniqueness: whitespace collapsed and trimmed.
/// Case differences are absorbed by the NOCASE collation on `genre_name`.
/// Returns `None` for empty input and for the sentinel.
pub fn canonicalize(name: &str) -> Option<String> {
    let tidied = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if tidied.is_empty() || tidied.eq_ignore_ascii_case(NO_GENRES_SENTINEL) {
        return None;
    }
    Some(tidied)
}

/// Insert-if-absent for each genre name, then insert-if-absent junction
/// pairs. Existing genre rows are never overwritten. Returns the number of
/// distinct genres linked to the movie by this call's input. Runs on a
/// single connection so the statements can join a caller's transaction.
pub async fn upsert_for_movie(
    conn: &mut sqlx::SqliteConnection,
    movie_id: i64,
    names: &[String],
) -> Result<usize, LoadError> {
    let mut canonical: Vec<String> = Vec::new();
    for name in names {
        if let Some(c) = canonicalize(name) {
            if !canonical.iter().any(|seen| seen.eq_ignore_ascii_case(&c)) {
                canonical.push(c);
            }
        }
    }

    for genre_name in &canonical {
        sqlx::query("INSERT OR IGNORE INTO genres (genre_name) VALUES (?)")
            .bind(genre_name)
            .execute(&mut *conn)
            .await?;

        let (genre_id,): (i64,) =
            sqlx::query_as("SELECT genre_id FROM genres WHERE genre_name = ?")
                .bind(genre_name)
                .fetch_one(&mut *conn)
                .await
                .map_err(LoadError::from)?;

        sqlx::query("INSERT OR IGNORE INTO movie_genres (movie_id, genre_id) VALUES (?, ?)")
            .bind(movie_id)
            .bind(genre_id)
            .execute(&mut *conn)
            .await?;
    }

    debug!(movie_id, genres = canonical.len(), "genres linked");
    Ok(canonical.len())
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM genres")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

pub async fn count_links(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM movie_genres")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
