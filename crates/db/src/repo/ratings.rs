use sqlx::SqlitePool;
use tracing::{info, warn};

use cinedex_core::RawRatingRow;

use crate::LoadError;

/// Bulk-load rating rows, but only into an empty table: the whole table is
/// the idempotence unit, so a rerun against a populated store loads nothing
/// regardless of input. Returns the number of rows loaded.
pub async fn load_if_empty(pool: &SqlitePool, rows: &[RawRatingRow]) -> Result<u64, LoadError> {
    let existing = count(pool).await.map_err(LoadError::from)?;
    if existing > 0 {
        info!(existing, "ratings already present, skipping bulk load");
        return Ok(0);
    }

    let mut tx = pool.begin().await.map_err(LoadError::from)?;
    let mut loaded = 0u64;

    for row in rows {
        let rating = row.rating.clamp(0.0, 5.0);
        if rating != row.rating {
            warn!(
                movie_id = row.movie_id,
                user_id = row.user_id,
                rating = row.rating,
                "rating out of range, clamped"
            );
        }

        sqlx::query("INSERT INTO ratings (movie_id, user_id, rating, rated_ts) VALUES (?, ?, ?, ?)")
            .bind(row.movie_id)
            .bind(row.user_id)
            .bind(rating)
            .bind(row.timestamp)
            .execute(&mut *tx)
            .await?;
        loaded += 1;
    }

    tx.commit().await.map_err(LoadError::from)?;
    info!(loaded, "ratings bulk load complete");
    Ok(loaded)
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ratings")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
