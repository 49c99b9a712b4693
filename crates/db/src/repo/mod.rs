pub mod genres;
pub mod movies;
pub mod ratings;

use sqlx::SqlitePool;

use crate::LoadError;

/// Load one movie together with its genre links. The row and its links
/// land in a single transaction, so a failure or interruption partway
/// through leaves nothing behind for this entry.
pub async fn load_movie(
    pool: &SqlitePool,
    movie: &movies::MovieRecord,
    genre_names: &[String],
) -> Result<(), LoadError> {
    let mut tx = pool.begin().await.map_err(LoadError::from)?;
    movies::upsert(&mut *tx, movie).await?;
    genres::upsert_for_movie(&mut tx, movie.movie_id, genre_names).await?;
    tx.commit().await.map_err(LoadError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = crate::connect(":memory:").await.unwrap();
        crate::migrate::run(&pool).await.unwrap();
        pool
    }

    fn record(movie_id: i64) -> movies::MovieRecord {
        movies::MovieRecord {
            movie_id,
            title: "Heat".into(),
            release_year: Some(1995),
            imdb_id: Some("tt0113277".into()),
            plot: "A group of high-end thieves...".into(),
            director: "Michael Mann".into(),
            box_office_cents: Some(18_743_600_000),
            runtime_mins: Some(170),
            imdb_rating: Some(8.3),
        }
    }

    #[tokio::test]
    async fn movie_and_links_land_together() {
        let pool = test_pool().await;
        load_movie(&pool, &record(1), &["Action".into(), "Crime".into()])
            .await
            .unwrap();

        assert_eq!(movies::count(&pool).await.unwrap(), 1);
        assert_eq!(genres::count(&pool).await.unwrap(), 2);
        assert_eq!(genres::count_links(&pool).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn aborted_load_leaves_no_partial_rows() {
        let pool = test_pool().await;

        // Same statements load_movie runs, but the transaction is dropped
        // before commit, as a crash between the two stages would do.
        {
            let mut tx = pool.begin().await.unwrap();
            movies::upsert(&mut *tx, &record(1)).await.unwrap();
            genres::upsert_for_movie(&mut tx, 1, &["Action".into()])
                .await
                .unwrap();
        }

        assert_eq!(movies::count(&pool).await.unwrap(), 0);
        assert_eq!(genres::count(&pool).await.unwrap(), 0);
        assert_eq!(genres::count_links(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rejected_movie_links_no_genres() {
        let pool = test_pool().await;
        load_movie(&pool, &record(1), &["Action".into()]).await.unwrap();

        // Second movie reuses the first one's imdb_id; the whole entry,
        // genre links included, must be rejected as a unit.
        let mut clash = record(2);
        clash.title = "Not Heat".into();
        let err = load_movie(&pool, &clash, &["Thriller".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::ConstraintViolation(_)));

        assert_eq!(movies::count(&pool).await.unwrap(), 1);
        assert_eq!(genres::count(&pool).await.unwrap(), 1);
        assert_eq!(genres::count_links(&pool).await.unwrap(), 1);
    }
}
