//! Read-only aggregate queries run after a load completes. They consume the
//! finished schema and feed nothing back into the pipeline.

use sqlx::SqlitePool;

use crate::repo::movies::DEFAULT_DIRECTOR;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TopMovie {
    pub title: String,
    pub avg_rating: f64,
    pub rating_count: i64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct GenreStat {
    pub genre_name: String,
    pub avg_rating: f64,
    pub rating_count: i64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DirectorStat {
    pub director: String,
    pub movie_count: i64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct YearStat {
    pub release_year: i64,
    pub avg_rating: f64,
}

/// Highest average rating, rating volume as the tie-break.
pub async fn top_rated_movie(pool: &SqlitePool) -> Result<Option<TopMovie>, sqlx::Error> {
    let row: Option<(String, f64, i64)> = sqlx::query_as(
        "SELECT m.title, AVG(r.rating) AS avg_rating, COUNT(r.rating) AS n \
         FROM movies m JOIN ratings r ON r.movie_id = m.movie_id \
         GROUP BY m.movie_id ORDER BY avg_rating DESC, n DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(title, avg_rating, rating_count)| TopMovie {
        title,
        avg_rating,
        rating_count,
    }))
}

/// Top genres by average rating, volume as the tie-break.
pub async fn top_genres(pool: &SqlitePool, limit: i64) -> Result<Vec<GenreStat>, sqlx::Error> {
    let rows: Vec<(String, f64, i64)> = sqlx::query_as(
        "SELECT g.genre_name, AVG(r.rating) AS avg_rating, COUNT(r.rating) AS n \
         FROM genres g \
         JOIN movie_genres mg ON mg.genre_id = g.genre_id \
         JOIN ratings r ON r.movie_id = mg.movie_id \
         GROUP BY g.genre_id ORDER BY avg_rating DESC, n DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(genre_name, avg_rating, rating_count)| GenreStat {
            genre_name,
            avg_rating,
            rating_count,
        })
        .collect())
}

/// Director with the most movies, name as the tie-break. The default
/// director placeholder is not a person and is excluded.
pub async fn most_prolific_director(
    pool: &SqlitePool,
) -> Result<Option<DirectorStat>, sqlx::Error> {
    let row: Option<(String, i64)> = sqlx::query_as(
        "SELECT director, COUNT(*) AS n FROM movies WHERE director <> ? \
         GROUP BY director ORDER BY n DESC, director ASC LIMIT 1",
    )
    .bind(DEFAULT_DIRECTOR)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(director, movie_count)| DirectorStat {
        director,
        movie_count,
    }))
}

/// Average rating per known release year, ascending by year.
pub async fn average_rating_by_year(pool: &SqlitePool) -> Result<Vec<YearStat>, sqlx::Error> {
    let rows: Vec<(i64, f64)> = sqlx::query_as(
        "SELECT m.release_year, AVG(r.rating) AS avg_rating \
         FROM movies m JOIN ratings r ON r.movie_id = m.movie_id \
         WHERE m.release_year IS NOT NULL \
         GROUP BY m.release_year ORDER BY m.release_year",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(release_year, avg_rating)| YearStat {
            release_year,
            avg_rating,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_pool() -> SqlitePool {
        let pool = crate::connect(":memory:").await.unwrap();
        crate::migrate::run(&pool).await.unwrap();

        for (movie_id, title, year, director) in [
            (1, "Toy Story", 1995, "John Lasseter"),
            (2, "Heat", 1995, "Michael Mann"),
            (3, "The Insider", 1999, "Michael Mann"),
            (4, "Mystery", 1999, DEFAULT_DIRECTOR),
        ] {
            sqlx::query(
                "INSERT INTO movies (movie_id, title, release_year, plot, director, created_at) \
                 VALUES (?, ?, ?, 'P', ?, 0)",
            )
            .bind(movie_id)
            .bind(title)
            .bind(year)
            .bind(director)
            .execute(&pool)
            .await
            .unwrap();
        }

        for (genre_id, name) in [(1, "Animation"), (2, "Crime")] {
            sqlx::query("INSERT INTO genres (genre_id, genre_name) VALUES (?, ?)")
                .bind(genre_id)
                .bind(name)
                .execute(&pool)
                .await
                .unwrap();
        }
        for (movie_id, genre_id) in [(1, 1), (2, 2), (3, 2)] {
            sqlx::query("INSERT INTO movie_genres (movie_id, genre_id) VALUES (?, ?)")
                .bind(movie_id)
                .bind(genre_id)
                .execute(&pool)
                .await
                .unwrap();
        }

        for (movie_id, rating) in [(1, 5.0), (1, 4.0), (2, 4.5), (2, 4.5), (3, 3.0)] {
            sqlx::query("INSERT INTO ratings (movie_id, user_id, rating) VALUES (?, 1, ?)")
                .bind(movie_id)
                .bind(rating)
                .execute(&pool)
                .await
                .unwrap();
        }

        pool
    }

    #[tokio::test]
    async fn top_rated_movie_uses_average_then_volume() {
        let pool = seeded_pool().await;
        let top = top_rated_movie(&pool).await.unwrap().unwrap();
        // Toy Story and Heat both average 4.5; equal volume, either ordering
        // of the tie is stable under SQLite, so assert the average.
        assert!((top.avg_rating - 4.5).abs() < f64::EPSILON);
        assert_eq!(top.rating_count, 2);
    }

    #[tokio::test]
    async fn top_genres_ranked_by_average() {
        let pool = seeded_pool().await;
        let stats = top_genres(&pool, 5).await.unwrap();
        assert_eq!(stats[0].genre_name, "Animation"); // avg 4.5 beats Crime's 4.0
        assert_eq!(stats.len(), 2);
    }

    #[tokio::test]
    async fn prolific_director_excludes_default_placeholder() {
        let pool = seeded_pool().await;
        let stat = most_prolific_director(&pool).await.unwrap().unwrap();
        assert_eq!(stat.director, "Michael Mann");
        assert_eq!(stat.movie_count, 2);
    }

    #[tokio::test]
    async fn yearly_averages_ascend_by_year() {
        let pool = seeded_pool().await;
        let stats = average_rating_by_year(&pool).await.unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].release_year, 1995);
        assert_eq!(stats[1].release_year, 1999);
        assert!((stats[1].avg_rating - 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn empty_store_reports_nothing() {
        let pool = crate::connect(":memory:").await.unwrap();
        crate::migrate::run(&pool).await.unwrap();
        assert!(top_rated_movie(&pool).await.unwrap().is_none());
        assert!(top_genres(&pool, 5).await.unwrap().is_empty());
        assert!(most_prolific_director(&pool).await.unwrap().is_none());
        assert!(average_rating_by_year(&pool).await.unwrap().is_empty());
    }
}
