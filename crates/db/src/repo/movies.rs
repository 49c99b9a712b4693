use sqlx::SqlitePool;

use crate::LoadError;

/// Substituted when resolution failed or the service had no director.
pub const DEFAULT_DIRECTOR: &str = "Unknown";
/// Substituted when resolution failed or the service had no plot.
pub const DEFAULT_PLOT: &str = "Not Available";

/// A movie row as persisted. `movie_id` is the catalog's local id and is
/// stable across runs; `imdb_id` is unique when present.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub movie_id: i64,
    pub title: String,
    pub release_year: Option<i32>,
    pub imdb_id: Option<String>,
    pub plot: String,
    pub director: String,
    pub box_office_cents: Option<i64>,
    pub runtime_mins: Option<i64>,
    pub imdb_rating: Option<f64>,
}

/// Insert or fully overwrite a movie keyed by `movie_id`. A rerun with
/// refreshed metadata updates the row in place; `created_at` keeps the
/// timestamp of the first load. Takes any executor so the write can join
/// a caller's transaction.
pub async fn upsert(
    executor: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    record: &MovieRecord,
) -> Result<(), LoadError> {
    let now = chrono::Utc::now().timestamp();
    sqlx::query(
        "INSERT INTO movies \
         (movie_id, title, release_year, imdb_id, plot, director, box_office_cents, \
          runtime_mins, imdb_rating, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT(movie_id) DO UPDATE SET \
         title = excluded.title, release_year = excluded.release_year, \
         imdb_id = excluded.imdb_id, plot = excluded.plot, \
         director = excluded.director, box_office_cents = excluded.box_office_cents, \
         runtime_mins = excluded.runtime_mins, imdb_rating = excluded.imdb_rating",
    )
    .bind(record.movie_id)
    .bind(&record.title)
    .bind(record.release_year)
    .bind(&record.imdb_id)
    .bind(&record.plot)
    .bind(&record.director)
    .bind(record.box_office_cents)
    .bind(record.runtime_mins)
    .bind(record.imdb_rating)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get(pool: &SqlitePool, movie_id: i64) -> Result<Option<MovieRecord>, sqlx::Error> {
    let row: Option<(
        i64,
        String,
        Option<i32>,
        Option<String>,
        String,
        String,
        Option<i64>,
        Option<i64>,
        Option<f64>,
    )> = sqlx::query_as(
        "SELECT movie_id, title, release_year, imdb_id, plot, director, \
         box_office_cents, runtime_mins, imdb_rating FROM movies WHERE movie_id = ?",
    )
    .bind(movie_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(
        |(
            movie_id,
            title,
            release_year,
            imdb_id,
            plot,
            director,
            box_office_cents,
            runtime_mins,
            imdb_rating,
        )| MovieRecord {
            movie_id,
            title,
            release_year,
            imdb_id,
            plot,
            director,
            box_office_cents,
            runtime_mins,
            imdb_rating,
        },
    ))
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM movies")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// Movies that carry an external id, i.e. were actually enriched.
pub async fn count_enriched(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM movies WHERE imdb_id IS NOT NULL")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
