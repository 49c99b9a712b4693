use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cinedex_enrich::omdb::{OmdbClient, OmdbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let db_path = std::env::var("CINEDEX_DB").unwrap_or_else(|_| "cinedex.db".to_string());
    let movies_csv =
        std::env::var("CINEDEX_MOVIES_CSV").unwrap_or_else(|_| "movies.csv".to_string());
    let ratings_csv =
        std::env::var("CINEDEX_RATINGS_CSV").unwrap_or_else(|_| "ratings.csv".to_string());
    let api_key = std::env::var("CINEDEX_OMDB_KEY").context("CINEDEX_OMDB_KEY must be set")?;
    let delay_ms: u64 = std::env::var("CINEDEX_REQUEST_DELAY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(500);

    info!(db_path = %db_path, "connecting to database");
    let pool = cinedex_db::connect(&db_path)
        .await
        .context("failed to open database")?;

    cinedex_db::migrate::run(&pool)
        .await
        .context("failed to run migrations")?;
    info!("migrations complete");

    let records =
        cinedex_catalog::ingest::read_movies(&movies_csv).context("failed to read movie catalog")?;
    let rating_rows =
        cinedex_catalog::ingest::read_ratings(&ratings_csv).context("failed to read ratings")?;

    let client = OmdbClient::new(OmdbConfig {
        api_key,
        min_interval: Duration::from_millis(delay_ms),
        ..Default::default()
    });

    let stats = cinedex_pipeline::run::run(&pool, &client, &records, &rating_rows)
        .await
        .context("pipeline run failed")?;

    print_summary(&pool, &stats).await?;
    print_reports(&pool).await?;

    Ok(())
}

async fn print_summary(
    pool: &sqlx::SqlitePool,
    stats: &cinedex_pipeline::run::RunStats,
) -> anyhow::Result<()> {
    let movies = cinedex_db::repo::movies::count(pool).await?;
    let enriched = cinedex_db::repo::movies::count_enriched(pool).await?;
    let genres = cinedex_db::repo::genres::count(pool).await?;
    let links = cinedex_db::repo::genres::count_links(pool).await?;
    let ratings = cinedex_db::repo::ratings::count(pool).await?;

    info!(
        movies,
        enriched,
        genres,
        movie_genres = links,
        ratings,
        enriched_this_run = stats.enriched,
        defaulted_this_run = stats.defaulted,
        skipped_this_run = stats.skipped,
        ratings_loaded_this_run = stats.ratings_loaded,
        "store summary"
    );
    Ok(())
}

async fn print_reports(pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
    if let Some(top) = cinedex_db::report::top_rated_movie(pool).await? {
        info!(
            title = %top.title,
            avg_rating = top.avg_rating,
            ratings = top.rating_count,
            "top rated movie"
        );
    }

    for stat in cinedex_db::report::top_genres(pool, 5).await? {
        info!(
            genre = %stat.genre_name,
            avg_rating = stat.avg_rating,
            ratings = stat.rating_count,
            "top genre"
        );
    }

    if let Some(stat) = cinedex_db::report::most_prolific_director(pool).await? {
        info!(
            director = %stat.director,
            movies = stat.movie_count,
            "most prolific director"
        );
    }

    for stat in cinedex_db::report::average_rating_by_year(pool).await? {
        info!(
            year = stat.release_year,
            avg_rating = stat.avg_rating,
            "average rating by year"
        );
    }

    Ok(())
}
