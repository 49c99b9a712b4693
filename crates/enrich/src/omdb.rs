//! OMDb provider client.
//!
//! OMDb API: https://www.omdbapi.com/ — title-indexed lookup returning a
//! flat JSON payload, with `"Response": "False"` as the not-found signal
//! and `"N/A"` as the missing-field sentinel.

use std::time::Duration;

use tracing::{debug, warn};

use crate::provider::MovieLookup;
use crate::throttle::RequestThrottle;
use crate::{LookupError, ResolvedMetadata};

const BASE_URL: &str = "https://www.omdbapi.com/";

#[derive(Debug, Clone)]
pub struct OmdbConfig {
    pub api_key: String,
    /// Minimum spacing between attempts, shared across the whole run.
    pub min_interval: Duration,
    /// Delay before the single retry of a failed attempt.
    pub retry_delay: Duration,
    /// Per-request transport timeout.
    pub timeout: Duration,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            min_interval: Duration::from_millis(500),
            retry_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(10),
        }
    }
}

pub struct OmdbClient {
    config: OmdbConfig,
    client: reqwest::Client,
    throttle: RequestThrottle,
}

impl OmdbClient {
    pub fn new(config: OmdbConfig) -> Self {
        let throttle = RequestThrottle::new(config.min_interval);
        Self {
            config,
            client: reqwest::Client::new(),
            throttle,
        }
    }

    async fn get_json(&self, params: &[(&str, &str)]) -> Result<serde_json::Value, LookupError> {
        debug!(?params, "OMDb request");

        let resp = self
            .client
            .get(BASE_URL)
            .query(params)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| LookupError::Unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LookupError::Unavailable(format!(
                "OMDb returned {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| LookupError::Unavailable(format!("parse JSON: {e}")))
    }
}

/// One outbound attempt, kept behind a seam so the retry policy below can
/// be exercised without a live endpoint.
#[async_trait::async_trait]
trait FetchPayload: Send + Sync {
    async fn fetch(&self) -> Result<serde_json::Value, LookupError>;
}

struct HttpFetch<'a> {
    client: &'a OmdbClient,
    params: &'a [(&'a str, &'a str)],
}

#[async_trait::async_trait]
impl FetchPayload for HttpFetch<'_> {
    async fn fetch(&self) -> Result<serde_json::Value, LookupError> {
        self.client.get_json(self.params).await
    }
}

/// Two attempts at most, `retry_delay` apart, with every attempt (the
/// retry included) drawing from the shared throttle. A well-formed
/// negative (`"Response": "False"`) is definitive and never retried;
/// retrying it would only burn budget.
async fn fetch_with_retry(
    source: &dyn FetchPayload,
    throttle: &RequestThrottle,
    retry_delay: Duration,
) -> Result<serde_json::Value, LookupError> {
    let mut last_err = None;
    for attempt in 0..2 {
        if attempt > 0 {
            tokio::time::sleep(retry_delay).await;
        }
        throttle.acquire().await;

        match source.fetch().await {
            Ok(data) => {
                if data["Response"].as_str() == Some("True") {
                    return Ok(data);
                }
                return Err(LookupError::NotFound);
            }
            Err(e) => {
                warn!(attempt, error = %e, "OMDb request failed");
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| LookupError::Unavailable("retries exhausted".into())))
}

#[async_trait::async_trait]
impl MovieLookup for OmdbClient {
    fn name(&self) -> &str {
        "omdb"
    }

    async fn lookup(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<ResolvedMetadata, LookupError> {
        let year_str = year.map(|y| y.to_string());
        let mut params = vec![
            ("apikey", self.config.api_key.as_str()),
            ("type", "movie"),
            ("t", title),
        ];
        if let Some(ref y) = year_str {
            params.push(("y", y));
        }

        let source = HttpFetch {
            client: self,
            params: &params,
        };
        let data = fetch_with_retry(&source, &self.throttle, self.config.retry_delay).await?;
        debug!(title, ?year, "OMDb match");
        Ok(parse_payload(&data))
    }
}

/// OMDb uses the string "N/A" where a field has no value.
fn non_na(value: &serde_json::Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty() && *s != "N/A")
}

/// "$330,455,270" -> 33045527000
fn parse_box_office_cents(raw: &str) -> Option<i64> {
    let dollars: i64 = raw.replace(['$', ','], "").trim().parse().ok()?;
    dollars.checked_mul(100)
}

/// "148 min" -> 148
fn parse_runtime_minutes(raw: &str) -> Option<i64> {
    raw.split_whitespace().next()?.parse().ok()
}

fn parse_payload(data: &serde_json::Value) -> ResolvedMetadata {
    ResolvedMetadata {
        external_id: non_na(&data["imdbID"]).map(str::to_string),
        plot: non_na(&data["Plot"]).map(str::to_string),
        director: non_na(&data["Director"]).map(str::to_string),
        box_office_cents: non_na(&data["BoxOffice"]).and_then(parse_box_office_cents),
        runtime_minutes: non_na(&data["Runtime"]).and_then(parse_runtime_minutes),
        external_rating: non_na(&data["imdbRating"]).and_then(|r| r.parse().ok()),
        release_year: non_na(&data["Year"])
            .and_then(|y| y.get(..4))
            .and_then(|y| y.parse().ok()),
        genre_names: non_na(&data["Genre"])
            .map(|g| {
                g.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    enum FetchOutcome {
        Payload(serde_json::Value),
        Fail,
    }

    /// Replays a fixed sequence of outcomes and counts how often it is hit.
    struct ScriptedFetch {
        script: Vec<FetchOutcome>,
        calls: Mutex<usize>,
    }

    impl ScriptedFetch {
        fn new(script: Vec<FetchOutcome>) -> Self {
            Self {
                script,
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl FetchPayload for ScriptedFetch {
        async fn fetch(&self) -> Result<serde_json::Value, LookupError> {
            let mut calls = self.calls.lock().unwrap();
            let step = *calls;
            *calls += 1;
            match self.script.get(step) {
                Some(FetchOutcome::Payload(v)) => Ok(v.clone()),
                _ => Err(LookupError::Unavailable("connection reset".into())),
            }
        }
    }

    fn positive_payload() -> serde_json::Value {
        serde_json::json!({ "Response": "True", "Title": "Heat", "Year": "1995" })
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_failure_stops_after_one_retry() {
        let source = ScriptedFetch::new(vec![FetchOutcome::Fail, FetchOutcome::Fail]);
        let throttle = RequestThrottle::new(Duration::ZERO);

        let err = fetch_with_retry(&source, &throttle, Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, LookupError::Unavailable(_)));
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn definitive_negative_is_not_retried() {
        let source = ScriptedFetch::new(vec![FetchOutcome::Payload(serde_json::json!({
            "Response": "False",
            "Error": "Movie not found!"
        }))]);
        let throttle = RequestThrottle::new(Duration::ZERO);

        let err = fetch_with_retry(&source, &throttle, Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, LookupError::NotFound));
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_recovers_on_retry() {
        let source = ScriptedFetch::new(vec![
            FetchOutcome::Fail,
            FetchOutcome::Payload(positive_payload()),
        ]);
        let throttle = RequestThrottle::new(Duration::ZERO);

        let data = fetch_with_retry(&source, &throttle, Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(data["Title"].as_str(), Some("Heat"));
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_waits_on_the_shared_throttle() {
        let source = ScriptedFetch::new(vec![
            FetchOutcome::Fail,
            FetchOutcome::Payload(positive_payload()),
        ]);
        let throttle = RequestThrottle::new(Duration::from_millis(500));
        let start = tokio::time::Instant::now();

        // With no retry delay, the 500ms gap can only come from the
        // second attempt consuming its own throttle slot.
        fetch_with_retry(&source, &throttle, Duration::ZERO)
            .await
            .unwrap();

        assert!(start.elapsed() >= Duration::from_millis(500));
        assert_eq!(source.call_count(), 2);
    }

    #[test]
    fn parse_full_payload() {
        let json = serde_json::json!({
            "Response": "True",
            "Title": "Toy Story",
            "Year": "1995",
            "imdbID": "tt0114709",
            "Director": "John Lasseter",
            "Plot": "A cowboy doll is profoundly threatened...",
            "BoxOffice": "$223,225,679",
            "Runtime": "81 min",
            "imdbRating": "8.3",
            "Genre": "Animation, Adventure, Comedy"
        });

        let meta = parse_payload(&json);
        assert_eq!(meta.external_id.as_deref(), Some("tt0114709"));
        assert_eq!(meta.director.as_deref(), Some("John Lasseter"));
        assert_eq!(meta.box_office_cents, Some(22_322_567_900));
        assert_eq!(meta.runtime_minutes, Some(81));
        assert!((meta.external_rating.unwrap() - 8.3).abs() < 0.01);
        assert_eq!(meta.release_year, Some(1995));
        assert_eq!(meta.genre_names, vec!["Animation", "Adventure", "Comedy"]);
    }

    #[test]
    fn na_sentinels_become_absent_fields() {
        let json = serde_json::json!({
            "Response": "True",
            "Title": "Obscure Film",
            "Year": "N/A",
            "imdbID": "tt9999999",
            "Director": "N/A",
            "Plot": "N/A",
            "BoxOffice": "N/A",
            "Runtime": "N/A",
            "imdbRating": "N/A",
            "Genre": "N/A"
        });

        let meta = parse_payload(&json);
        assert_eq!(meta.external_id.as_deref(), Some("tt9999999"));
        assert_eq!(meta.director, None);
        assert_eq!(meta.plot, None);
        assert_eq!(meta.box_office_cents, None);
        assert_eq!(meta.runtime_minutes, None);
        assert_eq!(meta.external_rating, None);
        assert_eq!(meta.release_year, None);
        assert!(meta.genre_names.is_empty());
    }

    #[test]
    fn box_office_parses_to_cents() {
        assert_eq!(parse_box_office_cents("$1,234,567"), Some(123_456_700));
        assert_eq!(parse_box_office_cents("500"), Some(50_000));
        assert_eq!(parse_box_office_cents("no idea"), None);
    }

    #[test]
    fn runtime_parses_leading_minutes() {
        assert_eq!(parse_runtime_minutes("148 min"), Some(148));
        assert_eq!(parse_runtime_minutes("90"), Some(90));
        assert_eq!(parse_runtime_minutes("min"), None);
    }
}
