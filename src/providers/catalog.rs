//! Movie metadata API client (TMDB-compatible).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ProviderError, check_status};

const PROVIDER: &str = "catalog";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
}

/// Movie details joined with the cast list from the credits endpoint.
#[derive(Debug, Clone)]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub original_language: Option<String>,
    pub tagline: Option<String>,
    pub genres: serde_json::Value,
    pub casts: serde_json::Value,
    pub vote_average: f64,
    pub runtime: i32,
}

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn now_playing(&self) -> Result<Vec<MovieSummary>, ProviderError>;
    async fn details(&self, movie_id: i64) -> Result<MovieDetail, ProviderError>;
}

#[derive(Debug)]
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
}

impl TmdbClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::Config("catalog API key is empty".into()));
        }

        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|_| ProviderError::Config("Invalid catalog API key format".into()))?;
        headers.insert(AUTHORIZATION, token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct NowPlayingPage {
    #[serde(default)]
    results: Vec<MovieSummary>,
}

#[derive(Debug, Deserialize)]
struct RawDetails {
    id: i64,
    title: String,
    #[serde(default)]
    overview: String,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    backdrop_path: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    original_language: Option<String>,
    #[serde(default)]
    tagline: Option<String>,
    #[serde(default = "empty_array")]
    genres: serde_json::Value,
    #[serde(default)]
    vote_average: f64,
    #[serde(default)]
    runtime: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct RawCredits {
    #[serde(default = "empty_array")]
    cast: serde_json::Value,
}

fn empty_array() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}

#[async_trait]
impl CatalogProvider for TmdbClient {
    async fn now_playing(&self) -> Result<Vec<MovieSummary>, ProviderError> {
        let url = format!("{}/movie/now_playing", self.base_url);
        let resp = self.http.get(&url).send().await?;
        check_status(PROVIDER, &resp)?;
        let page: NowPlayingPage = resp.json().await?;
        Ok(page.results)
    }

    async fn details(&self, movie_id: i64) -> Result<MovieDetail, ProviderError> {
        let details_url = format!("{}/movie/{}", self.base_url, movie_id);
        let credits_url = format!("{}/movie/{}/credits", self.base_url, movie_id);

        let (details_resp, credits_resp) = tokio::try_join!(
            self.http.get(&details_url).send(),
            self.http.get(&credits_url).send(),
        )?;
        check_status(PROVIDER, &details_resp)?;
        check_status(PROVIDER, &credits_resp)?;

        let (details, credits) = tokio::try_join!(
            details_resp.json::<RawDetails>(),
            credits_resp.json::<RawCredits>(),
        )?;

        Ok(MovieDetail {
            id: details.id,
            title: details.title,
            overview: details.overview,
            poster_path: details.poster_path,
            backdrop_path: details.backdrop_path,
            release_date: details.release_date,
            original_language: details.original_language,
            tagline: details.tagline,
            genres: details.genres,
            casts: credits.cast,
            vote_average: details.vote_average,
            runtime: details.runtime.unwrap_or(0),
        })
    }
}
