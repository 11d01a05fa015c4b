use crate::config::Settings;
use crate::domain::{Entity, RatingCategory};
use crate::ingest::error::FetchError;
use crate::ingest::types::{LeaderboardResponse, LeaderboardUser, RatingHistoryCategory};
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Remote rating service. Each call is a single attempt; callers decide what a
/// failure means for the run.
#[async_trait::async_trait]
pub trait RatingProviderClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Top `n` users for `category`, best first, exactly as the service ranks them.
    async fn fetch_leaderboard(
        &self,
        n: usize,
        category: &RatingCategory,
    ) -> Result<Vec<LeaderboardUser>, FetchError>;

    /// Full rating history of `entity`, all disciplines.
    async fn fetch_rating_history(
        &self,
        entity: &Entity,
    ) -> Result<Vec<RatingHistoryCategory>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpRatingProvider {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpRatingProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout_secs = settings
            .rating_api_timeout_secs
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let base_url = Url::parse(settings.rating_api_base_url.trim())
            .with_context(|| format!("invalid RATING_API_BASE_URL: {}", settings.rating_api_base_url))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "RATING_API_BASE_URL cannot be used as a base: {base_url}"
        );

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(headers)
            .build()
            .context("failed to build rating provider http client")?;

        Ok(Self { http, base_url })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `from_settings`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let target = url.to_string();

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::transport(&target, err))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|err| FetchError::transport(&target, err))?;

        decode(&target, status, &text)
    }
}

/// Non-2xx is a transport failure; a 2xx body that does not deserialize into
/// `T` is a format failure.
fn decode<T: DeserializeOwned>(
    target: &str,
    status: StatusCode,
    text: &str,
) -> Result<T, FetchError> {
    if !status.is_success() {
        return Err(FetchError::transport(
            target,
            format!("HTTP {status}: {}", truncate(text, 200)),
        ));
    }

    serde_json::from_str::<T>(text).map_err(|err| FetchError::response_format(target, err))
}

#[async_trait::async_trait]
impl RatingProviderClient for HttpRatingProvider {
    fn provider_name(&self) -> &'static str {
        "lichess_http_json"
    }

    async fn fetch_leaderboard(
        &self,
        n: usize,
        category: &RatingCategory,
    ) -> Result<Vec<LeaderboardUser>, FetchError> {
        let count = n.to_string();
        let url = self.url(&["player", "top", &count, category.leaderboard_key()]);
        let body: LeaderboardResponse = self.get_json(url).await?;
        Ok(body.users)
    }

    async fn fetch_rating_history(
        &self,
        entity: &Entity,
    ) -> Result<Vec<RatingHistoryCategory>, FetchError> {
        let url = self.url(&["user", &entity.id, "rating-history"]);
        self.get_json(url).await
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
