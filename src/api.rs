//! HTTP client for the Podbean episodes API.
//!
//! This module provides the backend seam used by the fetch and save
//! workflows, the production reqwest implementation of it, and the
//! offset/limit pagination loop that accumulates the full episode list.

use crate::error::{AppError, Result};
use crate::types::{Episode, UpdatePayload};
use log::{debug, info};
use serde::Deserialize;
use std::time::Duration;

/// Base URL of the vendor API.
pub const DEFAULT_API_BASE: &str = "https://api.podbean.com";

/// Fixed page size for the episode list cursor.
pub const PAGE_LIMIT: usize = 100;

const USER_AGENT: &str = concat!("podbean-editor/", env!("CARGO_PKG_VERSION"));

// Response types for the episode list endpoint
#[derive(Debug, Deserialize)]
struct EpisodesResponse {
    #[serde(default)]
    episodes: Vec<Episode>,
}

// Response type for the episode update endpoint
#[derive(Debug, Deserialize)]
struct UpdateResponse {
    episode: Episode,
}

/// Error body returned by the vendor API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Produce a readable message from a non-success response body.
pub(crate) fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) => match err.error_description {
            Some(desc) => format!("{} ({})", desc, err.error),
            None => err.error,
        },
        Err(_) => format!("HTTP {}", status),
    }
}

/// The remote operations the editor needs from the vendor API.
///
/// Implemented by [`PodbeanClient`] for production use; tests substitute
/// scripted implementations so pagination and save semantics can run
/// without a network.
#[allow(async_fn_in_trait)]
pub trait EpisodeBackend {
    /// Fetch `limit` episodes starting at `offset`. An empty vec means the
    /// list is exhausted.
    async fn fetch_page(&self, token: &str, offset: usize, limit: usize) -> Result<Vec<Episode>>;

    /// Send an update for one episode; returns the server's echo of it.
    async fn update_episode(
        &self,
        token: &str,
        episode_id: &str,
        payload: &UpdatePayload,
    ) -> Result<Episode>;
}

/// reqwest-backed client for the Podbean API.
pub struct PodbeanClient {
    client: reqwest::Client,
    base_url: String,
}

impl PodbeanClient {
    /// Create a client against the production API.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    /// Create a client against a custom base URL.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Fetch(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl EpisodeBackend for PodbeanClient {
    async fn fetch_page(&self, token: &str, offset: usize, limit: usize) -> Result<Vec<Episode>> {
        let url = format!("{}/v1/episodes", self.base_url);
        let offset_str = offset.to_string();
        let limit_str = limit.to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("access_token", token),
                ("offset", offset_str.as_str()),
                ("limit", limit_str.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("episode list request failed: {}", e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AppError::Fetch(format!("failed to read episode list: {}", e)))?;

        if !status.is_success() {
            return Err(AppError::Fetch(api_error_message(status, &body)));
        }

        let parsed: EpisodesResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::Fetch(format!("malformed episode list: {}", e)))?;

        Ok(parsed.episodes)
    }

    async fn update_episode(
        &self,
        token: &str,
        episode_id: &str,
        payload: &UpdatePayload,
    ) -> Result<Episode> {
        let url = format!("{}/v1/episodes/{}", self.base_url, episode_id);

        let mut form = vec![("access_token", token.to_string())];
        form.extend(payload.to_form());

        let resp = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Save(format!("update request failed: {}", e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AppError::Save(format!("failed to read update response: {}", e)))?;

        if !status.is_success() {
            return Err(AppError::Save(api_error_message(status, &body)));
        }

        let parsed: UpdateResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::Save(format!("malformed update response: {}", e)))?;

        Ok(parsed.episode)
    }
}

/// Page through the remote episode list until exhausted.
///
/// Maintains a monotonically increasing offset starting at 0 with a fixed
/// limit of [`PAGE_LIMIT`]. The offset advances by the number of items each
/// page actually returned, so short pages are tolerated; the loop terminates
/// on the first empty page. A page failure aborts the whole fetch; no
/// partial collection is returned and nothing is retried.
pub async fn fetch_all_episodes<B: EpisodeBackend>(
    backend: &B,
    token: &str,
) -> Result<Vec<Episode>> {
    let mut all = Vec::new();
    let mut offset = 0;

    loop {
        debug!("Fetching episodes at offset {}", offset);
        let page = backend.fetch_page(token, offset, PAGE_LIMIT).await?;

        if page.is_empty() {
            break;
        }

        offset += page.len();
        all.extend(page);
    }

    info!("Fetched {} episodes", all.len());
    Ok(all)
}
