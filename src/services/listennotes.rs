//! ListenNotes podcast directory client (REST v2)

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{Episode, PodcastDirectory, SearchFilters};
use crate::Result;

const API_BASE: &str = "https://listen-api.listennotes.com/api/v2";

pub struct ListenNotesClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct EpisodePayload {
    title: String,
    link: Option<String>,
    audio: String,
    audio_length_sec: u64,
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
    results: Vec<EpisodePayload>,
}

impl From<EpisodePayload> for Episode {
    fn from(payload: EpisodePayload) -> Self {
        Episode {
            title: payload.title,
            link: payload.link.unwrap_or_default(),
            audio: payload.audio,
            audio_length_sec: payload.audio_length_sec,
        }
    }
}

impl ListenNotesClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Point the client at a different API root (used by hosts with a proxy)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl PodcastDirectory for ListenNotesClient {
    async fn fetch_episode_by_id(&self, id: &str) -> Result<Episode> {
        tracing::debug!("Fetching ListenNotes episode: {}", id);

        let response = self
            .client
            .get(format!("{}/episodes/{}", self.base_url, id))
            .header("X-ListenAPI-Key", &self.api_key)
            .query(&[("show_transcript", "1")])
            .send()
            .await
            .context("Failed to reach ListenNotes")?;

        if !response.status().is_success() {
            anyhow::bail!("ListenNotes episode lookup failed: HTTP {}", response.status());
        }

        let payload: EpisodePayload = response
            .json()
            .await
            .context("Failed to parse ListenNotes episode response")?;

        Ok(payload.into())
    }

    async fn search_episodes(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Episode>> {
        tracing::debug!("Searching ListenNotes for: {}", query);

        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .header("X-ListenAPI-Key", &self.api_key)
            .query(&[
                ("q", query),
                ("sort_by_date", "0"),
                ("type", "episode"),
                ("offset", "0"),
                ("len_min", &filters.len_min.to_string()),
                ("len_max", &filters.len_max.to_string()),
                ("published_after", "0"),
                ("only_in", "title,description"),
                ("region", &filters.region),
                ("safe_mode", "0"),
                ("unique_podcasts", if filters.unique_podcasts { "1" } else { "0" }),
                ("page_size", &filters.page_size.to_string()),
            ])
            .send()
            .await
            .context("Failed to reach ListenNotes")?;

        if !response.status().is_success() {
            anyhow::bail!("ListenNotes search failed: HTTP {}", response.status());
        }

        let payload: SearchPayload = response
            .json()
            .await
            .context("Failed to parse ListenNotes search response")?;

        Ok(payload.results.into_iter().map(Episode::from).collect())
    }
}
