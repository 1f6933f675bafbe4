//! Spotify Web API client for episode metadata
//!
//! Authenticates with the client-credentials flow and keeps the token in
//! memory, refreshing shortly before expiry.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::{EpisodeMetadata, EpisodeRef};
use crate::Result;

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";

// Refresh this long before the token actually expires
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

pub struct SpotifyClient {
    client: Client,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct EpisodeResponse {
    name: String,
    show: ShowResponse,
}

#[derive(Debug, Deserialize)]
struct ShowResponse {
    name: String,
}

impl SpotifyClient {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token: Mutex::new(None),
        }
    }

    /// Get a valid access token, fetching a fresh one if needed
    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;

        if let Some(cached) = guard.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.access_token.clone());
            }
        }

        tracing::debug!("Requesting new Spotify access token");

        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("Failed to reach Spotify token endpoint")?;

        if !response.status().is_success() {
            anyhow::bail!("Spotify token request failed: HTTP {}", response.status());
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse Spotify token response")?;

        let expires_at = Instant::now() + Duration::from_secs(token.expires_in)
            .saturating_sub(EXPIRY_MARGIN);

        let access_token = token.access_token.clone();
        *guard = Some(CachedToken {
            access_token: token.access_token,
            expires_at,
        });

        Ok(access_token)
    }
}

#[async_trait]
impl EpisodeMetadata for SpotifyClient {
    async fn episode(&self, id: &str, market: &str) -> Result<EpisodeRef> {
        tracing::debug!("Fetching Spotify episode: {}", id);

        let token = self.access_token().await?;

        let response = self
            .client
            .get(format!("{}/episodes/{}", API_BASE, id))
            .bearer_auth(token)
            .query(&[("market", market)])
            .send()
            .await
            .context("Failed to reach Spotify")?;

        if !response.status().is_success() {
            anyhow::bail!("Spotify episode lookup failed: HTTP {}", response.status());
        }

        let episode: EpisodeResponse = response
            .json()
            .await
            .context("Failed to parse Spotify episode response")?;

        Ok(EpisodeRef {
            name: episode.name,
            show_name: episode.show.name,
        })
    }
}
