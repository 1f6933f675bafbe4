//! Source resolution
//!
//! Turns a classified [`Reference`](crate::classify::Reference) into a
//! normalized, playable audio record by delegating to the collaborator that
//! owns the source. Every branch except the direct link goes out over the
//! network.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::classify::Reference;
use crate::services::{
    EpisodeMetadata, MediaExtractor, MediaFormat, PodcastDirectory, SearchFilters,
};
use crate::{Result, ScribeError};

/// Sentinel for metadata a source cannot provide
pub const NOT_AVAILABLE: &str = "Not available";

/// Placeholder duration for direct links, whose true length is unknown upfront
pub const DIRECT_LINK_DURATION_SEC: u64 = 60;

/// A reference resolved to a playable audio stream plus display metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedAudio {
    pub title: String,

    /// Web page the audio came from
    pub source_link: String,

    /// Dereferenceable media URL, ready for transcription
    pub audio_url: String,

    pub duration_seconds: u64,
}

/// Resolves classified references through injected collaborator handles
pub struct SourceResolver {
    directory: Arc<dyn PodcastDirectory>,
    episodes: Arc<dyn EpisodeMetadata>,
    extractor: Arc<dyn MediaExtractor>,
    filters: SearchFilters,
    market: String,
}

impl SourceResolver {
    pub fn new(
        directory: Arc<dyn PodcastDirectory>,
        episodes: Arc<dyn EpisodeMetadata>,
        extractor: Arc<dyn MediaExtractor>,
    ) -> Self {
        Self {
            directory,
            episodes,
            extractor,
            filters: SearchFilters::default(),
            market: "FR".to_string(),
        }
    }

    pub fn with_search_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Market passed to the streaming metadata service
    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.market = market.into();
        self
    }

    /// Resolve a classified reference to a playable audio record
    pub async fn resolve(&self, reference: &Reference) -> Result<ResolvedAudio> {
        tracing::info!(
            "Resolving {} reference",
            reference.service_code().display_name()
        );

        match reference {
            Reference::ListenNotesId(id) => self.resolve_by_id(id).await,
            Reference::ListenNotesSearch(query) => self.resolve_by_search(query).await,
            Reference::SpotifyEpisode(id) => self.resolve_spotify(id).await,
            Reference::YouTubeVideo(id) => self.resolve_youtube(id).await,
            Reference::DirectLink(url) => Ok(Self::resolve_direct(url)),
        }
    }

    async fn resolve_by_id(&self, id: &str) -> Result<ResolvedAudio> {
        let episode = self.directory.fetch_episode_by_id(id).await?;

        Ok(ResolvedAudio {
            title: episode.title,
            source_link: episode.link,
            audio_url: episode.audio,
            duration_seconds: episode.audio_length_sec,
        })
    }

    async fn resolve_by_search(&self, query: &str) -> Result<ResolvedAudio> {
        if query.is_empty() {
            return Err(ScribeError::MalformedReference("empty search query".to_string()).into());
        }

        let results = self.directory.search_episodes(query, &self.filters).await?;

        let episode = results
            .into_iter()
            .next()
            .ok_or_else(|| ScribeError::NoResultsFound(query.to_string()))?;

        Ok(ResolvedAudio {
            title: episode.title,
            source_link: episode.link,
            audio_url: episode.audio,
            duration_seconds: episode.audio_length_sec,
        })
    }

    /// Spotify resolution is a two-hop indirection: look up the episode
    /// name, then search the podcast directory for it. The audio that comes
    /// back is whatever the directory surfaces for the same title, not
    /// Spotify's own stream. Known approximation.
    async fn resolve_spotify(&self, id: &str) -> Result<ResolvedAudio> {
        let info = self.episodes.episode(id, &self.market).await?;
        let query = format!("{} {}", info.name, info.show_name);

        self.resolve_by_search(&query).await
    }

    async fn resolve_youtube(&self, id: &str) -> Result<ResolvedAudio> {
        let watch_url = canonical_watch_url(id);
        let info = self.extractor.extract_info(&watch_url).await?;

        let audio_url = select_audio_format(&info.formats)
            .ok_or_else(|| ScribeError::UnresolvableAudio(watch_url.clone()))?
            .to_string();

        Ok(ResolvedAudio {
            title: info.title,
            source_link: watch_url,
            audio_url,
            duration_seconds: info.duration_seconds.unwrap_or(0),
        })
    }

    fn resolve_direct(url: &str) -> ResolvedAudio {
        ResolvedAudio {
            title: NOT_AVAILABLE.to_string(),
            source_link: NOT_AVAILABLE.to_string(),
            audio_url: url.to_string(),
            duration_seconds: DIRECT_LINK_DURATION_SEC,
        }
    }
}

/// Canonical watch URL for a bare YouTube video ID
pub fn canonical_watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", id)
}

/// Pick the audio stream from a format list: last-listed "audio only"
/// format in an m4a container. Platforms list formats worst-first, so
/// scanning from the end lands on the best audio stream.
fn select_audio_format(formats: &[MediaFormat]) -> Option<&str> {
    formats
        .iter()
        .rev()
        .find(|format| format.resolution == "audio only" && format.ext == "m4a")
        .map(|format| format.url.as_str())
}
