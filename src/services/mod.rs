//! External collaborator seams
//!
//! Every third-party service the pipeline talks to sits behind a narrow
//! trait defined here, with one production client per trait in the
//! submodules. The resolver and orchestrator only ever see the traits, so
//! hosts (and tests) can swap in their own implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod assemblyai;
pub mod listennotes;
pub mod spotify;
pub mod youtube;

use crate::Result;

/// A podcast episode as returned by the directory service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub title: String,

    /// Web page for the episode
    pub link: String,

    /// Direct audio URL
    pub audio: String,

    /// Audio length in seconds
    pub audio_length_sec: u64,
}

/// Filters applied to directory searches
#[derive(Debug, Clone)]
pub struct SearchFilters {
    /// Minimum episode length in minutes
    pub len_min: u32,

    /// Maximum episode length in minutes
    pub len_max: u32,

    /// Results per page
    pub page_size: u32,

    /// At most one episode per podcast
    pub unique_podcasts: bool,

    /// Region bias for ranking (ISO 3166-1 alpha-2, lowercase)
    pub region: String,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            len_min: 3,
            len_max: 180,
            page_size: 10,
            unique_podcasts: true,
            region: "fr".to_string(),
        }
    }
}

/// Podcast directory: exact episode lookup and ranked keyword search
#[async_trait]
pub trait PodcastDirectory: Send + Sync {
    async fn fetch_episode_by_id(&self, id: &str) -> Result<Episode>;

    /// Search for episodes matching a keyword query, best match first
    async fn search_episodes(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Episode>>;
}

/// Minimal episode metadata from a streaming service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRef {
    /// Episode name
    pub name: String,

    /// Name of the show the episode belongs to
    pub show_name: String,
}

/// Streaming-service episode metadata lookup
#[async_trait]
pub trait EpisodeMetadata: Send + Sync {
    async fn episode(&self, id: &str, market: &str) -> Result<EpisodeRef>;
}

/// One downloadable format of a piece of media
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFormat {
    /// Resolution label; audio streams report `"audio only"`
    pub resolution: String,

    /// Container extension (m4a, webm, mp4, ...)
    pub ext: String,

    /// Direct download URL
    pub url: String,
}

/// Metadata and format list extracted from a media page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    pub title: String,

    /// Duration in seconds if the platform reports one
    pub duration_seconds: Option<u64>,

    /// Available formats in the platform's listed order
    pub formats: Vec<MediaFormat>,
}

/// Video platform metadata and stream extraction
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    async fn extract_info(&self, url: &str) -> Result<MediaInfo>;
}

/// Lifecycle state of a transcription job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    /// Terminal states are `Completed` and `Error`
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

/// A single speaker-attributed span of the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    /// Speaker label assigned by diarization (A, B, ...)
    pub speaker: String,

    pub text: String,
}

/// A named entity detected in the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedEntity {
    /// Hierarchical type key; the last dot-separated segment is the display type
    pub entity_type: String,

    pub text: String,
}

/// Snapshot of a transcription job as reported by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptJob {
    pub id: String,

    pub status: JobStatus,

    /// Plain transcript text, present once completed
    pub text: Option<String>,

    /// Bullet summary, present once completed if summarization ran
    pub summary: Option<String>,

    /// Speaker-attributed utterances in chronological order
    pub utterances: Vec<Utterance>,

    /// Topic classification: hierarchical `a>b>Label` key to confidence,
    /// in the order the service reported them
    pub topic_confidences: Vec<(String, f64)>,

    pub entities: Vec<DetectedEntity>,

    /// Failure reason when status is `Error`
    pub error: Option<String>,
}

/// Speech transcription service: asynchronous submit-then-poll contract
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Submit an audio URL for transcription and return the job ID
    async fn submit(&self, audio_url: &str) -> Result<String>;

    /// Fetch the current snapshot of a job
    async fn get_job(&self, job_id: &str) -> Result<TranscriptJob>;
}
