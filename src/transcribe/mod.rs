//! Transcription orchestration
//!
//! Submits a resolved audio URL to the speech transcription collaborator,
//! polls the job to a terminal state, and derives the read-only analysis
//! views. The poll loop is unbounded by design (a foreground request waits
//! as long as the job takes) and must therefore be driven with a
//! cancellation token the host can trip when the user walks away.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

pub mod views;

use crate::classify::classify;
use crate::resolve::{ResolvedAudio, SourceResolver};
use crate::services::{JobStatus, SpeechToText};
use crate::{utils, Result, ScribeError};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Read-only analysis derived from a completed transcription job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptAnalysis {
    /// Speaker-labeled transcript, or plain text when diarization found nothing
    pub speaker_text: String,

    /// Bullet list of confident topics; empty when none cleared the threshold
    pub topics: String,

    /// Entity groups with headings; empty when no entities survived filtering
    pub entities: String,

    /// Bullet summary if the service produced one
    pub summary: Option<String>,
}

/// Drives a transcription job from submission to analysis
pub struct TranscriptionOrchestrator {
    stt: Arc<dyn SpeechToText>,
    poll_interval: Duration,
}

impl TranscriptionOrchestrator {
    pub fn new(stt: Arc<dyn SpeechToText>) -> Self {
        Self {
            stt,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Transcribe an audio URL, polling until the job reaches a terminal
    /// state or the token is cancelled.
    ///
    /// A job that terminates in `error` status, or a failed submission,
    /// surfaces as [`ScribeError::TranscriptionFailed`]; no partial
    /// analysis is ever produced.
    pub async fn transcribe(
        &self,
        audio_url: &str,
        cancel: CancellationToken,
    ) -> Result<TranscriptAnalysis> {
        utils::validate_audio_url(audio_url)?;

        let job_id = self
            .stt
            .submit(audio_url)
            .await
            .map_err(|e| ScribeError::TranscriptionFailed(e.to_string()))?;

        tracing::info!("Transcription job submitted: {}", job_id);

        let job = loop {
            let job = self
                .stt
                .get_job(&job_id)
                .await
                .map_err(|e| ScribeError::TranscriptionFailed(e.to_string()))?;

            if job.status.is_terminal() {
                break job;
            }

            tracing::debug!("Job {} still {:?}, polling again", job_id, job.status);
            tokio::select! {
                _ = cancel.cancelled() => return Err(ScribeError::Cancelled.into()),
                _ = sleep(self.poll_interval) => {}
            }
        };

        if job.status == JobStatus::Error {
            let reason = job.error.unwrap_or_else(|| "unknown error".to_string());
            return Err(ScribeError::TranscriptionFailed(reason).into());
        }

        Ok(TranscriptAnalysis {
            speaker_text: views::speaker_text(&job),
            topics: views::topics(&job),
            entities: views::entities(&job),
            summary: job.summary,
        })
    }
}

/// Resolved metadata plus analysis, ready for host display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptReport {
    pub title: String,
    pub source_link: String,
    pub duration_seconds: u64,
    pub analysis: TranscriptAnalysis,
}

impl TranscriptReport {
    /// Render the report as the markdown block hosts display and copy
    pub fn to_markdown(&self) -> String {
        let not_available = |text: &str| {
            if text.is_empty() {
                "Not Available".to_string()
            } else {
                text.to_string()
            }
        };

        format!(
            "###\nTitle:\n\n{}\n###\nURL:\n\n{}\n###\nSummary:\n\n{}\n###\nTranscription:\n\n{}\n###\nTopics:\n\n{}\n###\nEntities:\n\n{}\n###\n",
            self.title.trim(),
            self.source_link,
            not_available(self.analysis.summary.as_deref().unwrap_or_default()),
            self.analysis.speaker_text,
            not_available(&self.analysis.topics),
            not_available(&self.analysis.entities),
        )
    }
}

/// End-to-end pipeline: classify, resolve, transcribe
pub struct TranscriptionPipeline {
    resolver: SourceResolver,
    orchestrator: TranscriptionOrchestrator,
}

impl TranscriptionPipeline {
    pub fn new(resolver: SourceResolver, orchestrator: TranscriptionOrchestrator) -> Self {
        Self {
            resolver,
            orchestrator,
        }
    }

    /// Build a pipeline wired to the production collaborator clients
    pub fn from_config(config: &crate::Config) -> Self {
        use crate::services::{
            assemblyai::AssemblyAiClient, listennotes::ListenNotesClient,
            spotify::SpotifyClient, youtube::YoutubeExtractor,
        };

        let resolver = SourceResolver::new(
            Arc::new(ListenNotesClient::new(
                config.credentials.listennotes_api_key.clone(),
            )),
            Arc::new(SpotifyClient::new(
                config.credentials.spotify_client_id.clone(),
                config.credentials.spotify_client_secret.clone(),
            )),
            Arc::new(YoutubeExtractor::new()),
        )
        .with_search_filters(config.search_filters())
        .with_market(config.search.market.clone());

        let orchestrator = TranscriptionOrchestrator::new(Arc::new(AssemblyAiClient::new(
            config.credentials.assemblyai_api_key.clone(),
        )))
        .with_poll_interval(Duration::from_secs(config.transcription.poll_interval_secs));

        Self::new(resolver, orchestrator)
    }

    /// Run the full flow for one user-supplied reference string
    pub async fn transcribe_reference(
        &self,
        input: &str,
        cancel: CancellationToken,
    ) -> Result<TranscriptReport> {
        let reference = classify(input);
        let resolved = self.resolver.resolve(&reference).await?;

        tracing::info!(
            "Resolved \"{}\" ({})",
            resolved.title,
            utils::format_duration(resolved.duration_seconds)
        );

        self.transcribe_resolved(&resolved, cancel).await
    }

    /// Transcribe an already-resolved audio record (hosts that confirm the
    /// source with the user before starting call this directly)
    pub async fn transcribe_resolved(
        &self,
        resolved: &ResolvedAudio,
        cancel: CancellationToken,
    ) -> Result<TranscriptReport> {
        let analysis = self
            .orchestrator
            .transcribe(&resolved.audio_url, cancel)
            .await?;

        Ok(TranscriptReport {
            title: resolved.title.clone(),
            source_link: resolved.source_link.clone(),
            duration_seconds: resolved.duration_seconds,
            analysis,
        })
    }

    pub fn resolver(&self) -> &SourceResolver {
        &self.resolver
    }
}
