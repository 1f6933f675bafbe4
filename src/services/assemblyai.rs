//! AssemblyAI speech transcription client (REST v2)
//!
//! Jobs are submitted with a fixed feature set: speaker diarization,
//! language detection, conversational bullet summarization, entity
//! detection, and IAB topic classification.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Map;

use super::{DetectedEntity, JobStatus, SpeechToText, TranscriptJob, Utterance};
use crate::Result;

const API_BASE: &str = "https://api.assemblyai.com/v2";

pub struct AssemblyAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    audio_url: &'a str,
    speaker_labels: bool,
    language_detection: bool,
    summarization: bool,
    summary_model: &'static str,
    summary_type: &'static str,
    entity_detection: bool,
    iab_categories: bool,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct JobResponse {
    id: String,
    status: String,
    text: Option<String>,
    summary: Option<String>,
    #[serde(default)]
    utterances: Option<Vec<UtterancePayload>>,
    iab_categories_result: Option<IabResult>,
    #[serde(default)]
    entities: Option<Vec<EntityPayload>>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UtterancePayload {
    speaker: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct IabResult {
    #[serde(default)]
    summary: Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct EntityPayload {
    entity_type: String,
    text: String,
}

impl AssemblyAiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn parse_status(status: &str) -> Result<JobStatus> {
        match status {
            "queued" => Ok(JobStatus::Queued),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "error" => Ok(JobStatus::Error),
            other => anyhow::bail!("Unknown transcription job status: {}", other),
        }
    }
}

#[async_trait]
impl SpeechToText for AssemblyAiClient {
    async fn submit(&self, audio_url: &str) -> Result<String> {
        tracing::info!("Submitting audio for transcription: {}", audio_url);

        let request = SubmitRequest {
            audio_url,
            speaker_labels: true,
            language_detection: true,
            summarization: true,
            summary_model: "conversational",
            summary_type: "bullets",
            entity_detection: true,
            iab_categories: true,
        };

        let response = self
            .client
            .post(format!("{}/transcript", self.base_url))
            .header("authorization", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to reach transcription service")?;

        if !response.status().is_success() {
            anyhow::bail!("Transcription submission failed: HTTP {}", response.status());
        }

        let submitted: SubmitResponse = response
            .json()
            .await
            .context("Failed to parse transcription submission response")?;

        Ok(submitted.id)
    }

    async fn get_job(&self, job_id: &str) -> Result<TranscriptJob> {
        let response = self
            .client
            .get(format!("{}/transcript/{}", self.base_url, job_id))
            .header("authorization", &self.api_key)
            .send()
            .await
            .context("Failed to reach transcription service")?;

        if !response.status().is_success() {
            anyhow::bail!("Transcription status check failed: HTTP {}", response.status());
        }

        let job: JobResponse = response
            .json()
            .await
            .context("Failed to parse transcription job response")?;

        let topic_confidences = job
            .iab_categories_result
            .map(|iab| {
                iab.summary
                    .into_iter()
                    .filter_map(|(key, value)| value.as_f64().map(|conf| (key, conf)))
                    .collect()
            })
            .unwrap_or_default();

        Ok(TranscriptJob {
            id: job.id,
            status: Self::parse_status(&job.status)?,
            text: job.text,
            summary: job.summary,
            utterances: job
                .utterances
                .unwrap_or_default()
                .into_iter()
                .map(|u| Utterance {
                    speaker: u.speaker,
                    text: u.text,
                })
                .collect(),
            topic_confidences,
            entities: job
                .entities
                .unwrap_or_default()
                .into_iter()
                .map(|e| DetectedEntity {
                    entity_type: e.entity_type,
                    text: e.text,
                })
                .collect(),
            error: job.error,
        })
    }
}
