//! AudioScribe - turn podcast and video references into readable transcripts
//!
//! This library resolves a user-supplied reference (a ListenNotes episode ID,
//! a Spotify or YouTube URL, a direct audio link, or free-text search) to a
//! playable audio URL, submits it to a speech transcription service, and
//! derives speaker-labeled text, topic, and entity views from the result.

pub mod classify;
pub mod config;
pub mod resolve;
pub mod services;
pub mod transcribe;
pub mod utils;

pub use classify::{classify, Reference, ServiceCode};
pub use config::Config;
pub use resolve::{ResolvedAudio, SourceResolver};
pub use transcribe::{
    TranscriptAnalysis, TranscriptReport, TranscriptionOrchestrator, TranscriptionPipeline,
};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to AudioScribe
#[derive(thiserror::Error, Debug)]
pub enum ScribeError {
    #[error("No results found for query: {0}")]
    NoResultsFound(String),

    #[error("No extractable audio stream for: {0}")]
    UnresolvableAudio(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Malformed reference: {0}")]
    MalformedReference(String),

    #[error("Transcription cancelled by caller")]
    Cancelled,
}
