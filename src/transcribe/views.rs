//! Derived views over a completed transcription job
//!
//! Each view is computed once from the job payload and never mutated
//! afterward.

use crate::services::{DetectedEntity, TranscriptJob, Utterance};
use crate::utils::{capitalize, insert_spaces};

/// Topics below this confidence are dropped from the topic view
const TOPIC_CONFIDENCE_THRESHOLD: f64 = 0.4;

/// Entity types that add noise rather than signal
const IGNORED_ENTITY_TYPES: &[&str] = &["language", "nationality"];

/// Render the transcript as `"Speaker {label} : {text}"` lines in
/// chronological order, falling back to the plain transcript when the job
/// has no speaker-attributed utterances.
pub fn speaker_text(job: &TranscriptJob) -> String {
    if job.utterances.is_empty() {
        return job.text.clone().unwrap_or_default();
    }

    job.utterances
        .iter()
        .map(|Utterance { speaker, text }| format!("Speaker {} : {}", speaker, text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render topics clearing the confidence threshold as bullet lines.
///
/// Topic keys are hierarchical (`a>b>Sports`); only the last segment is
/// shown, camel-case spaced, with the confidence as a rounded percentage.
/// Empty when nothing clears the threshold.
pub fn topics(job: &TranscriptJob) -> String {
    job.topic_confidences
        .iter()
        .filter(|(_, confidence)| *confidence > TOPIC_CONFIDENCE_THRESHOLD)
        .map(|(key, confidence)| {
            let label = key.rsplit('>').next().unwrap_or(key);
            format!("- {} ({:.0}%)", insert_spaces(label), confidence * 100.0)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render detected entities grouped by type.
///
/// Entities are grouped by the last dot-separated segment of their type
/// key, deduplicated by text within each group, and rendered as a
/// capitalized `**Type**:` heading followed by capitalized bullets. The
/// `language` and `nationality` groups are dropped. Group order is
/// first-seen order; empty when no entities survive filtering.
pub fn entities(job: &TranscriptJob) -> String {
    if job.entities.is_empty() {
        return String::new();
    }

    // Insertion-ordered grouping with per-group text dedup
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for DetectedEntity { entity_type, text } in &job.entities {
        match groups.iter_mut().find(|(ty, _)| ty == entity_type) {
            Some((_, texts)) => {
                if !texts.contains(text) {
                    texts.push(text.clone());
                }
            }
            None => groups.push((entity_type.clone(), vec![text.clone()])),
        }
    }

    let mut lines = Vec::new();
    for (entity_type, texts) in groups {
        let display_type = entity_type.rsplit('.').next().unwrap_or(&entity_type);
        if IGNORED_ENTITY_TYPES.contains(&display_type.to_lowercase().as_str()) {
            continue;
        }
        lines.push(format!("\n**{}**:", capitalize(display_type)));
        for text in texts {
            lines.push(format!("- {}", capitalize(&text)));
        }
    }

    lines.join("\n")
}
