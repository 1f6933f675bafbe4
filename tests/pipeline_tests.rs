//! End-to-end pipeline tests against mocked collaborators

use async_trait::async_trait;
use mockall::mock;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use audioscribe::services::{
    DetectedEntity, Episode, EpisodeMetadata, EpisodeRef, JobStatus, MediaExtractor, MediaFormat,
    MediaInfo, PodcastDirectory, SearchFilters, SpeechToText, TranscriptJob, Utterance,
};
use audioscribe::{
    Result, ScribeError, SourceResolver, TranscriptionOrchestrator, TranscriptionPipeline,
};

mock! {
    Directory {}

    #[async_trait]
    impl PodcastDirectory for Directory {
        async fn fetch_episode_by_id(&self, id: &str) -> Result<Episode>;
        async fn search_episodes(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Episode>>;
    }
}

mock! {
    Episodes {}

    #[async_trait]
    impl EpisodeMetadata for Episodes {
        async fn episode(&self, id: &str, market: &str) -> Result<EpisodeRef>;
    }
}

mock! {
    Extractor {}

    #[async_trait]
    impl MediaExtractor for Extractor {
        async fn extract_info(&self, url: &str) -> Result<MediaInfo>;
    }
}

mock! {
    Stt {}

    #[async_trait]
    impl SpeechToText for Stt {
        async fn submit(&self, audio_url: &str) -> Result<String>;
        async fn get_job(&self, job_id: &str) -> Result<TranscriptJob>;
    }
}

const LISTENNOTES_ID: &str = "c9af1e9a2cf7425c9bb60b9b15b0fd4e";
const EPISODE_AUDIO: &str = "https://cdn.example.com/episode.mp3";

fn sample_episode() -> Episode {
    Episode {
        title: "Comment rater un recrutement".to_string(),
        link: "https://example.com/episode".to_string(),
        audio: EPISODE_AUDIO.to_string(),
        audio_length_sec: 481,
    }
}

fn job(status: JobStatus) -> TranscriptJob {
    TranscriptJob {
        id: "job-1".to_string(),
        status,
        text: None,
        summary: None,
        utterances: Vec::new(),
        topic_confidences: Vec::new(),
        entities: Vec::new(),
        error: None,
    }
}

fn completed_job() -> TranscriptJob {
    TranscriptJob {
        id: "job-1".to_string(),
        status: JobStatus::Completed,
        text: Some("plain transcript".to_string()),
        summary: Some("- key point".to_string()),
        utterances: vec![Utterance {
            speaker: "A".to_string(),
            text: "Welcome to the show.".to_string(),
        }],
        topic_confidences: vec![
            ("a>b>Sports".to_string(), 0.5),
            ("a>c>News".to_string(), 0.3),
        ],
        entities: vec![DetectedEntity {
            entity_type: "person.name".to_string(),
            text: "alice".to_string(),
        }],
        error: None,
    }
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn resolver(
    directory: MockDirectory,
    episodes: MockEpisodes,
    extractor: MockExtractor,
) -> SourceResolver {
    init_tracing();
    SourceResolver::new(Arc::new(directory), Arc::new(episodes), Arc::new(extractor))
}

fn orchestrator(stt: MockStt) -> TranscriptionOrchestrator {
    init_tracing();
    TranscriptionOrchestrator::new(Arc::new(stt)).with_poll_interval(Duration::from_millis(1))
}

#[tokio::test]
async fn listennotes_id_flows_through_fetch_submit_and_poll() {
    let mut directory = MockDirectory::new();
    directory
        .expect_fetch_episode_by_id()
        .withf(|id| id == LISTENNOTES_ID)
        .times(1)
        .returning(|_| Ok(sample_episode()));

    let mut stt = MockStt::new();
    stt.expect_submit()
        .withf(|audio_url| audio_url == EPISODE_AUDIO)
        .times(1)
        .returning(|_| Ok("job-1".to_string()));

    // Two non-terminal polls before completion; the loop must only exit on
    // the completed status
    let mut seq = mockall::Sequence::new();
    stt.expect_get_job()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(job(JobStatus::Queued)));
    stt.expect_get_job()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(job(JobStatus::Processing)));
    stt.expect_get_job()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(completed_job()));

    let pipeline = TranscriptionPipeline::new(
        resolver(directory, MockEpisodes::new(), MockExtractor::new()),
        orchestrator(stt),
    );

    let report = pipeline
        .transcribe_reference(LISTENNOTES_ID, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.title, "Comment rater un recrutement");
    assert_eq!(report.duration_seconds, 481);
    assert_eq!(
        report.analysis.speaker_text,
        "Speaker A : Welcome to the show."
    );
    assert_eq!(report.analysis.topics, "- Sports (50%)");
    assert_eq!(report.analysis.entities, "\n**Name**:\n- Alice");

    let markdown = report.to_markdown();
    assert!(markdown.contains("Comment rater un recrutement"));
    assert!(markdown.contains("- Sports (50%)"));
    assert!(markdown.contains("- key point"));
}

#[tokio::test]
async fn direct_link_synthesizes_metadata_without_collaborators() {
    // No expectations: any collaborator call would panic the test
    let resolver = resolver(
        MockDirectory::new(),
        MockEpisodes::new(),
        MockExtractor::new(),
    );

    let resolved = resolver
        .resolve(&audioscribe::classify("https://example.com/feed/42.mp3"))
        .await
        .unwrap();

    assert_eq!(resolved.title, "Not available");
    assert_eq!(resolved.source_link, "Not available");
    assert_eq!(resolved.audio_url, "https://example.com/feed/42.mp3");
    assert_eq!(resolved.duration_seconds, 60);
}

#[tokio::test]
async fn search_with_no_results_is_a_typed_recoverable_error() {
    let mut directory = MockDirectory::new();
    directory
        .expect_search_episodes()
        .times(1)
        .returning(|_, _| Ok(Vec::new()));

    let resolver = resolver(directory, MockEpisodes::new(), MockExtractor::new());

    let err = resolver
        .resolve(&audioscribe::classify("a query nobody ever matched"))
        .await
        .unwrap_err();

    match err.downcast_ref::<ScribeError>() {
        Some(ScribeError::NoResultsFound(query)) => {
            assert_eq!(query, "a query nobody ever matched")
        }
        other => panic!("expected NoResultsFound, got {:?}", other),
    }
}

#[tokio::test]
async fn search_passes_fixed_episode_filters() {
    let mut directory = MockDirectory::new();
    directory
        .expect_search_episodes()
        .withf(|query, filters| {
            query == "rust podcast episodes"
                && filters.len_min == 3
                && filters.len_max == 180
                && filters.page_size == 10
        })
        .times(1)
        .returning(|_, _| Ok(vec![sample_episode()]));

    let resolver = resolver(directory, MockEpisodes::new(), MockExtractor::new());

    let resolved = resolver
        .resolve(&audioscribe::classify("rust podcast episodes"))
        .await
        .unwrap();

    assert_eq!(resolved.audio_url, EPISODE_AUDIO);
}

#[tokio::test]
async fn spotify_resolution_re_queries_the_directory() {
    let mut episodes = MockEpisodes::new();
    episodes
        .expect_episode()
        .withf(|id, market| id == "2Jg3DWJ7LLNePNRM4SotDk" && market == "FR")
        .times(1)
        .returning(|_, _| {
            Ok(EpisodeRef {
                name: "Great Episode".to_string(),
                show_name: "Great Show".to_string(),
            })
        });

    let mut directory = MockDirectory::new();
    directory
        .expect_search_episodes()
        .withf(|query, _| query == "Great Episode Great Show")
        .times(1)
        .returning(|_, _| Ok(vec![sample_episode()]));

    let resolver = resolver(directory, episodes, MockExtractor::new());

    let resolved = resolver
        .resolve(&audioscribe::classify(
            "https://open.spotify.com/episode/2Jg3DWJ7LLNePNRM4SotDk",
        ))
        .await
        .unwrap();

    // The audio is whatever the directory surfaced, not a Spotify stream
    assert_eq!(resolved.audio_url, EPISODE_AUDIO);
}

#[tokio::test]
async fn youtube_id_resolves_through_canonical_watch_url() {
    let mut extractor = MockExtractor::new();
    extractor
        .expect_extract_info()
        .withf(|url| url == "https://www.youtube.com/watch?v=gxHBAM-ww-w")
        .times(1)
        .returning(|_| {
            Ok(MediaInfo {
                title: "Some Talk".to_string(),
                duration_seconds: Some(1234),
                formats: vec![
                    MediaFormat {
                        resolution: "audio only".to_string(),
                        ext: "m4a".to_string(),
                        url: "https://cdn/low.m4a".to_string(),
                    },
                    MediaFormat {
                        resolution: "audio only".to_string(),
                        ext: "m4a".to_string(),
                        url: "https://cdn/high.m4a".to_string(),
                    },
                    MediaFormat {
                        resolution: "720p".to_string(),
                        ext: "mp4".to_string(),
                        url: "https://cdn/video.mp4".to_string(),
                    },
                ],
            })
        });

    let resolver = resolver(MockDirectory::new(), MockEpisodes::new(), extractor);

    let resolved = resolver
        .resolve(&audioscribe::classify("gxHBAM-ww-w"))
        .await
        .unwrap();

    assert_eq!(resolved.title, "Some Talk");
    assert_eq!(resolved.source_link, "https://www.youtube.com/watch?v=gxHBAM-ww-w");
    // Last-listed m4a audio-only stream wins
    assert_eq!(resolved.audio_url, "https://cdn/high.m4a");
    assert_eq!(resolved.duration_seconds, 1234);
}

#[tokio::test]
async fn youtube_without_m4a_audio_is_unresolvable() {
    let mut extractor = MockExtractor::new();
    extractor.expect_extract_info().times(1).returning(|_| {
        Ok(MediaInfo {
            title: "Video Only".to_string(),
            duration_seconds: Some(100),
            formats: vec![MediaFormat {
                resolution: "1080p".to_string(),
                ext: "mp4".to_string(),
                url: "https://cdn/video.mp4".to_string(),
            }],
        })
    });

    let resolver = resolver(MockDirectory::new(), MockEpisodes::new(), extractor);

    let err = resolver
        .resolve(&audioscribe::classify("gxHBAM-ww-w"))
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ScribeError>(),
        Some(ScribeError::UnresolvableAudio(_))
    ));
}

#[tokio::test]
async fn empty_input_is_a_malformed_reference() {
    let resolver = resolver(
        MockDirectory::new(),
        MockEpisodes::new(),
        MockExtractor::new(),
    );

    let err = resolver
        .resolve(&audioscribe::classify("   "))
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ScribeError>(),
        Some(ScribeError::MalformedReference(_))
    ));
}

#[tokio::test]
async fn job_error_status_fails_with_upstream_reason() {
    let mut stt = MockStt::new();
    stt.expect_submit()
        .times(1)
        .returning(|_| Ok("job-1".to_string()));
    stt.expect_get_job().times(1).returning(|_| {
        let mut failed = job(JobStatus::Error);
        failed.error = Some("audio could not be decoded".to_string());
        Ok(failed)
    });

    let err = orchestrator(stt)
        .transcribe(EPISODE_AUDIO, CancellationToken::new())
        .await
        .unwrap_err();

    match err.downcast_ref::<ScribeError>() {
        Some(ScribeError::TranscriptionFailed(reason)) => {
            assert_eq!(reason, "audio could not be decoded")
        }
        other => panic!("expected TranscriptionFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn status_check_failure_during_polling_is_a_typed_failure() {
    let mut stt = MockStt::new();
    stt.expect_submit()
        .times(1)
        .returning(|_| Ok("job-1".to_string()));
    stt.expect_get_job()
        .times(1)
        .returning(|_| Err(anyhow::anyhow!("connection reset by peer")));

    let err = orchestrator(stt)
        .transcribe(EPISODE_AUDIO, CancellationToken::new())
        .await
        .unwrap_err();

    match err.downcast_ref::<ScribeError>() {
        Some(ScribeError::TranscriptionFailed(reason)) => {
            assert!(reason.contains("connection reset by peer"))
        }
        other => panic!("expected TranscriptionFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn poll_loop_is_cancellable() {
    let mut stt = MockStt::new();
    stt.expect_submit()
        .times(1)
        .returning(|_| Ok("job-1".to_string()));
    // The job never completes; cancellation is the only way out
    stt.expect_get_job()
        .returning(|_| Ok(job(JobStatus::Processing)));

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = orchestrator(stt)
        .transcribe(EPISODE_AUDIO, cancel)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ScribeError>(),
        Some(ScribeError::Cancelled)
    ));
}

#[tokio::test]
async fn invalid_audio_url_is_rejected_before_submission() {
    // No submit expectation: reaching the collaborator would panic
    let stt = MockStt::new();

    let err = orchestrator(stt)
        .transcribe("not a url", CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Invalid audio URL"));
}
