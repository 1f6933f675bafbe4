//! Reference classification
//!
//! Takes the raw string a user pasted in and decides which source service it
//! names, extracting the service-specific identifier along the way. The
//! match order is a contract: bare IDs are tried before URLs, and URLs before
//! the direct-link and search fallbacks. An 11-character search phrase will
//! classify as a YouTube ID; callers that need different behavior must quote
//! or lengthen the query.

use once_cell::sync::Lazy;
use regex::Regex;

static LISTENNOTES_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-f0-9]{32}$").unwrap());
static YOUTUBE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());
static SPOTIFY_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{22}$").unwrap());
static YOUTUBE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(youtu\.be/|youtube\.com/watch\?v=)([A-Za-z0-9_-]{11})").unwrap());
static SPOTIFY_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"spotify\.com/episode/([A-Za-z0-9]{22})").unwrap());

/// Tag identifying which external source a reference belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceCode {
    ListenNotesPodcast,
    SpotifyEpisode,
    YouTubeVideo,
    DirectLink,
}

impl ServiceCode {
    /// Human-readable service name for host display
    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceCode::ListenNotesPodcast => "ListenNotes Podcast",
            ServiceCode::SpotifyEpisode => "Spotify Podcast",
            ServiceCode::YouTubeVideo => "YouTube Video",
            ServiceCode::DirectLink => "Direct Link",
        }
    }

    /// Input placeholder text a host can show for this service
    pub fn input_placeholder(&self) -> &'static str {
        match self {
            ServiceCode::ListenNotesPodcast => "insert ID or keyword...",
            ServiceCode::SpotifyEpisode => "insert Spotify podcast URL or ID...",
            ServiceCode::YouTubeVideo => "insert YouTube video URL or ID...",
            ServiceCode::DirectLink => "insert audio URL...",
        }
    }
}

/// A classified user reference with its extracted identifier or query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// 32-character lowercase hex ListenNotes episode ID
    ListenNotesId(String),
    /// Free-text search against the podcast directory
    ListenNotesSearch(String),
    /// 22-character alphanumeric Spotify episode ID
    SpotifyEpisode(String),
    /// 11-character YouTube video ID
    YouTubeVideo(String),
    /// Any other http(s) URL, assumed to point directly at audio
    DirectLink(String),
}

impl Reference {
    pub fn service_code(&self) -> ServiceCode {
        match self {
            Reference::ListenNotesId(_) | Reference::ListenNotesSearch(_) => {
                ServiceCode::ListenNotesPodcast
            }
            Reference::SpotifyEpisode(_) => ServiceCode::SpotifyEpisode,
            Reference::YouTubeVideo(_) => ServiceCode::YouTubeVideo,
            Reference::DirectLink(_) => ServiceCode::DirectLink,
        }
    }
}

/// Classify free-form input into a service reference.
///
/// Never fails: anything that matches no ID or URL pattern and is not an
/// http(s) link falls through to a directory search.
pub fn classify(text: &str) -> Reference {
    let text = text.trim();

    if LISTENNOTES_ID.is_match(text) {
        return Reference::ListenNotesId(text.to_string());
    }
    if YOUTUBE_ID.is_match(text) {
        return Reference::YouTubeVideo(text.to_string());
    }
    if SPOTIFY_ID.is_match(text) {
        return Reference::SpotifyEpisode(text.to_string());
    }
    if let Some(captures) = YOUTUBE_URL.captures(text) {
        return Reference::YouTubeVideo(captures[2].to_string());
    }
    if let Some(captures) = SPOTIFY_URL.captures(text) {
        return Reference::SpotifyEpisode(captures[1].to_string());
    }
    if text.starts_with("http") {
        return Reference::DirectLink(text.to_string());
    }

    Reference::ListenNotesSearch(text.to_string())
}
