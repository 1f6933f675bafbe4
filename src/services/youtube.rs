//! YouTube metadata and stream extraction using yt-dlp

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use tokio::process::Command;

use super::{MediaExtractor, MediaFormat, MediaInfo};
use crate::Result;

pub struct YoutubeExtractor {
    yt_dlp_path: String,
}

impl YoutubeExtractor {
    pub fn new() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> bool {
        Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Dump the full video info JSON via yt-dlp
    async fn get_video_info(&self, url: &str) -> Result<Value> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--no-playlist", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error);
        }

        let json_str = String::from_utf8(output.stdout)?;
        let info: Value = serde_json::from_str(&json_str)
            .context("Failed to parse yt-dlp output")?;

        Ok(info)
    }
}

#[async_trait]
impl MediaExtractor for YoutubeExtractor {
    async fn extract_info(&self, url: &str) -> Result<MediaInfo> {
        if !self.check_availability().await {
            anyhow::bail!(
                "yt-dlp is not available. Please install it: https://github.com/yt-dlp/yt-dlp"
            );
        }

        let info = self.get_video_info(url).await?;

        let title = info["title"].as_str().unwrap_or_default().to_string();
        let duration_seconds = info["duration"].as_f64().map(|d| d as u64);

        let formats = info["formats"]
            .as_array()
            .map(|formats| {
                formats
                    .iter()
                    .filter_map(|format| {
                        Some(MediaFormat {
                            resolution: format["resolution"].as_str()?.to_string(),
                            ext: format["ext"].as_str()?.to_string(),
                            url: format["url"].as_str()?.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(MediaInfo {
            title,
            duration_seconds,
            formats,
        })
    }
}

impl Default for YoutubeExtractor {
    fn default() -> Self {
        Self::new()
    }
}
