use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::services::SearchFilters;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API credentials for the external collaborators
    pub credentials: Credentials,

    /// Podcast directory search settings
    pub search: SearchConfig,

    /// Transcription settings
    pub transcription: TranscriptionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// ListenNotes API key
    pub listennotes_api_key: String,

    /// AssemblyAI API key
    pub assemblyai_api_key: String,

    /// Spotify client ID (client-credentials flow)
    pub spotify_client_id: String,

    /// Spotify client secret
    pub spotify_client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Region bias for directory search ranking (lowercase ISO code)
    pub region: String,

    /// Spotify market for episode lookups (uppercase ISO code)
    pub market: String,

    /// Minimum episode length in minutes
    pub len_min: u32,

    /// Maximum episode length in minutes
    pub len_max: u32,

    /// Search results per page
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Seconds between job status checks
    pub poll_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: Credentials {
                listennotes_api_key: "".to_string(),
                assemblyai_api_key: "".to_string(),
                spotify_client_id: "".to_string(),
                spotify_client_secret: "".to_string(),
            },
            search: SearchConfig {
                region: "fr".to_string(),
                market: "FR".to_string(),
                len_min: 3,
                len_max: 180,
                page_size: 10,
            },
            transcription: TranscriptionConfig {
                poll_interval_secs: 3,
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content =
                fs_err::read_to_string(&config_path).context("Failed to read config file")?;

            let config: Config =
                serde_yaml::from_str(&content).context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("audioscribe").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.credentials.listennotes_api_key.is_empty() {
            anyhow::bail!("ListenNotes API key must be configured");
        }
        if self.credentials.assemblyai_api_key.is_empty() {
            anyhow::bail!("AssemblyAI API key must be configured");
        }
        if self.credentials.spotify_client_id.is_empty()
            || self.credentials.spotify_client_secret.is_empty()
        {
            anyhow::bail!("Spotify client credentials must be configured");
        }

        Ok(())
    }

    /// Directory search filters derived from the search settings
    pub fn search_filters(&self) -> SearchFilters {
        SearchFilters {
            len_min: self.search.len_min,
            len_max: self.search.len_max,
            page_size: self.search.page_size,
            unique_podcasts: true,
            region: self.search.region.clone(),
        }
    }
}
