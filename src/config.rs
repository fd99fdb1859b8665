use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::data::fetch::FetchOptions;
use crate::data::retry::RetryPolicy;
use crate::data::stage::StagingOptions;

/// Environment variable naming a JSON configuration file.
pub const CONFIG_ENV: &str = "SPOTIFY_DASHBOARD_CONFIG";

const ARCHIVE_BASE: &str =
    "https://raw.githubusercontent.com/KeyingWU23/Spotify-Dashboard/main/spotify_sql_db";

/// Top-level application configuration. Every field has a default, so an
/// empty JSON object is a valid file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub archives: ArchiveConfig,
    pub http: HttpConfig,
    pub retry: RetryConfig,
    /// Directory for staging files; platform temp directory when unset.
    pub staging_dir: Option<PathBuf>,
}

/// Where the two archives live and which table each one holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub spotify_data_url: String,
    pub spotify_table: String,
    pub top_tracks_url: String,
    pub top_tracks_table: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            spotify_data_url: format!("{ARCHIVE_BASE}/spotify_data.sqlite"),
            spotify_table: "spotify_data".to_string(),
            top_tracks_url: format!("{ARCHIVE_BASE}/spotify_top_tracks_by_artist.sqlite"),
            top_tracks_table: "spotify_top_tracks_by_artist".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// `null` disables the timeout.
    pub timeout_secs: Option<u64>,
    pub max_archive_bytes: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let fetch = FetchOptions::default();
        Self {
            timeout_secs: fetch.timeout.map(|t| t.as_secs()),
            max_archive_bytes: fetch.max_bytes,
            user_agent: fetch.user_agent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_backoff_ms: policy.initial_backoff.as_millis() as u64,
            max_backoff_ms: policy.max_backoff.as_millis() as u64,
            multiplier: policy.multiplier,
        }
    }
}

impl DashboardConfig {
    /// Read and validate a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by [`CONFIG_ENV`], or defaults when unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::from_file(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let a = &self.archives;
        for (name, value) in [
            ("archives.spotify_data_url", &a.spotify_data_url),
            ("archives.spotify_table", &a.spotify_table),
            ("archives.top_tracks_url", &a.top_tracks_url),
            ("archives.top_tracks_table", &a.top_tracks_table),
        ] {
            if value.trim().is_empty() {
                bail!("{name} must not be empty");
            }
        }
        if self.retry.max_attempts == 0 {
            bail!("retry.max_attempts must be at least 1");
        }
        if !(self.retry.multiplier >= 1.0) {
            bail!("retry.multiplier must be >= 1.0, got {}", self.retry.multiplier);
        }
        if self.http.max_archive_bytes == 0 {
            bail!("http.max_archive_bytes must be positive");
        }
        Ok(())
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: self.http.timeout_secs.map(Duration::from_secs),
            max_bytes: self.http.max_archive_bytes,
            user_agent: self.http.user_agent.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            initial_backoff: Duration::from_millis(self.retry.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.retry.max_backoff_ms),
            multiplier: self.retry.multiplier,
            ..RetryPolicy::default()
        }
    }

    pub fn staging_options(&self) -> StagingOptions {
        StagingOptions {
            dir: self.staging_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config: DashboardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert!(config.archives.spotify_data_url.ends_with("/spotify_data.sqlite"));
        assert_eq!(config.retry_policy().max_attempts, 5);
        assert_eq!(config.fetch_options().timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(
            &path,
            r#"{ "retry": { "max_attempts": 2 }, "http": { "timeout_secs": null } }"#,
        )
        .unwrap();

        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.initial_backoff_ms, 250);
        assert_eq!(config.fetch_options().timeout, None);
        assert_eq!(config.archives, ArchiveConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = DashboardConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.archives.top_tracks_table = "  ".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("archives.top_tracks_table"));

        let mut config = DashboardConfig::default();
        config.retry.multiplier = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = DashboardConfig::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }
}
