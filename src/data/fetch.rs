use std::path::PathBuf;
use std::time::Duration;

use log::info;
use ureq::Agent;

use super::error::LoadError;

// ---------------------------------------------------------------------------
// Fetcher seam
// ---------------------------------------------------------------------------

/// Retrieves the raw bytes of a remote archive.
///
/// The body is treated as an opaque blob; the loader writes it verbatim to a
/// staging file.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        (**self).fetch(url)
    }
}

// ---------------------------------------------------------------------------
// ArchiveFetcher – dispatch by URL scheme
// ---------------------------------------------------------------------------

/// HTTP settings for [`ArchiveFetcher`].
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Global per-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Upper bound on the body size of one archive.
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            max_bytes: 64 * 1024 * 1024,
            user_agent: concat!("spotify-dashboard/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Fetches `http(s)://` URLs with a blocking `ureq` agent and reads
/// `file://` URLs from local disk.
pub struct ArchiveFetcher {
    agent: Agent,
    max_bytes: u64,
}

impl ArchiveFetcher {
    pub fn new(options: &FetchOptions) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(options.timeout)
            .user_agent(options.user_agent.as_str())
            .build()
            .into();
        Self {
            agent,
            max_bytes: options.max_bytes,
        }
    }

    fn fetch_http(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let network = |reason: String| LoadError::Network {
            url: url.to_string(),
            reason,
        };
        // Non-2xx statuses surface as `ureq::Error::StatusCode`.
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|err| network(err.to_string()))?;
        let bytes = response
            .into_body()
            .with_config()
            .limit(self.max_bytes)
            .read_to_vec()
            .map_err(|err| network(format!("reading response body: {err}")))?;
        info!("Fetched {} bytes from {url}", bytes.len());
        Ok(bytes)
    }

    fn fetch_file(&self, url: &str, path: PathBuf) -> Result<Vec<u8>, LoadError> {
        let bytes = std::fs::read(&path).map_err(|err| LoadError::Network {
            url: url.to_string(),
            reason: format!("reading {}: {err}", path.display()),
        })?;
        if bytes.len() as u64 > self.max_bytes {
            return Err(LoadError::Network {
                url: url.to_string(),
                reason: format!("archive exceeds {} bytes", self.max_bytes),
            });
        }
        info!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(bytes)
    }
}

impl Default for ArchiveFetcher {
    fn default() -> Self {
        Self::new(&FetchOptions::default())
    }
}

impl Fetcher for ArchiveFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let scheme = url
            .split_once("://")
            .map(|(s, _)| s.to_ascii_lowercase())
            .unwrap_or_default();

        match scheme.as_str() {
            "http" | "https" => self.fetch_http(url),
            "file" => {
                let path = PathBuf::from(&url["file://".len()..]);
                self.fetch_file(url, path)
            }
            other => Err(LoadError::Network {
                url: url.to_string(),
                reason: format!("unsupported URL scheme '{other}'"),
            }),
        }
    }
}
