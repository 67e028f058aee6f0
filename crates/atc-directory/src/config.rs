//! Directory client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use atc_core::Frequency;

/// Default directory base URL
pub const DEFAULT_BASE_URL: &str = "https://www.liveatc.net";

/// Default search path, `{freq}` is replaced by the canonical frequency
pub const DEFAULT_SEARCH_PATH: &str = "/search/f.php?freq={freq}";

/// Suffix marking a playlist reference rather than raw audio
pub const DEFAULT_PLAYLIST_SUFFIX: &str = ".pls";

/// Default timeout for directory requests
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = concat!("atc-directory/", env!("CARGO_PKG_VERSION"));

/// Configuration of the stream directory client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Base URL; relative stream URLs are resolved against it
    pub base_url: String,
    /// Search path template containing `{freq}`
    pub search_path: String,
    /// Suffix of playlist references that need one more fetch
    pub playlist_suffix: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
            playlist_suffix: DEFAULT_PLAYLIST_SUFFIX.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl DirectoryConfig {
    /// Search URL for a frequency
    pub fn search_url(&self, frequency: &Frequency) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.search_path.replace("{freq}", &frequency.canonical())
        )
    }

    /// Does the URL point at a playlist?
    pub fn is_playlist(&self, url: &str) -> bool {
        !self.playlist_suffix.is_empty() && url.ends_with(&self.playlist_suffix)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url() {
        let config = DirectoryConfig::default();
        assert_eq!(
            config.search_url(&Frequency::from_khz(118_700)),
            "https://www.liveatc.net/search/f.php?freq=118.700"
        );
    }

    #[test]
    fn test_is_playlist() {
        let config = DirectoryConfig::default();
        assert!(config.is_playlist("https://www.liveatc.net/play/kjfk_gnd.pls"));
        assert!(!config.is_playlist("http://d.liveatc.net/kjfk_gnd"));
    }
}
