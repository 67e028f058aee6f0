//! HTTP client for the live ATC stream directory
//!
//! # Example
//!
//! ```no_run
//! use atc_core::Frequency;
//! use atc_directory::{DirectoryClient, StreamResolver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DirectoryClient::new()?;
//!     let streams = client.resolve(Frequency::from_khz(120_500)).await?;
//!     for stream in streams.iter() {
//!         println!("{}", stream.debug_line());
//!     }
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use atc_core::{CandidateSet, Frequency};

use crate::config::DirectoryConfig;
use crate::error::{ParseAnomaly, ResolveError};
use crate::listing::ListingParser;
use crate::resolver::StreamResolver;

/// Directory client
///
/// Stateless apart from its connection pool; every call performs one
/// request and nothing is cached.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    client: Client,
    config: DirectoryConfig,
    parser: ListingParser,
}

impl DirectoryClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self, ResolveError> {
        Self::builder().build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    async fn fetch(&self, url: &str) -> Result<String, ResolveError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl StreamResolver for DirectoryClient {
    async fn resolve(&self, frequency: Frequency) -> Result<CandidateSet, ResolveError> {
        let url = self.config.search_url(&frequency);
        debug!("Querying {}", url);

        let body = self.fetch(&url).await?;
        let parsed = self.parser.parse(&body);
        debug!(
            "{}: {} stream(s), {} down, {} unreadable",
            frequency,
            parsed.candidates.len(),
            parsed.down,
            parsed.anomalies.len()
        );
        Ok(parsed.candidates)
    }

    async fn follow_playlist(&self, url: &str) -> Result<Option<String>, ResolveError> {
        if !self.config.is_playlist(url) {
            return Ok(Some(url.to_string()));
        }

        let playlist = self.fetch(url).await?;
        let entry = self.parser.playlist_entry(&playlist);
        if entry.is_none() {
            warn!(
                "{}",
                ParseAnomaly::EmptyPlaylist {
                    url: url.to_string()
                }
            );
        }
        Ok(entry)
    }
}

/// Builder for configuring a [`DirectoryClient`]
#[derive(Debug, Default)]
pub struct ClientBuilder {
    client: Option<Client>,
    config: DirectoryConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing HTTP client (shared connection pool, proxies)
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: DirectoryConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<DirectoryClient, ResolveError> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(&self.config.user_agent)
                .timeout(self.config.request_timeout())
                .build()?,
        };
        let parser = ListingParser::new(&self.config.base_url)?;

        Ok(DirectoryClient {
            client,
            config: self.config,
            parser,
        })
    }
}
