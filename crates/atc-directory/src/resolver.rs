//! Stream resolver seam

use async_trait::async_trait;

use atc_core::{CandidateSet, Frequency};

use crate::error::ResolveError;

/// Looks up live streams for a frequency
///
/// Implementations issue exactly one query per call and never retry on
/// their own; retries are driven by the caller's next evaluation.
#[async_trait]
pub trait StreamResolver: Send + Sync {
    /// Query the directory for streams carrying `frequency`
    async fn resolve(&self, frequency: Frequency) -> Result<CandidateSet, ResolveError>;

    /// Turn a candidate URL into a playable one
    ///
    /// Playlist references are fetched once and their first entry returned.
    /// `Ok(None)` means the playlist had no playable entry. Any other URL is
    /// returned unchanged.
    async fn follow_playlist(&self, url: &str) -> Result<Option<String>, ResolveError>;
}
