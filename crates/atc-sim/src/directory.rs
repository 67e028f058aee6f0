//! Scripted stream directory
//!
//! Serves canned listings per frequency, optionally after a delay, and
//! counts how it is used. Delays run on tokio time, so tests with a paused
//! clock advance through them deterministically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use atc_core::{CandidateSet, Frequency, StreamCandidate};
use atc_directory::{ResolveError, StreamResolver};

#[derive(Debug, Clone)]
enum Listing {
    Streams(Vec<StreamCandidate>),
    Fail(u16),
}

/// Counts concurrent lookups; decrements when the lookup future is dropped
struct InFlight<'a>(&'a ScriptedDirectory);

impl<'a> InFlight<'a> {
    fn enter(dir: &'a ScriptedDirectory) -> Self {
        let now = dir.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        dir.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(dir)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A [`StreamResolver`] answering from a script
#[derive(Debug, Default)]
pub struct ScriptedDirectory {
    listings: Mutex<HashMap<u32, Listing>>,
    playlists: Mutex<HashMap<String, Option<String>>>,
    failing_playlists: Mutex<Vec<String>>,
    delay: Mutex<Duration>,
    resolve_calls: Mutex<Vec<Frequency>>,
    playlist_calls: AtomicUsize,
    completed: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve these streams for a frequency (kHz)
    pub fn set_listing(&self, khz: u32, streams: Vec<StreamCandidate>) {
        self.listings.lock().insert(khz, Listing::Streams(streams));
    }

    /// Answer lookups for a frequency with an HTTP error
    pub fn fail_listing(&self, khz: u32, status: u16) {
        self.listings.lock().insert(khz, Listing::Fail(status));
    }

    /// Resolve a playlist URL to its first entry (`None` for an empty playlist)
    pub fn set_playlist(&self, url: impl Into<String>, entry: Option<&str>) {
        self.playlists
            .lock()
            .insert(url.into(), entry.map(str::to_string));
    }

    /// Fail fetching a playlist URL
    pub fn fail_playlist(&self, url: impl Into<String>) {
        self.failing_playlists.lock().push(url.into());
    }

    /// Delay every lookup by this long
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    /// Frequencies looked up so far, in order
    pub fn resolve_calls(&self) -> Vec<Frequency> {
        self.resolve_calls.lock().clone()
    }

    /// Number of lookups that ran to completion
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn playlist_calls(&self) -> usize {
        self.playlist_calls.load(Ordering::SeqCst)
    }

    /// Lookups currently running
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of lookups ever running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamResolver for ScriptedDirectory {
    async fn resolve(&self, frequency: Frequency) -> Result<CandidateSet, ResolveError> {
        self.resolve_calls.lock().push(frequency);
        let _guard = InFlight::enter(self);

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let listing = self.listings.lock().get(&frequency.khz()).cloned();
        self.completed.fetch_add(1, Ordering::SeqCst);
        debug!("Scripted lookup for {}", frequency);

        match listing {
            Some(Listing::Streams(streams)) => Ok(streams.into_iter().collect()),
            Some(Listing::Fail(status)) => Err(ResolveError::HttpStatus {
                status,
                url: format!("scripted://{}", frequency),
            }),
            None => Ok(CandidateSet::new()),
        }
    }

    async fn follow_playlist(&self, url: &str) -> Result<Option<String>, ResolveError> {
        self.playlist_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_playlists.lock().iter().any(|u| u == url) {
            return Err(ResolveError::HttpStatus {
                status: 404,
                url: url.to_string(),
            });
        }
        match self.playlists.lock().get(url) {
            Some(entry) => Ok(entry.clone()),
            None => Ok(Some(url.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_scripted_lookup() {
        let dir = ScriptedDirectory::new();
        dir.set_listing(
            118_500,
            vec![StreamCandidate::new("KSFO", "KSFO Tower", "http://x/ksfo", 1)],
        );
        dir.fail_listing(119_000, 503);
        dir.set_delay(Duration::from_secs(2));

        let set = dir.resolve(Frequency::from_khz(118_500)).await.unwrap();
        assert_eq!(set.origins(), vec!["KSFO"]);

        let err = dir.resolve(Frequency::from_khz(119_000)).await;
        assert!(matches!(err, Err(ResolveError::HttpStatus { status: 503, .. })));

        let empty = dir.resolve(Frequency::from_khz(120_000)).await.unwrap();
        assert!(empty.is_empty());
        assert_eq!(dir.completed(), 3);
        assert_eq!(dir.max_in_flight(), 1);
        assert_eq!(dir.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_playlists() {
        let dir = ScriptedDirectory::new();
        dir.set_playlist("http://x/a.pls", Some("http://d/a"));
        dir.set_playlist("http://x/empty.pls", None);
        dir.fail_playlist("http://x/gone.pls");

        assert_eq!(
            dir.follow_playlist("http://x/a.pls").await.unwrap().as_deref(),
            Some("http://d/a")
        );
        assert_eq!(dir.follow_playlist("http://x/empty.pls").await.unwrap(), None);
        assert!(dir.follow_playlist("http://x/gone.pls").await.is_err());
        assert_eq!(
            dir.follow_playlist("http://d/raw").await.unwrap().as_deref(),
            Some("http://d/raw")
        );
    }
}
