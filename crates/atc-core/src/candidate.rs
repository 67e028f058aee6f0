//! Stream candidates returned by a directory lookup

use std::collections::BTreeMap;

use tracing::debug;

use crate::position::GeoPosition;

/// One playable stream associated with a transmitter origin
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamCandidate {
    /// Origin identifier, usually an ICAO airport code
    pub origin: String,
    /// Human-readable stream name
    pub label: String,
    /// Playable URL (may still be a playlist reference)
    pub url: String,
    /// Number of facilities the stream covers; lower is more specific
    pub specificity: u32,
    /// Transmitter location, `None` until resolved
    pub position: Option<GeoPosition>,
}

impl StreamCandidate {
    /// Create a candidate with an unresolved position
    pub fn new(
        origin: impl Into<String>,
        label: impl Into<String>,
        url: impl Into<String>,
        specificity: u32,
    ) -> Self {
        Self {
            origin: origin.into(),
            label: label.into(),
            url: url.into(),
            specificity,
            position: None,
        }
    }

    /// Attach a known position
    pub fn with_position(mut self, position: GeoPosition) -> Self {
        self.position = Some(position);
        self
    }

    /// Distance from `from` in nautical miles, if the position is known
    pub fn distance_nm(&self, from: &GeoPosition) -> Option<f64> {
        self.position.map(|p| from.distance_nm(&p))
    }

    /// Is this an ATIS stream?
    pub fn is_atis(&self) -> bool {
        self.label.contains("ATIS")
    }

    /// Short name for messages: the label, prefixed with the origin unless
    /// the label already starts with it
    pub fn summary(&self) -> String {
        if self.label.starts_with(&self.origin) {
            self.label.clone()
        } else {
            format!("{}|{}", self.origin, self.label)
        }
    }

    /// Summary plus specificity and URL, for diagnostics
    pub fn debug_line(&self) -> String {
        format!(
            "{} [{} facilities] {}",
            self.summary(),
            self.specificity,
            self.url
        )
    }
}

/// Result of merging a candidate into a set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No candidate for this origin existed yet
    Added,
    /// The new candidate is more specific and replaced the old one
    Replaced,
    /// The existing candidate was at least as specific and was kept
    Kept,
}

/// Candidates for one resolution query, keyed by origin identifier
///
/// Iteration is ordered by origin identifier so that selection over the set
/// is deterministic. Positions resolved for a candidate are cached on the
/// candidate itself, which keeps the cache scoped to this set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    entries: BTreeMap<String, StreamCandidate>,
}

impl CandidateSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a candidate, keeping the more specific one per origin
    pub fn insert(&mut self, candidate: StreamCandidate) -> MergeOutcome {
        match self.entries.get_mut(&candidate.origin) {
            None => {
                debug!("Adding stream {}", candidate.debug_line());
                self.entries.insert(candidate.origin.clone(), candidate);
                MergeOutcome::Added
            }
            Some(existing) if candidate.specificity < existing.specificity => {
                debug!(
                    "Replacing {} with more specific {}",
                    existing.debug_line(),
                    candidate.debug_line()
                );
                *existing = candidate;
                MergeOutcome::Replaced
            }
            Some(existing) => {
                debug!(
                    "Keeping {} over less specific {}",
                    existing.debug_line(),
                    candidate.debug_line()
                );
                MergeOutcome::Kept
            }
        }
    }

    /// Look up the candidate for an origin
    pub fn get(&self, origin: &str) -> Option<&StreamCandidate> {
        self.entries.get(origin)
    }

    /// Remove an origin from the set
    pub fn remove(&mut self, origin: &str) -> Option<StreamCandidate> {
        self.entries.remove(origin)
    }

    /// Iterate candidates in origin order
    pub fn iter(&self) -> impl Iterator<Item = &StreamCandidate> {
        self.entries.values()
    }

    /// Iterate candidates mutably in origin order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StreamCandidate> {
        self.entries.values_mut()
    }

    /// Origin identifiers in iteration order
    pub fn origins(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<StreamCandidate> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = StreamCandidate>>(iter: I) -> Self {
        let mut set = CandidateSet::new();
        for candidate in iter {
            set.insert(candidate);
        }
        set
    }
}
