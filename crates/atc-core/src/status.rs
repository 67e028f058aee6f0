//! Stream slot lifecycle status

use std::fmt;

/// Lifecycle status of a stream slot
///
/// The variant order is significant: checks such as "at least buffering" are
/// written as `status >= StreamStatus::Buffering`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StreamStatus {
    /// The slot has no audio sink
    NotInitialized,
    /// No frequency assigned
    NoFrequency,
    /// A frequency is assigned but nothing is loaded
    NotPlaying,
    /// A resolve-and-play task is outstanding
    Searching,
    /// A stream is loaded but not yet audible
    Buffering,
    /// Playing, but the desync delay has not yet elapsed
    Desyncing,
    /// Playing, but muted
    Muted,
    /// Audibly playing
    Playing,
}

impl StreamStatus {
    /// All statuses in ascending order
    pub const ALL: [StreamStatus; 8] = [
        StreamStatus::NotInitialized,
        StreamStatus::NoFrequency,
        StreamStatus::NotPlaying,
        StreamStatus::Searching,
        StreamStatus::Buffering,
        StreamStatus::Desyncing,
        StreamStatus::Muted,
        StreamStatus::Playing,
    ];

    /// Human-readable status text
    pub fn name(&self) -> &'static str {
        match self {
            StreamStatus::NotInitialized => "not initialized",
            StreamStatus::NoFrequency => "no frequency",
            StreamStatus::NotPlaying => "not playing",
            StreamStatus::Searching => "searching",
            StreamStatus::Buffering => "buffering",
            StreamStatus::Desyncing => "desyncing",
            StreamStatus::Muted => "muted",
            StreamStatus::Playing => "playing",
        }
    }

    /// Is a stream loaded into the sink?
    pub fn is_loaded(&self) -> bool {
        *self >= StreamStatus::Buffering
    }
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        for pair in StreamStatus::ALL.windows(2) {
            assert!(pair[0] < pair[1], "{} should be below {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_is_loaded() {
        assert!(!StreamStatus::Searching.is_loaded());
        assert!(StreamStatus::Buffering.is_loaded());
        assert!(StreamStatus::Playing.is_loaded());
    }

    #[test]
    fn test_display() {
        assert_eq!(StreamStatus::NoFrequency.to_string(), "no frequency");
        assert_eq!(StreamStatus::Desyncing.to_string(), "desyncing");
    }
}
