//! Error types for the switching core

use thiserror::Error;

use atc_core::SinkError;
use atc_directory::ResolveError;

/// Errors that can occur while switching streams
///
/// None of these are fatal; the worst outcome is a silent channel.
#[derive(Debug, Error)]
pub enum SwitchError {
    /// Directory lookup or playlist follow-up failed
    #[error("stream lookup failed: {0}")]
    Resolve(#[from] ResolveError),

    /// The audio engine rejected a command
    #[error("audio sink error: {0}")]
    Sink(#[from] SinkError),

    /// The audio engine refused to start playback
    #[error("could not start playback of {url}")]
    PlaybackStart {
        /// URL that failed to play
        url: String,
    },

    /// No channel with this index
    #[error("channel not found: COM{}", .0 + 1)]
    ChannelNotFound(usize),

    /// The slot has no audio sink
    #[error("no audio sink available")]
    NoSink,
}

impl SwitchError {
    /// Was the operation cancelled rather than failed?
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SwitchError::Resolve(ResolveError::Cancelled))
    }
}
