//! Error types for audio engine commands

use thiserror::Error;

/// Errors reported by an audio sink
#[derive(Debug, Error)]
pub enum SinkError {
    /// The engine rejected the media URL
    #[error("cannot load media '{url}': {reason}")]
    Load {
        /// URL that was rejected
        url: String,
        /// Engine-provided reason
        reason: String,
    },

    /// The requested output device does not exist
    #[error("unknown output device: {0}")]
    UnknownDevice(String),

    /// The engine is not available
    #[error("audio engine unavailable")]
    Unavailable,
}
