//! Error types for directory lookups

use thiserror::Error;

/// Errors that abort a directory lookup or playlist follow-up
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Transport failure talking to the directory
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// The directory answered with a non-success status
    #[error("directory answered HTTP {status} for {url}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// A URL could not be built
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A listing pattern failed to compile
    #[error("invalid listing pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The lookup was cancelled before it completed
    #[error("lookup cancelled")]
    Cancelled,
}

/// One entry of a listing that could not be read and was skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAnomaly {
    /// No origin identifier in the entry
    #[error("could not find airport ICAO in directory reply")]
    MissingOrigin,

    /// No stream name in the entry
    #[error("could not find stream name for {origin} in directory reply")]
    MissingLabel {
        /// Origin of the entry
        origin: String,
    },

    /// No stream URL in the entry
    #[error("could not find stream URL for '{label}' in directory reply")]
    MissingUrl {
        /// Stream name of the entry
        label: String,
    },

    /// No feed status in the entry; the stream is assumed up
    #[error("could not find feed status for '{label}', assuming UP")]
    MissingStatus {
        /// Stream name of the entry
        label: String,
    },

    /// A playlist contained no playable reference
    #[error("could not find File1 in playlist {url}")]
    EmptyPlaylist {
        /// Playlist URL
        url: String,
    },
}
