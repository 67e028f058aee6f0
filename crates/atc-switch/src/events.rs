//! User-visible switching events
//!
//! Everything the host would show in its message area is emitted as a
//! [`SwitchEvent`] on a broadcast channel, in addition to being logged.

use std::fmt;

use atc_core::{Frequency, StreamStatus};

/// Events emitted by channels and the channel manager
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchEvent {
    // -------------------------------------------------------------------------
    // Stream lifecycle
    // -------------------------------------------------------------------------
    /// The active slot is tuning to a stream
    Tuning {
        channel: usize,
        frequency: Frequency,
        stream: String,
        /// Desync delay in seconds
        delay_s: u64,
    },

    /// The standby slot started pre-buffering a stream
    StandbyPrebuffering {
        channel: usize,
        frequency: Frequency,
        stream: String,
        delay_s: u64,
    },

    /// A pre-buffered standby stream took over as the active stream
    HandOff {
        channel: usize,
        frequency: Frequency,
        stream: String,
    },

    /// A closer stream for the same frequency replaced the current one
    Retargeted {
        channel: usize,
        frequency: Frequency,
        from: String,
        to: String,
        standby: bool,
    },

    /// A stream moved beyond the maximum reception distance and was stopped
    OutOfReach {
        channel: usize,
        stream: String,
        standby: bool,
    },

    /// A stream was stopped
    StreamStopped {
        channel: usize,
        frequency: Frequency,
        stream: Option<String>,
    },

    /// Seconds left until the active stream becomes audible
    Countdown {
        channel: usize,
        stream: String,
        secs: u64,
    },

    /// An ATIS stream was not played in favour of the host's ATIS
    AtisSuppressed {
        channel: usize,
        frequency: Frequency,
        stream: String,
    },

    // -------------------------------------------------------------------------
    // Failures and non-results
    // -------------------------------------------------------------------------
    /// No stream for the frequency is within reach
    NoCandidateInRange {
        channel: usize,
        frequency: Frequency,
    },

    /// Directory lookup or playlist follow-up failed
    ResolveFailed {
        channel: usize,
        frequency: Frequency,
        message: String,
    },

    /// The audio engine refused to play a stream
    PlaybackFailed {
        channel: usize,
        url: String,
    },

    // -------------------------------------------------------------------------
    // Status
    // -------------------------------------------------------------------------
    /// A channel's effective status changed between ticks
    StatusChanged {
        channel: usize,
        status: StreamStatus,
    },
}

impl SwitchEvent {
    /// Channel the event is about
    pub fn channel(&self) -> usize {
        match self {
            SwitchEvent::Tuning { channel, .. }
            | SwitchEvent::StandbyPrebuffering { channel, .. }
            | SwitchEvent::HandOff { channel, .. }
            | SwitchEvent::Retargeted { channel, .. }
            | SwitchEvent::OutOfReach { channel, .. }
            | SwitchEvent::StreamStopped { channel, .. }
            | SwitchEvent::Countdown { channel, .. }
            | SwitchEvent::AtisSuppressed { channel, .. }
            | SwitchEvent::NoCandidateInRange { channel, .. }
            | SwitchEvent::ResolveFailed { channel, .. }
            | SwitchEvent::PlaybackFailed { channel, .. }
            | SwitchEvent::StatusChanged { channel, .. } => *channel,
        }
    }

    /// Is this a failure the user should notice?
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SwitchEvent::ResolveFailed { .. } | SwitchEvent::PlaybackFailed { .. }
        )
    }

    /// Is this a routine notice, logged at debug level only?
    pub fn is_routine(&self) -> bool {
        matches!(
            self,
            SwitchEvent::Countdown { .. }
                | SwitchEvent::NoCandidateInRange { .. }
                | SwitchEvent::StatusChanged { .. }
        )
    }
}

impl fmt::Display for SwitchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchEvent::Tuning {
                channel,
                frequency,
                stream,
                delay_s,
            } => write!(
                f,
                "COM{} is now {}, tuning to '{}' with {}s delay",
                channel + 1,
                frequency,
                stream,
                delay_s
            ),
            SwitchEvent::StandbyPrebuffering {
                channel,
                frequency,
                stream,
                delay_s,
            } => write!(
                f,
                "COM{} stand-by is now {}, pre-buffering '{}' with {}s delay",
                channel + 1,
                frequency,
                stream,
                delay_s
            ),
            SwitchEvent::HandOff {
                channel,
                frequency,
                stream,
            } => write!(
                f,
                "COM{} is now {}, switching to pre-buffered '{}'",
                channel + 1,
                frequency,
                stream
            ),
            SwitchEvent::Retargeted {
                channel,
                to,
                standby,
                ..
            } => write!(
                f,
                "COM{}{}: Tuning to '{}' as this is closest now",
                channel + 1,
                if *standby { " stand-by" } else { "" },
                to
            ),
            SwitchEvent::OutOfReach {
                channel,
                stream,
                standby,
            } => write!(
                f,
                "COM{}{}: '{}' now out of reach",
                channel + 1,
                if *standby { " stand-by" } else { "" },
                stream
            ),
            SwitchEvent::StreamStopped {
                channel,
                frequency,
                stream,
            } => write!(
                f,
                "COM{}: stopped '{}' on {}",
                channel + 1,
                stream.as_deref().unwrap_or("-"),
                frequency
            ),
            SwitchEvent::Countdown {
                channel,
                stream,
                secs,
            } => write!(f, "COM{}: {}s till '{}' starts", channel + 1, secs, stream),
            SwitchEvent::AtisSuppressed {
                channel,
                frequency,
                stream,
            } => write!(
                f,
                "COM{} is now {}, referring to {}, suppressed in favour of the host's ATIS",
                channel + 1,
                frequency,
                stream
            ),
            SwitchEvent::NoCandidateInRange { channel, frequency } => write!(
                f,
                "COM{}: no stream for {} within reach",
                channel + 1,
                frequency
            ),
            SwitchEvent::ResolveFailed {
                channel,
                frequency,
                message,
            } => write!(
                f,
                "COM{}: lookup for {} failed: {}",
                channel + 1,
                frequency,
                message
            ),
            SwitchEvent::PlaybackFailed { channel, url } => {
                write!(f, "COM{}: could not play {}", channel + 1, url)
            }
            SwitchEvent::StatusChanged { channel, status } => {
                write!(f, "COM{} is {}", channel + 1, status)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let tuning = SwitchEvent::Tuning {
            channel: 0,
            frequency: Frequency::from_khz(118_500),
            stream: "KSFO Tower".into(),
            delay_s: 50,
        };
        assert_eq!(
            tuning.to_string(),
            "COM1 is now 118.500, tuning to 'KSFO Tower' with 50s delay"
        );

        let countdown = SwitchEvent::Countdown {
            channel: 1,
            stream: "KOAK Ground".into(),
            secs: 12,
        };
        assert_eq!(countdown.to_string(), "COM2: 12s till 'KOAK Ground' starts");
        assert!(countdown.is_routine());
    }

    #[test]
    fn test_classifiers() {
        let failed = SwitchEvent::PlaybackFailed {
            channel: 1,
            url: "http://x".into(),
        };
        assert!(failed.is_failure());
        assert_eq!(failed.channel(), 1);

        let reach = SwitchEvent::OutOfReach {
            channel: 0,
            stream: "KSFO Tower".into(),
            standby: true,
        };
        assert!(!reach.is_failure());
        assert_eq!(reach.to_string(), "COM1 stand-by: 'KSFO Tower' now out of reach");
    }
}
