//! Host simulator data access
//!
//! These traits are the seam to the flight simulator host. Readings are
//! polled once per tick.

use crate::position::GeoPosition;

/// Radio panel readings and host-side ATIS control
pub trait Cockpit: Send + Sync {
    /// Tuned (active) frequency of a COM radio in kHz, `0` if none
    fn tuned_frequency(&self, channel: usize) -> u32;

    /// Standby frequency of a COM radio in kHz, `0` if none
    fn standby_frequency(&self, channel: usize) -> u32;

    /// Is the radio selected for listening on the audio panel?
    fn is_audio_selected(&self, channel: usize) -> bool;

    /// Delay of a buffered external traffic feed in seconds, if one is active
    fn feed_buffer_period(&self) -> Option<u32> {
        None
    }

    /// Enable or disable the host's built-in ATIS playback
    fn set_host_atis_enabled(&self, _enabled: bool) {}
}

/// Listener position and origin gazetteer
pub trait PositionProvider: Send + Sync {
    /// Current position of the listener's aircraft
    fn listener_position(&self) -> Option<GeoPosition>;

    /// Resolve an origin identifier (airport code) to a position
    fn locate_origin(&self, origin: &str) -> Option<GeoPosition>;
}
