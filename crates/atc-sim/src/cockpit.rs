//! Virtual cockpit and positions

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use atc_core::{Cockpit, GeoPosition, PositionProvider};

#[derive(Debug)]
struct RadioPanel {
    tuned: Vec<u32>,
    standby: Vec<u32>,
    selected: Vec<bool>,
    feed_delay: Option<u32>,
    host_atis: bool,
    /// Calls to `set_host_atis_enabled`
    host_atis_writes: usize,
}

/// A simulated radio panel with a configurable number of COM radios
///
/// All setters take `&self` so the cockpit can be shared with a channel
/// manager behind an `Arc` while a test keeps turning the knobs.
#[derive(Debug)]
pub struct VirtualCockpit {
    panel: RwLock<RadioPanel>,
}

impl VirtualCockpit {
    /// Create a cockpit with `radios` COM radios, all off and selected
    pub fn new(radios: usize) -> Self {
        Self {
            panel: RwLock::new(RadioPanel {
                tuned: vec![0; radios],
                standby: vec![0; radios],
                selected: vec![true; radios],
                feed_delay: None,
                host_atis: true,
                host_atis_writes: 0,
            }),
        }
    }

    /// Tune the active frequency (kHz, `0` for none)
    pub fn tune(&self, channel: usize, khz: u32) {
        if let Some(f) = self.panel.write().tuned.get_mut(channel) {
            *f = khz;
        }
    }

    /// Dial the standby frequency (kHz, `0` for none)
    pub fn set_standby(&self, channel: usize, khz: u32) {
        if let Some(f) = self.panel.write().standby.get_mut(channel) {
            *f = khz;
        }
    }

    /// Swap active and standby, as the flip-flop button does
    pub fn flip(&self, channel: usize) {
        let mut panel = self.panel.write();
        if channel < panel.tuned.len() {
            let tuned = panel.tuned[channel];
            panel.tuned[channel] = panel.standby[channel];
            panel.standby[channel] = tuned;
        }
    }

    /// Select or deselect the radio on the audio panel
    pub fn select_audio(&self, channel: usize, selected: bool) {
        if let Some(s) = self.panel.write().selected.get_mut(channel) {
            *s = selected;
        }
    }

    /// Set the external traffic feed's buffering delay
    pub fn set_feed_delay(&self, secs: Option<u32>) {
        self.panel.write().feed_delay = secs;
    }

    /// Is the host's own ATIS currently enabled?
    pub fn host_atis_enabled(&self) -> bool {
        self.panel.read().host_atis
    }

    /// How often the host ATIS setting was written
    pub fn host_atis_writes(&self) -> usize {
        self.panel.read().host_atis_writes
    }
}

impl Cockpit for VirtualCockpit {
    fn tuned_frequency(&self, channel: usize) -> u32 {
        self.panel.read().tuned.get(channel).copied().unwrap_or(0)
    }

    fn standby_frequency(&self, channel: usize) -> u32 {
        self.panel.read().standby.get(channel).copied().unwrap_or(0)
    }

    fn is_audio_selected(&self, channel: usize) -> bool {
        self.panel.read().selected.get(channel).copied().unwrap_or(false)
    }

    fn feed_buffer_period(&self) -> Option<u32> {
        self.panel.read().feed_delay
    }

    fn set_host_atis_enabled(&self, enabled: bool) {
        let mut panel = self.panel.write();
        panel.host_atis = enabled;
        panel.host_atis_writes += 1;
    }
}

/// A listener position plus a small airport gazetteer
#[derive(Debug, Default)]
pub struct VirtualPositions {
    listener: RwLock<Option<GeoPosition>>,
    origins: RwLock<HashMap<String, GeoPosition>>,
    lookups: AtomicUsize,
}

impl VirtualPositions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the listener
    pub fn set_listener(&self, position: GeoPosition) {
        *self.listener.write() = Some(position);
    }

    /// Register an origin's location
    pub fn add_origin(&self, origin: impl Into<String>, position: GeoPosition) {
        self.origins.write().insert(origin.into(), position);
    }

    /// Register an origin `nm` nautical miles due north of (0, 0)
    pub fn add_origin_north(&self, origin: impl Into<String>, nm: f64) {
        self.add_origin(origin, GeoPosition::at(nm / 60.0, 0.0));
    }

    /// Number of gazetteer lookups performed
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl PositionProvider for VirtualPositions {
    fn listener_position(&self) -> Option<GeoPosition> {
        *self.listener.read()
    }

    fn locate_origin(&self, origin: &str) -> Option<GeoPosition> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.origins.read().get(origin).copied()
    }
}
