//! Collaborators shared by all channels

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use atc_core::{Cockpit, PositionProvider};
use atc_directory::StreamResolver;

use crate::audio::AudioService;
use crate::config::SwitchConfig;
use crate::events::SwitchEvent;

/// Capacity of the event broadcast channel
pub const EVENT_CAPACITY: usize = 256;

/// Handles to the outside world, cloned into every channel and start task
#[derive(Clone)]
pub struct SwitchContext {
    pub resolver: Arc<dyn StreamResolver>,
    pub cockpit: Arc<dyn Cockpit>,
    pub positions: Arc<dyn PositionProvider>,
    pub audio: AudioService,
    pub config: Arc<RwLock<SwitchConfig>>,
    pub events: broadcast::Sender<SwitchEvent>,
    /// Set while the host's own ATIS is turned off in favour of a directory one
    host_atis_off: Arc<AtomicBool>,
}

impl SwitchContext {
    pub fn new(
        config: SwitchConfig,
        resolver: Arc<dyn StreamResolver>,
        cockpit: Arc<dyn Cockpit>,
        positions: Arc<dyn PositionProvider>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let audio = AudioService::new(config.volume, config.audio_device.clone());
        Self {
            resolver,
            cockpit,
            positions,
            audio,
            config: Arc::new(RwLock::new(config)),
            events,
            host_atis_off: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> SwitchConfig {
        self.config.read().clone()
    }

    /// Turn the host's own ATIS off while a directory ATIS plays
    pub fn disable_host_atis(&self) {
        if !self.host_atis_off.swap(true, Ordering::SeqCst) {
            debug!("Host ATIS disabled");
        }
        self.cockpit.set_host_atis_enabled(false);
    }

    /// Turn the host's own ATIS back on if it was turned off
    pub fn restore_host_atis(&self) {
        if self.host_atis_off.swap(false, Ordering::SeqCst) {
            self.cockpit.set_host_atis_enabled(true);
            debug!("Host ATIS re-enabled");
        }
    }

    /// Is the host's own ATIS currently turned off by us?
    pub fn is_host_atis_disabled(&self) -> bool {
        self.host_atis_off.load(Ordering::SeqCst)
    }

    /// Log an event and broadcast it to subscribers
    pub fn emit(&self, event: SwitchEvent) {
        if event.is_failure() {
            warn!("{}", event);
        } else if event.is_routine() {
            debug!("{}", event);
        } else {
            info!("{}", event);
        }
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for SwitchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwitchContext")
            .field("audio", &self.audio)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
