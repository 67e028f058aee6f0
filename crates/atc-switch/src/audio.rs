//! Shared audio output state
//!
//! Volume, global mute, output device and the cached device list are owned
//! by one [`AudioService`] created with the channel manager. Channels read
//! it on every tick to derive each slot's volume and mute.

use std::sync::Arc;

use parking_lot::RwLock;

use atc_core::OutputDevice;

#[derive(Debug, Default)]
struct AudioState {
    volume: u8,
    muted: bool,
    device: Option<String>,
    devices: Vec<OutputDevice>,
}

/// Global audio settings shared by all channels
#[derive(Debug, Clone, Default)]
pub struct AudioService {
    state: Arc<RwLock<AudioState>>,
}

impl AudioService {
    pub fn new(volume: u8, device: Option<String>) -> Self {
        Self {
            state: Arc::new(RwLock::new(AudioState {
                volume: volume.min(100),
                muted: false,
                device,
                devices: Vec::new(),
            })),
        }
    }

    pub fn volume(&self) -> u8 {
        self.state.read().volume
    }

    pub fn set_volume(&self, volume: u8) {
        self.state.write().volume = volume.min(100);
    }

    /// Is everything muted?
    pub fn is_muted(&self) -> bool {
        self.state.read().muted
    }

    pub fn set_muted(&self, muted: bool) {
        self.state.write().muted = muted;
    }

    /// Should a channel be muted?
    ///
    /// Global mute applies to all; with `respect_audio_select` a radio not
    /// selected on the audio panel is muted too.
    pub fn should_mute(&self, audio_selected: bool, respect_audio_select: bool) -> bool {
        self.is_muted() || (respect_audio_select && !audio_selected)
    }

    pub fn device(&self) -> Option<String> {
        self.state.read().device.clone()
    }

    pub fn set_device(&self, device: Option<String>) {
        self.state.write().device = device;
    }

    /// Cached output devices
    pub fn devices(&self) -> Vec<OutputDevice> {
        self.state.read().devices.clone()
    }

    /// Replace the cached device list; returns whether it changed
    pub fn set_devices(&self, devices: Vec<OutputDevice>) -> bool {
        let mut state = self.state.write();
        if state.devices == devices {
            return false;
        }
        state.devices = devices;
        true
    }

    pub fn has_device(&self, device_id: &str) -> bool {
        self.state.read().devices.iter().any(|d| d.id == device_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_mute() {
        let audio = AudioService::new(80, None);
        assert!(!audio.should_mute(false, false));
        assert!(audio.should_mute(false, true));
        assert!(!audio.should_mute(true, true));

        audio.set_muted(true);
        assert!(audio.should_mute(true, false));
    }

    #[test]
    fn test_volume_clamped() {
        let audio = AudioService::new(150, None);
        assert_eq!(audio.volume(), 100);
        audio.set_volume(30);
        assert_eq!(audio.volume(), 30);
    }

    #[test]
    fn test_device_cache() {
        let audio = AudioService::default();
        let devices = vec![OutputDevice::new("hs", "Headset")];
        assert!(audio.set_devices(devices.clone()));
        assert!(!audio.set_devices(devices));
        assert!(audio.has_device("hs"));
        assert!(!audio.has_device("spk"));
    }
}
