//! Audio sink command surface
//!
//! The audio engine that decodes and emits sound lives outside this
//! workspace. A slot drives it exclusively through [`AudioSink`].

use std::time::Duration;

use crate::error::SinkError;

/// An audio output device offered by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutputDevice {
    /// Engine-specific identifier
    pub id: String,
    /// Display name
    pub name: String,
}

impl OutputDevice {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Handle to one media player instance of the external audio engine
pub trait AudioSink: Send {
    /// Load a media URL, replacing whatever was loaded before
    fn load(&mut self, url: &str) -> Result<(), SinkError>;

    /// Start playback of the loaded media; returns `false` if the engine refused
    fn play(&mut self) -> bool;

    /// Stop playback and release the media
    fn stop(&mut self);

    /// Has real playback started?
    fn is_playing(&self) -> bool;

    /// Set volume, 0..=100
    fn set_volume(&mut self, volume: u8);

    /// Mute or unmute
    fn set_mute(&mut self, mute: bool);

    /// Delay audio output by the given amount
    fn set_audio_delay(&mut self, delay: Duration);

    /// Route output to the device with the given id
    fn select_output_device(&mut self, device_id: &str);

    /// Enumerate available output devices
    fn output_devices(&self) -> Vec<OutputDevice>;
}
