//! Virtual audio sink
//!
//! A [`VirtualSink`] records every command it receives and reports playback
//! state the way a media player would. The paired [`SinkProbe`] lets a test
//! inspect that state and inject failures after the sink has been handed
//! over to a channel.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::trace;

use atc_core::{AudioSink, OutputDevice, SinkError};

/// A command received by a virtual sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCommand {
    Load(String),
    Play,
    Stop,
    SetVolume(u8),
    SetMute(bool),
    SetAudioDelay(Duration),
    SelectOutputDevice(String),
}

#[derive(Debug)]
struct SinkState {
    media: Option<String>,
    playing: bool,
    volume: u8,
    muted: bool,
    audio_delay: Duration,
    device: Option<String>,
    devices: Vec<OutputDevice>,
    log: Vec<SinkCommand>,
    fail_load: bool,
    fail_play: bool,
    /// Report playing only after this many `is_playing` polls
    startup_polls: u32,
    polls_left: u32,
}

impl Default for SinkState {
    fn default() -> Self {
        Self {
            media: None,
            playing: false,
            volume: 100,
            muted: false,
            audio_delay: Duration::ZERO,
            device: None,
            devices: vec![
                OutputDevice::new("default", "System Default"),
                OutputDevice::new("headset", "USB Headset"),
            ],
            log: Vec::new(),
            fail_load: false,
            fail_play: false,
            startup_polls: 0,
            polls_left: 0,
        }
    }
}

/// A simulated media player
#[derive(Debug)]
pub struct VirtualSink {
    id: String,
    state: Arc<Mutex<SinkState>>,
}

impl VirtualSink {
    /// Create a sink and the probe observing it
    pub fn new(id: impl Into<String>) -> (Self, SinkProbe) {
        let state = Arc::new(Mutex::new(SinkState::default()));
        let probe = SinkProbe {
            state: Arc::clone(&state),
        };
        (
            Self {
                id: id.into(),
                state,
            },
            probe,
        )
    }

    /// Create a boxed sink ready to hand to a channel
    pub fn boxed(id: impl Into<String>) -> (Box<dyn AudioSink>, SinkProbe) {
        let (sink, probe) = Self::new(id);
        (Box::new(sink), probe)
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl AudioSink for VirtualSink {
    fn load(&mut self, url: &str) -> Result<(), SinkError> {
        let mut state = self.state.lock();
        state.log.push(SinkCommand::Load(url.to_string()));
        if state.fail_load {
            return Err(SinkError::Load {
                url: url.to_string(),
                reason: "simulated load failure".to_string(),
            });
        }
        trace!("{}: load {}", self.id, url);
        state.media = Some(url.to_string());
        state.playing = false;
        Ok(())
    }

    fn play(&mut self) -> bool {
        let mut state = self.state.lock();
        state.log.push(SinkCommand::Play);
        if state.fail_play || state.media.is_none() {
            return false;
        }
        state.playing = true;
        state.polls_left = state.startup_polls;
        true
    }

    fn stop(&mut self) {
        let mut state = self.state.lock();
        state.log.push(SinkCommand::Stop);
        state.media = None;
        state.playing = false;
    }

    fn is_playing(&self) -> bool {
        let mut state = self.state.lock();
        if !state.playing {
            return false;
        }
        if state.polls_left > 0 {
            state.polls_left -= 1;
            return false;
        }
        true
    }

    fn set_volume(&mut self, volume: u8) {
        let mut state = self.state.lock();
        state.log.push(SinkCommand::SetVolume(volume));
        state.volume = volume;
    }

    fn set_mute(&mut self, mute: bool) {
        let mut state = self.state.lock();
        state.log.push(SinkCommand::SetMute(mute));
        state.muted = mute;
    }

    fn set_audio_delay(&mut self, delay: Duration) {
        let mut state = self.state.lock();
        state.log.push(SinkCommand::SetAudioDelay(delay));
        state.audio_delay = delay;
    }

    fn select_output_device(&mut self, device_id: &str) {
        let mut state = self.state.lock();
        state
            .log
            .push(SinkCommand::SelectOutputDevice(device_id.to_string()));
        state.device = Some(device_id.to_string());
    }

    fn output_devices(&self) -> Vec<OutputDevice> {
        self.state.lock().devices.clone()
    }
}

/// Test-side view of a [`VirtualSink`]
#[derive(Debug, Clone)]
pub struct SinkProbe {
    state: Arc<Mutex<SinkState>>,
}

impl SinkProbe {
    /// URL currently loaded
    pub fn media(&self) -> Option<String> {
        self.state.lock().media.clone()
    }

    /// Playing, ignoring any startup delay
    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    pub fn volume(&self) -> u8 {
        self.state.lock().volume
    }

    pub fn is_muted(&self) -> bool {
        self.state.lock().muted
    }

    pub fn audio_delay(&self) -> Duration {
        self.state.lock().audio_delay
    }

    pub fn device(&self) -> Option<String> {
        self.state.lock().device.clone()
    }

    /// All commands received so far
    pub fn commands(&self) -> Vec<SinkCommand> {
        self.state.lock().log.clone()
    }

    /// Number of received commands matching the predicate
    pub fn count(&self, pred: impl Fn(&SinkCommand) -> bool) -> usize {
        self.state.lock().log.iter().filter(|c| pred(c)).count()
    }

    pub fn clear_log(&self) {
        self.state.lock().log.clear();
    }

    /// Make subsequent `load` calls fail
    pub fn fail_load(&self, fail: bool) {
        self.state.lock().fail_load = fail;
    }

    /// Make subsequent `play` calls fail
    pub fn fail_play(&self, fail: bool) {
        self.state.lock().fail_play = fail;
    }

    /// Delay reported playback by this many `is_playing` polls after `play`
    pub fn set_startup_polls(&self, polls: u32) {
        self.state.lock().startup_polls = polls;
    }

    /// Replace the enumerated output devices
    pub fn set_devices(&self, devices: Vec<OutputDevice>) {
        self.state.lock().devices = devices;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_play_stop() {
        let (mut sink, probe) = VirtualSink::new("A");
        assert!(!sink.play(), "nothing loaded yet");

        sink.load("http://d.liveatc.net/ksfo_twr").unwrap();
        assert!(sink.play());
        assert!(sink.is_playing());
        assert_eq!(probe.media().as_deref(), Some("http://d.liveatc.net/ksfo_twr"));

        sink.stop();
        assert!(!sink.is_playing());
        assert_eq!(probe.media(), None);
    }

    #[test]
    fn test_startup_polls() {
        let (mut sink, probe) = VirtualSink::new("A");
        probe.set_startup_polls(2);
        sink.load("http://x").unwrap();
        assert!(sink.play());
        assert!(!sink.is_playing());
        assert!(!sink.is_playing());
        assert!(sink.is_playing());
    }

    #[test]
    fn test_injected_failures() {
        let (mut sink, probe) = VirtualSink::new("A");
        probe.fail_load(true);
        assert!(sink.load("http://x").is_err());
        probe.fail_load(false);
        sink.load("http://x").unwrap();
        probe.fail_play(true);
        assert!(!sink.play());
        assert_eq!(probe.count(|c| *c == SinkCommand::Play), 1);
    }
}
