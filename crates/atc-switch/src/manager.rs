//! Channel manager
//!
//! Owns one [`Channel`] per COM radio, drives them once per tick and applies
//! user-level audio settings (volume, mute, output device) to all of them.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use atc_core::{AudioSink, Cockpit, Frequency, OutputDevice, PositionProvider, StreamStatus};
use atc_directory::StreamResolver;

use crate::audio::AudioService;
use crate::channel::{Channel, TickInput};
use crate::config::SwitchConfig;
use crate::context::SwitchContext;
use crate::error::SwitchError;
use crate::events::SwitchEvent;
use crate::scheduler::TickScheduler;

/// One row of the status overview
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSummary {
    /// Zero-based radio index
    pub channel: usize,
    pub frequency: Option<Frequency>,
    pub status: StreamStatus,
    /// Stream summary of the active slot
    pub stream: String,
    /// Summary of the displaced slot, if it holds anything
    pub standby: Option<String>,
}

/// Drives all channels
#[derive(Debug)]
pub struct ChannelManager {
    channels: Vec<Channel>,
    ctx: SwitchContext,
    device_refresh: TickScheduler,
    /// Effective status of each channel at the end of the previous tick
    statuses: Vec<StreamStatus>,
}

impl ChannelManager {
    pub fn new(
        config: SwitchConfig,
        resolver: Arc<dyn StreamResolver>,
        cockpit: Arc<dyn Cockpit>,
        positions: Arc<dyn PositionProvider>,
    ) -> Self {
        let mut device_refresh = TickScheduler::new(config.device_refresh_every_ticks);
        device_refresh.force_next();
        Self {
            channels: Vec::new(),
            ctx: SwitchContext::new(config, resolver, cockpit, positions),
            device_refresh,
            statuses: Vec::new(),
        }
    }

    /// Add the next channel; without sinks it stays not initialized
    ///
    /// Returns the channel index.
    pub fn add_channel(&mut self, sinks: Option<[Box<dyn AudioSink>; 2]>) -> usize {
        let index = self.channels.len();
        let channel = Channel::new(index, sinks, self.ctx.clone());
        if let Some(device) = self.ctx.audio.device() {
            channel.select_output_device(&device);
        }
        if !channel.is_valid() {
            warn!("COM{}: no audio sink, channel disabled", index + 1);
        }
        self.statuses.push(channel.status());
        self.channels.push(channel);
        index
    }

    /// Receive switching events
    pub fn subscribe(&self) -> broadcast::Receiver<SwitchEvent> {
        self.ctx.events.subscribe()
    }

    pub fn context(&self) -> &SwitchContext {
        &self.ctx
    }

    pub fn audio(&self) -> &AudioService {
        &self.ctx.audio
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> SwitchConfig {
        self.ctx.config()
    }

    /// Replace the configuration; takes effect on the next tick
    pub fn update_config(&mut self, config: SwitchConfig) {
        self.device_refresh
            .set_every(config.device_refresh_every_ticks);
        let volume = config.volume;
        let device = config.audio_device.clone();
        *self.ctx.config.write() = config;

        self.set_all_volume(volume);
        if device != self.ctx.audio.device() {
            match device {
                Some(id) => self.set_output_device(&id),
                None => self.ctx.audio.set_device(None),
            }
        }
        debug!("Configuration updated");
    }

    /// Enable or disable acting on a radio
    pub fn set_act_on_channel(&mut self, channel: usize, enabled: bool) -> Result<(), SwitchError> {
        if channel >= self.channels.len() {
            return Err(SwitchError::ChannelNotFound(channel));
        }
        let mut config = self.ctx.config.write();
        if config.act_on_channel.len() <= channel {
            config.act_on_channel.resize(channel + 1, false);
        }
        config.act_on_channel[channel] = enabled;
        Ok(())
    }

    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn channel_mut(&mut self, index: usize) -> Option<&mut Channel> {
        self.channels.get_mut(index)
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Drive all channels one tick
    pub async fn tick(&mut self) {
        let config = self.ctx.config();

        for channel in &mut self.channels {
            let index = channel.index();
            if !config.acts_on(index) {
                if channel.is_defined() {
                    info!("COM{}: disabled, stopping", index + 1);
                    channel.clear().await;
                }
                continue;
            }
            let input = TickInput::from_cockpit(&*self.ctx.cockpit, index);
            channel.on_tick(input).await;
        }

        if !self.any_atis_playing() {
            self.ctx.restore_host_atis();
        }

        if self.device_refresh.tick() {
            if let Err(e) = self.refresh_output_devices() {
                debug!("Output device refresh skipped: {}", e);
            }
        }

        self.announce_status_changes();
    }

    /// Stop all channels
    pub async fn shutdown(&mut self) {
        for channel in &mut self.channels {
            channel.clear().await;
        }
        self.ctx.restore_host_atis();
        self.announce_status_changes();
    }

    fn announce_status_changes(&mut self) {
        for (channel, last) in self.channels.iter().zip(self.statuses.iter_mut()) {
            let status = channel.status();
            if status != *last {
                *last = status;
                self.ctx.emit(SwitchEvent::StatusChanged {
                    channel: channel.index(),
                    status,
                });
            }
        }
    }

    // ========================================================================
    // Audio settings
    // ========================================================================

    pub fn set_all_volume(&self, volume: u8) {
        self.ctx.audio.set_volume(volume);
        self.ctx.config.write().volume = volume.min(100);
        self.reapply_output();
    }

    /// Mute or unmute everything
    pub fn mute_all(&self, mute: bool) {
        self.ctx.audio.set_muted(mute);
        self.reapply_output();
    }

    fn reapply_output(&self) {
        let respect = self.ctx.config.read().respect_audio_select;
        for channel in &self.channels {
            let selected = self.ctx.cockpit.is_audio_selected(channel.index());
            channel.apply_output(self.ctx.audio.should_mute(selected, respect));
        }
    }

    /// Route all sinks to an output device
    pub fn set_output_device(&self, device_id: &str) {
        let known = self.ctx.audio.devices();
        if !known.is_empty() && !self.ctx.audio.has_device(device_id) {
            warn!("Output device '{}' is not known, selecting anyway", device_id);
        }
        self.ctx.audio.set_device(Some(device_id.to_string()));
        self.ctx.config.write().audio_device = Some(device_id.to_string());
        for channel in &self.channels {
            channel.select_output_device(device_id);
        }
        info!("Output device set to '{}'", device_id);
    }

    /// Ask the audio engine for its output devices and cache them
    ///
    /// Returns the number of devices.
    pub fn refresh_output_devices(&self) -> Result<usize, SwitchError> {
        let devices = self
            .channels
            .iter()
            .find_map(|c| c.output_devices())
            .ok_or(SwitchError::NoSink)?;
        let count = devices.len();
        if self.ctx.audio.set_devices(devices) {
            debug!("Output devices changed, {} available", count);
        }
        Ok(count)
    }

    /// Cached output devices
    pub fn output_devices(&self) -> Vec<OutputDevice> {
        self.ctx.audio.devices()
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Is any channel playing an ATIS stream?
    pub fn any_atis_playing(&self) -> bool {
        self.channels.iter().any(|c| c.is_playing_atis())
    }

    pub fn status(&self, channel: usize) -> Result<StreamStatus, SwitchError> {
        self.channels
            .get(channel)
            .map(|c| c.status())
            .ok_or(SwitchError::ChannelNotFound(channel))
    }

    /// Status overview of all channels
    pub fn summaries(&self) -> Vec<ChannelSummary> {
        self.channels
            .iter()
            .map(|c| ChannelSummary {
                channel: c.index(),
                frequency: c.frequency(),
                status: c.status(),
                stream: c.summary(),
                standby: c.displaced_summary(),
            })
            .collect()
    }
}
