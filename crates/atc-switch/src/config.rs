//! Switching configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Number of COM radios on a standard panel
pub const COM_RADIOS: usize = 2;

/// Settings of the stream switching core
///
/// Loading and saving is up to the host; every field falls back to its
/// default when missing from a serialized configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchConfig {
    /// Which radios are acted upon, indexed by channel (COM1, COM2, ...)
    pub act_on_channel: Vec<bool>,
    /// Only the radios selected on the audio panel are audible
    pub respect_audio_select: bool,
    /// Playback volume, 0..=100
    pub volume: u8,
    /// Output device id, `None` for the engine default
    pub audio_device: Option<String>,
    /// Add the external traffic feed's buffering delay to the desync period
    pub desync_with_feed_delay: bool,
    /// Manual desync adjustment in seconds (may be negative)
    pub desync_manual_s: i32,
    /// Keep the previous stream playing until the new one is past its desync wait
    pub continue_previous_while_desync: bool,
    /// Pre-buffer the standby frequency
    pub prebuffer_standby: bool,
    /// Play directory ATIS streams instead of the host's own ATIS
    pub prefer_directory_atis: bool,
    /// Maximum reception distance in nautical miles
    pub max_radio_distance_nm: f64,
    /// Run distance and pre-buffer maintenance every this many ticks
    pub maintenance_every_ticks: u32,
    /// Refresh the output device list every this many ticks
    pub device_refresh_every_ticks: u32,
    /// Extra seconds on the optimistic desync deadline for lookup and buffering
    pub countdown_pad_s: u64,
    /// How long to wait for real playback before applying the audio delay
    pub playback_settle_timeout_ms: u64,
    /// Poll interval while waiting for real playback
    pub playback_settle_poll_ms: u64,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            act_on_channel: vec![true; COM_RADIOS],
            respect_audio_select: false,
            volume: 100,
            audio_device: None,
            desync_with_feed_delay: true,
            desync_manual_s: -10,
            continue_previous_while_desync: true,
            prebuffer_standby: true,
            prefer_directory_atis: true,
            max_radio_distance_nm: 300.0,
            maintenance_every_ticks: 10,
            device_refresh_every_ticks: 60,
            countdown_pad_s: 1,
            playback_settle_timeout_ms: 5000,
            playback_settle_poll_ms: 250,
        }
    }
}

impl SwitchConfig {
    /// Desync period given the external feed's buffering delay
    ///
    /// Manual adjustment plus the feed delay (when enabled and reported),
    /// never negative.
    pub fn desync_period(&self, feed_buffer_period: Option<u32>) -> Duration {
        let mut secs = i64::from(self.desync_manual_s);
        if self.desync_with_feed_delay {
            if let Some(feed) = feed_buffer_period {
                secs += i64::from(feed);
            }
        }
        Duration::from_secs(secs.max(0) as u64)
    }

    /// Is the channel enabled? Channels beyond the configured list are not.
    pub fn acts_on(&self, channel: usize) -> bool {
        self.act_on_channel.get(channel).copied().unwrap_or(false)
    }

    pub fn countdown_pad(&self) -> Duration {
        Duration::from_secs(self.countdown_pad_s)
    }

    pub fn playback_settle_timeout(&self) -> Duration {
        Duration::from_millis(self.playback_settle_timeout_ms)
    }

    pub fn playback_settle_poll(&self) -> Duration {
        Duration::from_millis(self.playback_settle_poll_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desync_period() {
        let mut config = SwitchConfig::default();
        // -10s manual with a 60s feed delay
        assert_eq!(config.desync_period(Some(60)), Duration::from_secs(50));
        // no feed: clamped to zero
        assert_eq!(config.desync_period(None), Duration::ZERO);

        config.desync_with_feed_delay = false;
        config.desync_manual_s = 15;
        assert_eq!(config.desync_period(Some(60)), Duration::from_secs(15));
    }

    #[test]
    fn test_acts_on() {
        let config = SwitchConfig {
            act_on_channel: vec![true, false],
            ..Default::default()
        };
        assert!(config.acts_on(0));
        assert!(!config.acts_on(1));
        assert!(!config.acts_on(2));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SwitchConfig =
            serde_json::from_str(r#"{"volume": 40, "prebuffer_standby": false}"#).unwrap();
        assert_eq!(config.volume, 40);
        assert!(!config.prebuffer_standby);
        assert_eq!(config.max_radio_distance_nm, 300.0);
        assert_eq!(config.act_on_channel, vec![true, true]);
    }
}
