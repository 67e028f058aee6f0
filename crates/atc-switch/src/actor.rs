//! Switching Actor
//!
//! This module provides the async actor that owns the [`ChannelManager`] and
//! drives it once per second. User-level commands (volume, mute, output
//! device, configuration) reach the manager through a command channel, so
//! the host never touches channel state directly.
//!
//! # Architecture
//!
//! The actor receives commands through an mpsc channel and runs the manager
//! tick on a one-second interval. Events are published on the manager's
//! broadcast channel; subscribe before spawning the actor.
//!
//! # Example
//!
//! ```rust,ignore
//! use atc_switch::{run_switch_actor, ChannelManager, SwitchCommand, SwitchConfig};
//! use tokio::sync::mpsc;
//!
//! let mut manager = ChannelManager::new(SwitchConfig::default(), resolver, cockpit, positions);
//! manager.add_channel(Some([sink_a, sink_b]));
//! let mut events = manager.subscribe();
//!
//! let (cmd_tx, cmd_rx) = mpsc::channel(32);
//! tokio::spawn(run_switch_actor(manager, cmd_rx));
//!
//! cmd_tx.send(SwitchCommand::SetVolume { volume: 60 }).await?;
//! ```

use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use atc_core::OutputDevice;

use crate::config::SwitchConfig;
use crate::manager::{ChannelManager, ChannelSummary};

/// Commands sent to the switching actor
#[derive(Debug)]
pub enum SwitchCommand {
    /// Set the playback volume of all channels (0..=100)
    SetVolume {
        volume: u8,
    },

    /// Mute or unmute all channels
    Mute {
        mute: bool,
    },

    /// Route all channels to an output device
    SelectOutputDevice {
        device_id: String,
    },

    /// Enable or disable acting on a radio
    SetActOnChannel {
        /// Zero-based radio index
        channel: usize,
        enabled: bool,
    },

    /// Replace the configuration
    UpdateConfig {
        config: Box<SwitchConfig>,
    },

    /// Query the status of all channels
    QueryStatus {
        response: oneshot::Sender<Vec<ChannelSummary>>,
    },

    /// Query the cached output devices
    QueryOutputDevices {
        response: oneshot::Sender<Vec<OutputDevice>>,
    },

    /// Stop all streams and exit
    Shutdown,
}

/// Run the switching actor
///
/// Ticks the manager every second until [`SwitchCommand::Shutdown`] is
/// received or all command senders are dropped, then stops every stream.
pub async fn run_switch_actor(
    mut manager: ChannelManager,
    mut cmd_rx: mpsc::Receiver<SwitchCommand>,
) {
    info!(
        "Switching actor started with {} channel(s)",
        manager.len()
    );

    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else { break; };
                match cmd {
                    SwitchCommand::SetVolume { volume } => {
                        debug!("Volume set to {}", volume);
                        manager.set_all_volume(volume);
                    }

                    SwitchCommand::Mute { mute } => {
                        info!("{}", if mute { "Muted" } else { "Unmuted" });
                        manager.mute_all(mute);
                    }

                    SwitchCommand::SelectOutputDevice { device_id } => {
                        manager.set_output_device(&device_id);
                    }

                    SwitchCommand::SetActOnChannel { channel, enabled } => {
                        if let Err(e) = manager.set_act_on_channel(channel, enabled) {
                            warn!("Cannot change channel: {}", e);
                        }
                    }

                    SwitchCommand::UpdateConfig { config } => {
                        manager.update_config(*config);
                    }

                    SwitchCommand::QueryStatus { response } => {
                        let _ = response.send(manager.summaries());
                    }

                    SwitchCommand::QueryOutputDevices { response } => {
                        let _ = response.send(manager.output_devices());
                    }

                    SwitchCommand::Shutdown => {
                        info!("Switching actor shutting down");
                        break;
                    }
                }
            }

            _ = ticker.tick() => {
                manager.tick().await;
            }
        }
    }

    manager.shutdown().await;
    info!("Switching actor stopped");
}
