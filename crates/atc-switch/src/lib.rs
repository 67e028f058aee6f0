//! Live ATC Stream Switching
//!
//! This crate follows the COM radios of a flight simulator and keeps a live
//! air traffic control stream playing for each tuned frequency.
//!
//! # Architecture
//!
//! - A [`Channel`] per radio owns two stream slots. On a frequency change the
//!   active stream moves aside while the new one is looked up, loaded and
//!   delayed to line up with the traffic feed ("desync").
//! - With pre-buffering enabled, the standby frequency is started muted in
//!   the displaced slot, so flipping the radio hands off without a gap.
//! - Every few ticks each stream is checked against the maximum reception
//!   distance and re-targeted when a closer stream for the frequency exists.
//! - The [`ChannelManager`] drives all channels once per tick and applies
//!   volume, mute and output device; [`run_switch_actor`] wraps it in a
//!   one-second loop fed by [`SwitchCommand`]s.
//!
//! Lookups run in background tasks, at most one per channel, cancelled as
//! soon as the frequency changes again.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use atc_directory::DirectoryClient;
//! use atc_sim::{VirtualCockpit, VirtualPositions, VirtualSink};
//! use atc_switch::{ChannelManager, SwitchConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = Arc::new(DirectoryClient::new()?);
//! let cockpit = Arc::new(VirtualCockpit::new(2));
//! let positions = Arc::new(VirtualPositions::new());
//!
//! let mut manager = ChannelManager::new(SwitchConfig::default(), resolver, cockpit, positions);
//! let (a, _) = VirtualSink::boxed("com1-a");
//! let (b, _) = VirtualSink::boxed("com1-b");
//! manager.add_channel(Some([a, b]));
//!
//! manager.tick().await;
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod audio;
pub mod channel;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod manager;
pub mod scheduler;
pub mod slot;
mod start;

// Re-export actor types
pub use actor::{run_switch_actor, SwitchCommand};

pub use audio::AudioService;
pub use channel::{Channel, TickInput};
pub use config::{SwitchConfig, COM_RADIOS};
pub use context::SwitchContext;
pub use error::SwitchError;
pub use events::SwitchEvent;
pub use manager::{ChannelManager, ChannelSummary};
pub use scheduler::TickScheduler;
pub use slot::{SharedSlot, StreamSlot};
