//! Live ATC Switching Simulation Library
//!
//! This crate provides a simulation layer for exercising the channel state
//! machine without a flight simulator, network access or audio engine:
//!
//! - **VirtualSink / SinkProbe**: a media player that records commands
//! - **VirtualCockpit**: COM radio panel with active/standby knobs
//! - **VirtualPositions**: listener position and airport gazetteer
//! - **ScriptedDirectory**: canned directory listings with delays and failures
//!
//! # Example
//!
//! ```rust
//! use atc_core::{AudioSink, Cockpit};
//! use atc_sim::{VirtualCockpit, VirtualSink};
//!
//! let cockpit = VirtualCockpit::new(2);
//! cockpit.tune(0, 118_500);
//! assert_eq!(cockpit.tuned_frequency(0), 118_500);
//!
//! let (mut sink, probe) = VirtualSink::new("COM1/A");
//! sink.load("http://d.liveatc.net/ksfo_twr").unwrap();
//! assert!(sink.play());
//! assert!(probe.is_playing());
//! ```

pub mod cockpit;
pub mod directory;
pub mod sink;

pub use cockpit::{VirtualCockpit, VirtualPositions};
pub use directory::ScriptedDirectory;
pub use sink::{SinkCommand, SinkProbe, VirtualSink};
