//! Live ATC Switching Core Types
//!
//! This crate provides the value types and collaborator traits shared by the
//! stream directory resolver and the channel state machine:
//!
//! - **Frequency**: a tuned radio frequency and its canonical `###.###` string
//! - **GeoPosition**: a geographic position with great-circle distance math
//! - **StreamCandidate / CandidateSet**: directory results for one query,
//!   keyed by origin (airport) code and merged by specificity
//! - **StreamStatus**: the ordered lifecycle status of a stream slot
//! - **AudioSink**: the command surface of an external audio engine
//! - **Cockpit / PositionProvider**: the host simulator's data-access layer
//!
//! # Example
//!
//! ```rust
//! use atc_core::{CandidateSet, Frequency, StreamCandidate};
//!
//! let freq = Frequency::from_khz(118_500);
//! assert_eq!(freq.to_string(), "118.500");
//!
//! let mut set = CandidateSet::new();
//! set.insert(StreamCandidate::new("KSFO", "KSFO Tower", "http://d.liveatc.net/ksfo_twr", 3));
//! set.insert(StreamCandidate::new("KSFO", "KSFO Tower Only", "http://d.liveatc.net/ksfo_twr2", 1));
//!
//! // The more specific stream wins
//! assert_eq!(set.get("KSFO").unwrap().specificity, 1);
//! ```

pub mod candidate;
pub mod cockpit;
pub mod error;
pub mod frequency;
pub mod position;
pub mod sink;
pub mod status;

pub use candidate::{CandidateSet, MergeOutcome, StreamCandidate};
pub use cockpit::{Cockpit, PositionProvider};
pub use error::SinkError;
pub use frequency::Frequency;
pub use position::{GeoPosition, METERS_PER_NM};
pub use sink::{AudioSink, OutputDevice};
pub use status::StreamStatus;
