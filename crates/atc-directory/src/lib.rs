//! Live ATC Stream Directory
//!
//! This crate turns a tuned frequency into a set of live stream candidates
//! and picks the one to play.
//!
//! # Architecture
//!
//! - [`StreamResolver`] is the lookup seam used by the channel state machine.
//!   [`DirectoryClient`] implements it over HTTP: one search request per
//!   frequency, parsed by [`ListingParser`], plus a one-hop playlist
//!   follow-up for `.pls` references.
//! - [`select_closest`] chooses among candidates by great-circle distance
//!   from the listener, bounded by a maximum reception distance.
//!
//! Network failures surface as [`ResolveError`]; unreadable listing entries
//! are skipped and reported as [`ParseAnomaly`] warnings.

pub mod client;
pub mod config;
pub mod error;
pub mod listing;
pub mod resolver;
pub mod select;

pub use client::{ClientBuilder, DirectoryClient};
pub use config::DirectoryConfig;
pub use error::{ParseAnomaly, ResolveError};
pub use listing::{ListingParse, ListingParser};
pub use resolver::StreamResolver;
pub use select::{select_closest, within_reach};
