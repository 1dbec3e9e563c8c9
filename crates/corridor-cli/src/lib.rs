//! Corridor CLI - replay and export tools for route corridors.
//!
//! - `config`: environment driven replay settings
//! - `replay`: feeds recorded position polls through per-entity followers

pub mod config;
pub mod replay;

pub use config::Config;
pub use replay::{EntitySummary, Poll, Replay};
