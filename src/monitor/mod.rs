//! Monitor layer for watching configuration and reachability over time.
//!
//! This module provides:
//! - The [`Sampler`] abstraction over a blocking observation
//! - Concrete samplers ([`ConfigurationSampler`], [`ReachabilitySampler`])
//! - Polling-based monitoring ([`PollingMonitor`], [`PollingStream`])

mod poller;
mod sampler;

pub use poller::{PollingMonitor, PollingStream};
pub use sampler::{ConfigurationSampler, ReachabilitySampler, Sampler};
