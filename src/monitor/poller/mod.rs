//! Polling-based monitor.
//!
//! This module provides:
//! - [`PollingMonitor`]: Builder/configuration for polling-based monitoring
//! - [`PollingStream`]: Stream that yields sampled values as they change

mod monitor;
mod stream;

pub use monitor::PollingMonitor;
pub use stream::PollingStream;

#[cfg(test)]
mod stream_test;
