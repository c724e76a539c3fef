//! Polling monitor configuration.
//!
//! This module provides [`PollingMonitor`], the builder/configuration struct
//! for creating polling-based monitors.

use super::super::Sampler;
use super::stream::PollingStream;
use std::time::Duration;

/// Polling-based monitor.
///
/// Periodically takes a sample and emits it as a stream item whenever it
/// differs from the previous one.
///
/// # Type Parameters
///
/// * `S` - The [`Sampler`] implementation producing observations
///
/// # Example
///
/// ```ignore
/// use ethcfg::monitor::{PollingMonitor, ReachabilitySampler};
/// use ethcfg::probe::ReachabilityProbe;
/// use std::time::Duration;
///
/// let sampler = ReachabilitySampler::new(ReachabilityProbe::default());
/// let monitor = PollingMonitor::new(sampler, Duration::from_secs(5));
///
/// let mut stream = monitor.into_stream();
/// while let Some(online) = stream.next().await {
///     println!("online: {online}");
/// }
/// ```
pub struct PollingMonitor<S> {
    sampler: S,
    interval: Duration,
}

impl<S> PollingMonitor<S>
where
    S: Sampler,
{
    /// Creates a new polling monitor.
    ///
    /// # Arguments
    ///
    /// * `sampler` - The observation to repeat
    /// * `interval` - The interval between samples
    #[must_use]
    pub const fn new(sampler: S, interval: Duration) -> Self {
        Self { sampler, interval }
    }

    /// Returns the configured polling interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the sampler.
    #[must_use]
    pub const fn sampler(&self) -> &S {
        &self.sampler
    }

    /// Converts this monitor into a stream of changed samples.
    ///
    /// The first successful sample is always yielded. The stream never
    /// terminates on its own; stop polling it (for example by selecting on
    /// a shutdown signal) to stop monitoring.
    ///
    /// Must be polled from within a Tokio runtime.
    #[must_use]
    pub fn into_stream(self) -> PollingStream<S> {
        PollingStream::new(self.sampler, self.interval)
    }
}
