//! Samplers: blocking observations polled by a [`super::PollingMonitor`].

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use crate::gateway::{ConfigurationGateway, GatewayError};
use crate::network::LinkProvider;
use crate::probe::Prober;
use crate::reconcile::{ConfigurationState, Reconciler};

/// A blocking observation that can be repeated.
///
/// Samples run on the blocking thread pool, so implementations may perform
/// file, socket or platform-API I/O directly.
pub trait Sampler: Send + Sync + 'static {
    /// The observed value; consecutive equal values are collapsed.
    type Output: Clone + PartialEq + Send + 'static;

    /// Why a sample failed. Failures are logged and skipped.
    type Error: fmt::Display + Send + 'static;

    /// Takes one sample.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` when the observation could not be made.
    fn sample(&self) -> Result<Self::Output, Self::Error>;
}

/// Samples the effective configuration of one interface.
pub struct ConfigurationSampler<G, L> {
    reconciler: Arc<Reconciler<G, L>>,
    interface: String,
}

impl<G, L> ConfigurationSampler<G, L> {
    /// Creates a sampler for `interface`.
    #[must_use]
    pub fn new(reconciler: Arc<Reconciler<G, L>>, interface: impl Into<String>) -> Self {
        Self {
            reconciler,
            interface: interface.into(),
        }
    }

    /// The sampled interface.
    #[must_use]
    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl<G, L> Sampler for ConfigurationSampler<G, L>
where
    G: ConfigurationGateway + 'static,
    L: LinkProvider + 'static,
{
    type Output = ConfigurationState;
    type Error = GatewayError;

    fn sample(&self) -> Result<ConfigurationState, GatewayError> {
        self.reconciler.read_effective_configuration(&self.interface)
    }
}

/// Samples internet reachability.
#[derive(Debug, Clone)]
pub struct ReachabilitySampler<P> {
    prober: P,
}

impl<P> ReachabilitySampler<P> {
    /// Creates a sampler around `prober`.
    #[must_use]
    pub const fn new(prober: P) -> Self {
        Self { prober }
    }
}

impl<P: Prober + 'static> Sampler for ReachabilitySampler<P> {
    type Output = bool;
    type Error = Infallible;

    fn sample(&self) -> Result<bool, Infallible> {
        Ok(self.prober.is_internet_available())
    }
}
