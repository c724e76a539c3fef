//! Internet reachability probe.
//!
//! A single TCP connection attempt against a well-known host. Any failure,
//! whether name resolution, refusal or timeout, means "not reachable".

use std::fmt;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::defaults;

/// Host and port the probe connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    /// Hostname or literal address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl ProbeTarget {
    /// Creates a target.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    fn first_address(&self) -> std::io::Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} resolved to no addresses", self.host),
                )
            })
    }
}

impl Default for ProbeTarget {
    fn default() -> Self {
        Self::new(defaults::PROBE_HOST, defaults::PROBE_PORT)
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Answers whether the internet is reachable.
///
/// Implementations block for at most their configured timeout (plus name
/// resolution) and never fail; errors collapse to `false`.
pub trait Prober: Send + Sync {
    /// Returns true if a probe connection succeeded.
    fn is_internet_available(&self) -> bool;
}

impl<T: Prober + ?Sized> Prober for std::sync::Arc<T> {
    fn is_internet_available(&self) -> bool {
        (**self).is_internet_available()
    }
}

/// TCP connect probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachabilityProbe {
    target: ProbeTarget,
    timeout: Duration,
}

impl ReachabilityProbe {
    /// Creates a probe for `target` with a connect timeout.
    #[must_use]
    pub const fn new(target: ProbeTarget, timeout: Duration) -> Self {
        Self { target, timeout }
    }

    /// The probe target.
    #[must_use]
    pub const fn target(&self) -> &ProbeTarget {
        &self.target
    }

    /// The connect timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn connect(&self) -> std::io::Result<()> {
        let address = self.target.first_address()?;
        // Dropping the stream closes the socket.
        TcpStream::connect_timeout(&address, self.timeout).map(drop)
    }
}

impl Default for ReachabilityProbe {
    fn default() -> Self {
        Self::new(
            ProbeTarget::default(),
            Duration::from_millis(defaults::PROBE_TIMEOUT_MS),
        )
    }
}

impl Prober for ReachabilityProbe {
    fn is_internet_available(&self) -> bool {
        match self.connect() {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Probe to {} failed: {e}", self.target);
                false
            }
        }
    }
}
