//! Configuration gateway: the privileged collaborator that reads and writes
//! OS-level interface configuration.
//!
//! The core never mutates the network stack itself. It talks to an
//! implementation of [`ConfigurationGateway`], which a vendor SDK, a system
//! daemon or the bundled [`FileGateway`] can provide.

mod file;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use file::FileGateway;

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::IpConfiguration;

/// How a gateway addresses configurations.
///
/// Resolved once when the reconciler is built; the core passes an explicit
/// `Option<&str>` interface argument derived from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Addressing {
    /// Each interface has its own configuration.
    #[default]
    PerInterface,
    /// A single configuration applies to the platform's only managed interface.
    Legacy,
}

impl Addressing {
    /// The interface argument to pass for `interface` under this capability.
    #[must_use]
    pub const fn target<'a>(self, interface: &'a str) -> Option<&'a str> {
        match self {
            Self::PerInterface => Some(interface),
            Self::Legacy => None,
        }
    }
}

impl fmt::Display for Addressing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerInterface => write!(f, "per-interface"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

/// Errors reported by a configuration gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The platform refused access to the privileged configuration API.
    #[error("Access to the configuration service was denied: {context}")]
    AccessDenied {
        /// What was being accessed.
        context: String,
    },

    /// The named interface is not managed by the gateway.
    #[error("Interface '{interface}' is not managed by the configuration service")]
    InterfaceNotFound {
        /// The requested interface.
        interface: String,
    },

    /// Reading or writing the backing store failed.
    #[error("Configuration store error: {0}")]
    Store(#[source] io::Error),

    /// The backing store could not be encoded or decoded.
    #[error("Configuration store is malformed: {0}")]
    Format(#[source] serde_json::Error),

    /// The configuration was rejected as incomplete.
    #[error("Configuration rejected: {reason}")]
    Rejected {
        /// Why it was rejected.
        reason: String,
    },

    /// Platform-specific failure.
    #[error("Platform error: {message}")]
    Platform {
        /// Error message describing the platform-specific failure.
        message: String,
    },
}

impl GatewayError {
    /// Returns true if the failure means the gateway is unusable altogether.
    #[must_use]
    pub const fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}

/// The privileged configuration service.
///
/// # Contract
///
/// - `interface` is `Some` under [`Addressing::PerInterface`] and `None` under
///   [`Addressing::Legacy`]; callers obtain it from [`Addressing::target`]
/// - Calls block; callers run them off latency-sensitive threads
/// - Concurrent writes to the same interface are not serialized here
pub trait ConfigurationGateway: Send + Sync {
    /// The addressing capability of this gateway.
    fn addressing(&self) -> Addressing;

    /// Interfaces the gateway can configure. May be empty.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AccessDenied`] when the platform restricts the
    /// API, or another variant for store/platform failures.
    fn list_interfaces(&self) -> Result<Vec<String>, GatewayError>;

    /// The stored configuration, or `None` if nothing is known.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the store cannot be read.
    fn get_configuration(
        &self,
        interface: Option<&str>,
    ) -> Result<Option<IpConfiguration>, GatewayError>;

    /// Replaces the stored configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the configuration cannot be written.
    fn set_configuration(
        &self,
        interface: Option<&str>,
        config: &IpConfiguration,
    ) -> Result<(), GatewayError>;
}

impl<T: ConfigurationGateway + ?Sized> ConfigurationGateway for std::sync::Arc<T> {
    fn addressing(&self) -> Addressing {
        (**self).addressing()
    }

    fn list_interfaces(&self) -> Result<Vec<String>, GatewayError> {
        (**self).list_interfaces()
    }

    fn get_configuration(
        &self,
        interface: Option<&str>,
    ) -> Result<Option<IpConfiguration>, GatewayError> {
        (**self).get_configuration(interface)
    }

    fn set_configuration(
        &self,
        interface: Option<&str>,
        config: &IpConfiguration,
    ) -> Result<(), GatewayError> {
        (**self).set_configuration(interface, config)
    }
}
