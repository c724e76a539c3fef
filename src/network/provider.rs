//! Link snapshot provider trait and error types.

use super::LinkSnapshot;
use thiserror::Error;

/// Error type for link snapshot operations.
///
/// Describes what went wrong without dictating recovery strategy.
/// The reconciler treats every variant as "no live evidence".
#[derive(Debug, Error)]
pub enum LinkError {
    /// Reading a kernel or resolver file failed.
    #[error("Failed to read '{path}': {source}")]
    Read {
        /// The file that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Permission denied to access network information.
    #[error("Permission denied: {context}")]
    PermissionDenied {
        /// Additional context about what permission was denied.
        context: String,
    },

    /// Platform-specific error with a generic message.
    #[error("Platform error: {message}")]
    Platform {
        /// Error message describing the platform-specific failure.
        message: String,
    },
}

/// Trait for taking live snapshots of network interfaces.
///
/// # Design
///
/// - The OS network-state boundary; injected into the reconciler
/// - Enables testing with scripted snapshots
/// - Platform-specific implementations provided in [`super::platform`]
///
/// # Example
///
/// ```ignore
/// use ethcfg::network::{LinkProvider, LinkSnapshot, LinkError};
///
/// struct FixedLinks(Vec<LinkSnapshot>);
///
/// impl LinkProvider for FixedLinks {
///     fn interface_names(&self) -> Result<Vec<String>, LinkError> {
///         Ok(self.0.iter().map(|s| s.interface_name.clone()).collect())
///     }
///
///     fn snapshot(&self, interface: &str) -> Result<Option<LinkSnapshot>, LinkError> {
///         Ok(self.0.iter().find(|s| s.interface_name == interface).cloned())
///     }
/// }
/// ```
pub trait LinkProvider: Send + Sync {
    /// Names of the interfaces currently known to the OS.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError`] when the interface table cannot be read.
    fn interface_names(&self) -> Result<Vec<String>, LinkError>;

    /// Takes a fresh snapshot of one interface.
    ///
    /// Returns `Ok(None)` when the interface is absent from the live network
    /// list (link down, removed, or never present).
    ///
    /// # Errors
    ///
    /// Returns [`LinkError`] when:
    /// - A kernel or resolver file cannot be read (`LinkError::Read`)
    /// - Access to network information is denied (`LinkError::PermissionDenied`)
    /// - Other platform-specific failures (`LinkError::Platform`)
    ///
    /// # Implementation Notes
    ///
    /// - Snapshots must not be cached; each call reflects current state
    /// - Address order should be stable across calls
    /// - This is a synchronous operation; callers move it off latency-sensitive threads
    fn snapshot(&self, interface: &str) -> Result<Option<LinkSnapshot>, LinkError>;
}

impl<T: LinkProvider + ?Sized> LinkProvider for std::sync::Arc<T> {
    fn interface_names(&self) -> Result<Vec<String>, LinkError> {
        (**self).interface_names()
    }

    fn snapshot(&self, interface: &str) -> Result<Option<LinkSnapshot>, LinkError> {
        (**self).snapshot(interface)
    }
}
