//! Platform link snapshot provider.
//!
//! # Platform Support
//!
//! - **Addresses**: all platforms, via the `network-interface` crate.
//! - **Default routes**: Linux, via an rtnetlink route dump.
//! - **DNS servers**: `resolv.conf` nameserver lines.
//! - **DHCP server**: systemd-networkd lease files (`SERVER_ADDRESS=`).
//!
//! Resolver and lease files that do not exist contribute nothing, so on
//! other platforms snapshots carry addresses only.

#[cfg(target_os = "linux")]
mod routes;

#[cfg(not(target_os = "linux"))]
mod routes {
    use std::net::Ipv4Addr;

    use crate::network::LinkError;

    /// No route source outside Linux.
    #[allow(clippy::unnecessary_wraps)]
    pub fn default_gateways(_index: u32) -> Result<Vec<Ipv4Addr>, LinkError> {
        Ok(Vec::new())
    }
}

mod system;

pub use system::{LinkPaths, SystemLinkProvider};

/// The provider used by the binary.
pub type PlatformProvider = SystemLinkProvider;
