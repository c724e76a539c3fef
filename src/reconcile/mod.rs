//! Reconciliation of stored configuration with live link evidence.
//!
//! The platform may report `DHCP` or `UNASSIGNED` while the link shows a
//! live lease, or keep a stale record after the kernel renegotiated one.
//! For non-static interfaces the live link state is the ground truth; static
//! records are operator intent and are never rewritten from observation.

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

use std::fmt;

use crate::gateway::{Addressing, ConfigurationGateway, GatewayError};
use crate::network::{
    IpAssignment, IpConfiguration, Ipv4Cidr, LinkProvider, LinkSnapshot, StaticIpConfiguration,
};
use crate::validate::validate_ip;

/// The configuration to show for an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationState {
    /// The configuration in effect.
    Available(IpConfiguration),
    /// Nothing is known about the interface; not an error.
    Unavailable,
}

impl ConfigurationState {
    /// The configuration, if available.
    #[must_use]
    pub const fn configuration(&self) -> Option<&IpConfiguration> {
        match self {
            Self::Available(config) => Some(config),
            Self::Unavailable => None,
        }
    }

    /// Returns true if a configuration is available.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

impl From<Option<IpConfiguration>> for ConfigurationState {
    fn from(config: Option<IpConfiguration>) -> Self {
        config.map_or(Self::Unavailable, Self::Available)
    }
}

impl fmt::Display for ConfigurationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(config) => write!(f, "{config}"),
            Self::Unavailable => write!(f, "No configuration available"),
        }
    }
}

/// Merges gateway records with link snapshots.
///
/// # Type Parameters
///
/// * `G` - The [`ConfigurationGateway`] holding stored configurations
/// * `L` - The [`LinkProvider`] producing live snapshots
///
/// The gateway's [`Addressing`] capability is read once, at construction.
#[derive(Debug)]
pub struct Reconciler<G, L> {
    gateway: G,
    links: L,
    addressing: Addressing,
}

impl<G, L> Reconciler<G, L>
where
    G: ConfigurationGateway,
    L: LinkProvider,
{
    /// Creates a reconciler, resolving the gateway's addressing capability.
    pub fn new(gateway: G, links: L) -> Self {
        let addressing = gateway.addressing();
        tracing::debug!("Gateway addressing: {addressing}");
        Self {
            gateway,
            links,
            addressing,
        }
    }

    /// The addressing capability resolved at construction.
    #[must_use]
    pub const fn addressing(&self) -> Addressing {
        self.addressing
    }

    /// The underlying gateway.
    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Interfaces the gateway can configure.
    ///
    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub fn list_interfaces(&self) -> Result<Vec<String>, GatewayError> {
        self.gateway.list_interfaces()
    }

    /// Returns the configuration actually in effect on `interface`.
    ///
    /// 1. An `UNASSIGNED` record is written back as `DHCP` before anything else
    ///    runs. The read goes on with the original record, so without a lease
    ///    this first read still reports `UNASSIGNED`; later reads see `DHCP`.
    /// 2. `STATIC` records are returned unchanged without consulting the link.
    /// 3. Otherwise a live lease (DHCP server or default route) yields a `DHCP`
    ///    configuration describing the lease; without one the record is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if reading, or normalizing, the stored record fails.
    /// Link provider failures are logged and treated as "no lease".
    pub fn read_effective_configuration(
        &self,
        interface: &str,
    ) -> Result<ConfigurationState, GatewayError> {
        let target = self.addressing.target(interface);
        let Some(stored) = self.gateway.get_configuration(target)? else {
            tracing::debug!("No stored configuration for {interface}");
            return Ok(ConfigurationState::Unavailable);
        };

        if stored.assignment == IpAssignment::Unassigned {
            tracing::info!("Interface {interface} has no assignment mode, defaulting to DHCP");
            self.gateway.set_configuration(target, &IpConfiguration::dhcp())?;
        }

        if stored.is_static() {
            return Ok(ConfigurationState::Available(stored));
        }

        let snapshot = match self.links.snapshot(interface) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Link snapshot for {interface} unavailable: {e}");
                None
            }
        };

        Ok(ConfigurationState::Available(derive_effective(
            stored,
            snapshot.as_ref(),
        )))
    }

    /// Writes `config` for `interface` through the gateway.
    ///
    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub fn apply_configuration(
        &self,
        interface: &str,
        config: &IpConfiguration,
    ) -> Result<(), GatewayError> {
        tracing::info!("Setting {} configuration on {interface}", config.assignment);
        self.gateway
            .set_configuration(self.addressing.target(interface), config)
    }
}

/// Derives the configuration to display for a non-static record.
///
/// With a lease gateway in `snapshot`, returns `DHCP` plus a snapshot of the
/// first address passing [`validate_ip`], the gateway and the IPv4 DNS
/// servers. Otherwise returns `stored` unchanged.
#[must_use]
pub fn derive_effective(stored: IpConfiguration, snapshot: Option<&LinkSnapshot>) -> IpConfiguration {
    let Some(snapshot) = snapshot else {
        return stored;
    };
    let Some(gateway) = snapshot.lease_gateway() else {
        tracing::debug!(
            "No lease evidence on {}, keeping stored {} configuration",
            snapshot.interface_name,
            stored.assignment
        );
        return stored;
    };

    let ip_address = snapshot.addresses.iter().find_map(|link| {
        let address = validate_ip(&link.address.to_string()).ok()?;
        Ipv4Cidr::new(address, link.prefix_len).ok()
    });

    tracing::debug!(
        "Live lease on {} via {gateway}, reporting DHCP",
        snapshot.interface_name
    );
    IpConfiguration::dhcp_with_lease(StaticIpConfiguration::new(
        ip_address,
        gateway,
        snapshot.ipv4_dns_servers(),
    ))
}
