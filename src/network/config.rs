//! IP configuration value types.
//!
//! These are the records exchanged with a [`crate::gateway::ConfigurationGateway`]
//! and produced by the reconciler. They are immutable values: a new
//! configuration always replaces the old one wholesale.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How an interface obtains its address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IpAssignment {
    /// Undefined; the platform never recorded a mode. Normalized to DHCP on read.
    Unassigned,
    /// Dynamic, lease-based addressing.
    Dhcp,
    /// Operator-specified addressing.
    Static,
}

impl fmt::Display for IpAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unassigned => write!(f, "UNASSIGNED"),
            Self::Dhcp => write!(f, "DHCP"),
            Self::Static => write!(f, "STATIC"),
        }
    }
}

/// Proxy mode attached to a configuration. Carried through, never interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProxySettings {
    /// No proxy mode recorded.
    #[default]
    Unassigned,
    /// Explicitly no proxy.
    None,
    /// Static host/port proxy.
    Static,
    /// Proxy auto-config script.
    Pac,
}

/// An IPv4 address together with its prefix length, written `a.b.c.d/n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Cidr {
    address: Ipv4Addr,
    prefix_len: u8,
}

/// Error returned when constructing an [`Ipv4Cidr`] with a prefix above 32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("prefix length {0} exceeds 32")]
pub struct PrefixTooLong(pub u8);

impl Ipv4Cidr {
    /// Largest prefix length for IPv4.
    pub const MAX_PREFIX_LEN: u8 = 32;

    /// Creates a CIDR value.
    ///
    /// # Errors
    ///
    /// Returns [`PrefixTooLong`] if `prefix_len` exceeds 32.
    pub const fn new(address: Ipv4Addr, prefix_len: u8) -> Result<Self, PrefixTooLong> {
        if prefix_len > Self::MAX_PREFIX_LEN {
            return Err(PrefixTooLong(prefix_len));
        }
        Ok(Self {
            address,
            prefix_len,
        })
    }

    /// The host address.
    #[must_use]
    pub const fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// The prefix length (0..=32).
    #[must_use]
    pub const fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// The subnet mask derived from the prefix length.
    #[must_use]
    pub const fn netmask(&self) -> Ipv4Addr {
        let bits = if self.prefix_len == 0 {
            0
        } else {
            u32::MAX << (32 - self.prefix_len as u32)
        };
        Ipv4Addr::from_bits(bits)
    }

    /// Returns true if `other` lies in the same subnet as this address.
    #[must_use]
    pub const fn contains(&self, other: Ipv4Addr) -> bool {
        let mask = self.netmask().to_bits();
        self.address.to_bits() & mask == other.to_bits() & mask
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = crate::validate::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::validate::validate_ip_with_mask(s)
    }
}

impl Serialize for Ipv4Cidr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ipv4Cidr {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Address, gateway and DNS servers of an interface.
///
/// Either an operator-specified static configuration, or an informational
/// snapshot of a live DHCP lease reused for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticIpConfiguration {
    /// Address with prefix. `None` only in a DHCP snapshot whose link carried
    /// no valid IPv4 address.
    pub ip_address: Option<Ipv4Cidr>,
    /// Next hop for general traffic.
    pub gateway: Ipv4Addr,
    /// DNS servers in resolution order.
    #[serde(default)]
    pub dns_servers: Vec<Ipv4Addr>,
    /// Search domains.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<String>,
}

impl StaticIpConfiguration {
    /// Creates a static configuration.
    #[must_use]
    pub const fn new(
        ip_address: Option<Ipv4Cidr>,
        gateway: Ipv4Addr,
        dns_servers: Vec<Ipv4Addr>,
    ) -> Self {
        Self {
            ip_address,
            gateway,
            dns_servers,
            domains: None,
        }
    }

    /// Returns true if address, gateway and at least one DNS server are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.ip_address.is_some() && !self.dns_servers.is_empty()
    }

    /// DNS servers joined with `", "`, the format accepted back by the DNS validator.
    #[must_use]
    pub fn dns_list(&self) -> String {
        self.dns_servers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A complete interface configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpConfiguration {
    /// Addressing mode.
    pub assignment: IpAssignment,
    /// Static parameters, or a DHCP snapshot.
    #[serde(default, rename = "staticIpConfiguration")]
    pub static_config: Option<StaticIpConfiguration>,
    /// Proxy mode (placeholder).
    #[serde(default)]
    pub proxy_settings: ProxySettings,
    /// HTTP proxy (placeholder).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_proxy: Option<String>,
}

impl IpConfiguration {
    fn with_assignment(
        assignment: IpAssignment,
        static_config: Option<StaticIpConfiguration>,
    ) -> Self {
        Self {
            assignment,
            static_config,
            proxy_settings: ProxySettings::Unassigned,
            http_proxy: None,
        }
    }

    /// A configuration with no recorded mode.
    #[must_use]
    pub const fn unassigned() -> Self {
        Self {
            assignment: IpAssignment::Unassigned,
            static_config: None,
            proxy_settings: ProxySettings::Unassigned,
            http_proxy: None,
        }
    }

    /// A plain DHCP configuration.
    #[must_use]
    pub fn dhcp() -> Self {
        Self::with_assignment(IpAssignment::Dhcp, None)
    }

    /// A DHCP configuration carrying an informational lease snapshot.
    #[must_use]
    pub fn dhcp_with_lease(snapshot: StaticIpConfiguration) -> Self {
        Self::with_assignment(IpAssignment::Dhcp, Some(snapshot))
    }

    /// A static configuration.
    ///
    /// Completeness is not checked here; user input goes through
    /// [`crate::validate::validate_static_form`].
    #[must_use]
    pub fn static_ip(config: StaticIpConfiguration) -> Self {
        Self::with_assignment(IpAssignment::Static, Some(config))
    }

    /// Returns true for `STATIC` assignment.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        matches!(self.assignment, IpAssignment::Static)
    }

    /// Returns the value suitable for writing back through a gateway.
    ///
    /// DHCP lease snapshots are dropped, and a static record missing its
    /// address or DNS servers is rejected with `None`.
    #[must_use]
    pub fn submittable(&self) -> Option<Self> {
        match self.assignment {
            IpAssignment::Dhcp | IpAssignment::Unassigned => {
                Some(Self::with_assignment(self.assignment, None))
            }
            IpAssignment::Static => self
                .static_config
                .as_ref()
                .filter(|config| config.is_complete())
                .map(|_| self.clone()),
        }
    }
}

impl fmt::Display for IpConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.assignment)?;
        if let Some(config) = &self.static_config {
            match config.ip_address {
                Some(address) => writeln!(f, "{address}")?,
                None => writeln!(f, "N/A")?,
            }
            writeln!(f, "{}", config.gateway)?;
            write!(f, "{}", config.dns_list())?;
        }
        Ok(())
    }
}
