//! Live link-layer state of an interface.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

/// An address assigned to a link, with its prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkAddress {
    /// The assigned address (IPv4 or IPv6).
    pub address: IpAddr,
    /// Prefix length of the on-link subnet.
    pub prefix_len: u8,
}

impl LinkAddress {
    /// Creates a link address.
    #[must_use]
    pub const fn new(address: IpAddr, prefix_len: u8) -> Self {
        Self {
            address,
            prefix_len,
        }
    }
}

/// Kernel-reported state of one interface at a point in time.
///
/// Produced fresh on every reconciliation and discarded afterwards; it is
/// evidence, never a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSnapshot {
    /// The interface the snapshot describes.
    pub interface_name: String,
    /// Addresses in the order the platform reports them.
    pub addresses: Vec<LinkAddress>,
    /// DHCP server that granted the current lease, when known.
    pub dhcp_server_address: Option<Ipv4Addr>,
    /// Gateways of default routes through this interface.
    pub default_route_gateways: Vec<Ipv4Addr>,
    /// DNS servers in use (may mix IPv4 and IPv6).
    pub dns_servers: Vec<IpAddr>,
}

impl LinkSnapshot {
    /// Creates an empty snapshot for the named interface.
    #[must_use]
    pub fn new(interface_name: impl Into<String>) -> Self {
        Self {
            interface_name: interface_name.into(),
            addresses: Vec::new(),
            dhcp_server_address: None,
            default_route_gateways: Vec::new(),
            dns_servers: Vec::new(),
        }
    }

    /// Adds an address.
    #[must_use]
    pub fn with_address(mut self, address: IpAddr, prefix_len: u8) -> Self {
        self.addresses.push(LinkAddress::new(address, prefix_len));
        self
    }

    /// Sets the DHCP server address.
    #[must_use]
    pub const fn with_dhcp_server(mut self, server: Ipv4Addr) -> Self {
        self.dhcp_server_address = Some(server);
        self
    }

    /// Adds a default-route gateway.
    #[must_use]
    pub fn with_default_route(mut self, gateway: Ipv4Addr) -> Self {
        self.default_route_gateways.push(gateway);
        self
    }

    /// Adds a DNS server.
    #[must_use]
    pub fn with_dns_server(mut self, server: IpAddr) -> Self {
        self.dns_servers.push(server);
        self
    }

    /// The gateway implied by a live lease.
    ///
    /// The DHCP server address wins; otherwise the first default route.
    #[must_use]
    pub fn lease_gateway(&self) -> Option<Ipv4Addr> {
        self.dhcp_server_address
            .or_else(|| self.default_route_gateways.first().copied())
    }

    /// DNS servers restricted to IPv4, in order.
    #[must_use]
    pub fn ipv4_dns_servers(&self) -> Vec<Ipv4Addr> {
        self.dns_servers
            .iter()
            .filter_map(|server| match server {
                IpAddr::V4(v4) => Some(*v4),
                IpAddr::V6(_) => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn lease_gateway_prefers_dhcp_server() {
        let snapshot = LinkSnapshot::new("eth0")
            .with_default_route(Ipv4Addr::new(10, 0, 0, 254))
            .with_dhcp_server(Ipv4Addr::new(10, 0, 0, 1));

        assert_eq!(snapshot.lease_gateway(), Some(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn lease_gateway_falls_back_to_first_default_route() {
        let snapshot = LinkSnapshot::new("eth0")
            .with_default_route(Ipv4Addr::new(10, 0, 0, 254))
            .with_default_route(Ipv4Addr::new(10, 0, 0, 253));

        assert_eq!(
            snapshot.lease_gateway(),
            Some(Ipv4Addr::new(10, 0, 0, 254))
        );
    }

    #[test]
    fn lease_gateway_none_without_evidence() {
        let snapshot = LinkSnapshot::new("eth0").with_address(ip("10.0.0.5"), 24);
        assert_eq!(snapshot.lease_gateway(), None);
    }

    #[test]
    fn ipv4_dns_servers_drops_ipv6() {
        let snapshot = LinkSnapshot::new("eth0")
            .with_dns_server(ip("2001:4860:4860::8888"))
            .with_dns_server(ip("8.8.8.8"))
            .with_dns_server(ip("1.1.1.1"));

        assert_eq!(
            snapshot.ipv4_dns_servers(),
            vec![Ipv4Addr::new(8, 8, 8, 8), Ipv4Addr::new(1, 1, 1, 1)]
        );
    }

    #[test]
    fn with_address_preserves_order() {
        let snapshot = LinkSnapshot::new("eth0")
            .with_address(ip("fe80::1"), 64)
            .with_address(ip("192.168.1.50"), 24);

        assert_eq!(snapshot.addresses[0].prefix_len, 64);
        assert_eq!(snapshot.addresses[1].address, ip("192.168.1.50"));
    }
}
