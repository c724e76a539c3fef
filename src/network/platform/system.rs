//! OS-backed [`LinkProvider`] implementation.

use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use network_interface::{Addr, NetworkInterface, NetworkInterfaceConfig};

use super::routes;
use crate::config::defaults;
use crate::network::{LinkError, LinkProvider, LinkSnapshot};

/// Locations of the files a snapshot is assembled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPaths {
    /// Resolver configuration.
    pub resolv_conf: PathBuf,
    /// Directory of DHCP lease files named by interface index.
    pub lease_dir: Option<PathBuf>,
}

impl Default for LinkPaths {
    fn default() -> Self {
        Self {
            resolv_conf: PathBuf::from(defaults::RESOLV_CONF),
            lease_dir: Some(PathBuf::from(defaults::LEASE_DIR)),
        }
    }
}

/// Snapshots interfaces from live OS state.
#[derive(Debug, Clone, Default)]
pub struct SystemLinkProvider {
    paths: LinkPaths,
}

impl SystemLinkProvider {
    /// Creates a provider reading from the given locations.
    #[must_use]
    pub const fn new(paths: LinkPaths) -> Self {
        Self { paths }
    }

    /// Returns the configured file locations.
    #[must_use]
    pub const fn paths(&self) -> &LinkPaths {
        &self.paths
    }

    fn interfaces() -> Result<Vec<NetworkInterface>, LinkError> {
        NetworkInterface::show().map_err(|e| LinkError::Platform {
            message: format!("interface enumeration failed: {e}"),
        })
    }

    fn lease_server(&self, index: u32) -> Result<Option<Ipv4Addr>, LinkError> {
        let Some(dir) = &self.paths.lease_dir else {
            return Ok(None);
        };
        let content = read_optional(&dir.join(index.to_string()))?;
        Ok(content.as_deref().and_then(parse_lease_server))
    }
}

impl LinkProvider for SystemLinkProvider {
    fn interface_names(&self) -> Result<Vec<String>, LinkError> {
        let mut names: Vec<String> = Vec::new();
        // Entries repeat per address on some platforms.
        for interface in Self::interfaces()? {
            if !names.contains(&interface.name) {
                names.push(interface.name);
            }
        }
        Ok(names)
    }

    fn snapshot(&self, interface: &str) -> Result<Option<LinkSnapshot>, LinkError> {
        let entries: Vec<NetworkInterface> = Self::interfaces()?
            .into_iter()
            .filter(|entry| entry.name == interface)
            .collect();

        let Some(first) = entries.first() else {
            tracing::debug!("Interface {interface} absent from live network list");
            return Ok(None);
        };
        let index = first.index;

        let mut snapshot = LinkSnapshot::new(interface);
        for addr in entries.iter().flat_map(|entry| entry.addr.iter()) {
            let (address, prefix_len) = address_with_prefix(addr);
            snapshot = snapshot.with_address(address, prefix_len);
        }

        match routes::default_gateways(index) {
            Ok(gateways) => snapshot.default_route_gateways = gateways,
            Err(e) => tracing::warn!("Default routes unavailable for {interface}: {e}"),
        }
        if let Some(resolv) = read_optional(&self.paths.resolv_conf)? {
            snapshot.dns_servers = parse_nameservers(&resolv);
        }
        snapshot.dhcp_server_address = self.lease_server(index)?;

        tracing::debug!(
            "Link snapshot for {interface}: {} address(es), dhcp server {:?}, {} default route(s)",
            snapshot.addresses.len(),
            snapshot.dhcp_server_address,
            snapshot.default_route_gateways.len(),
        );
        Ok(Some(snapshot))
    }
}

fn address_with_prefix(addr: &Addr) -> (IpAddr, u8) {
    match addr {
        Addr::V4(v4) => {
            let prefix = v4.netmask.map_or(32, |mask| mask.to_bits().count_ones());
            (IpAddr::V4(v4.ip), prefix_to_u8(prefix))
        }
        Addr::V6(v6) => {
            let prefix = v6.netmask.map_or(128, |mask| mask.to_bits().count_ones());
            (IpAddr::V6(v6.ip), prefix_to_u8(prefix))
        }
    }
}

fn prefix_to_u8(bits: u32) -> u8 {
    // count_ones of a u128 is at most 128
    u8::try_from(bits).unwrap_or(u8::MAX)
}

/// Reads a file, treating a missing file as "no data".
fn read_optional(path: &Path) -> Result<Option<String>, LinkError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(LinkError::PermissionDenied {
            context: path.display().to_string(),
        }),
        Err(e) => Err(LinkError::Read {
            path: path.display().to_string(),
            source: e,
        }),
    }
}

/// Extracts `nameserver` entries from a resolver configuration.
fn parse_nameservers(content: &str) -> Vec<IpAddr> {
    content
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            if parts.next()? != "nameserver" {
                return None;
            }
            // Scoped IPv6 (fe80::1%eth0) does not parse and is skipped.
            parts.next()?.parse().ok()
        })
        .collect()
}

/// Extracts the DHCP server from a systemd-networkd lease file.
fn parse_lease_server(content: &str) -> Option<Ipv4Addr> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("SERVER_ADDRESS="))
        .and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod nameservers {
        use super::*;

        #[test]
        fn collects_ipv4_and_ipv6_in_order() {
            let resolv = "# generated\nsearch lan\nnameserver 192.168.1.1\nnameserver 2001:db8::53\n";
            assert_eq!(
                parse_nameservers(resolv),
                vec![
                    "192.168.1.1".parse::<IpAddr>().unwrap(),
                    "2001:db8::53".parse::<IpAddr>().unwrap(),
                ]
            );
        }

        #[test]
        fn skips_unparsable_entries() {
            let resolv = "nameserver fe80::1%eth0\nnameserver\nnameserver 8.8.8.8\n";
            assert_eq!(
                parse_nameservers(resolv),
                vec!["8.8.8.8".parse::<IpAddr>().unwrap()]
            );
        }
    }

    mod lease {
        use super::*;

        #[test]
        fn reads_server_address() {
            let lease = "# This is private data.\nADDRESS=192.168.1.50\nSERVER_ADDRESS=192.168.1.1\n";
            assert_eq!(
                parse_lease_server(lease),
                Some(Ipv4Addr::new(192, 168, 1, 1))
            );
        }

        #[test]
        fn none_without_server_line() {
            assert_eq!(parse_lease_server("ADDRESS=192.168.1.50\n"), None);
        }
    }

    mod files {
        use super::*;
        use tempfile::TempDir;

        #[test]
        fn missing_file_reads_as_none() {
            let dir = TempDir::new().unwrap();
            let result = read_optional(&dir.path().join("absent")).unwrap();
            assert!(result.is_none());
        }

        #[test]
        fn lease_server_reads_file_named_by_index() {
            let dir = TempDir::new().unwrap();
            std::fs::write(dir.path().join("3"), "SERVER_ADDRESS=10.0.0.1\n").unwrap();
            let provider = SystemLinkProvider::new(LinkPaths {
                lease_dir: Some(dir.path().to_path_buf()),
                ..LinkPaths::default()
            });

            assert_eq!(
                provider.lease_server(3).unwrap(),
                Some(Ipv4Addr::new(10, 0, 0, 1))
            );
            assert_eq!(provider.lease_server(4).unwrap(), None);
        }

        #[test]
        fn no_lease_dir_means_no_server() {
            let provider = SystemLinkProvider::new(LinkPaths {
                lease_dir: None,
                ..LinkPaths::default()
            });
            assert_eq!(provider.lease_server(1).unwrap(), None);
        }

        #[test]
        fn unknown_interface_has_no_snapshot() {
            let provider = SystemLinkProvider::default();
            let result = provider.snapshot("ethcfg-test-absent0").unwrap();
            assert!(result.is_none());
        }
    }
}
