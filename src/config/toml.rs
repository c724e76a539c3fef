//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Configuration service section
    #[serde(default)]
    pub gateway: GatewaySection,

    /// Live link state sources
    #[serde(default)]
    pub link: LinkSection,

    /// Reachability probe configuration
    #[serde(default)]
    pub probe: ProbeSection,

    /// Monitoring configuration
    #[serde(default)]
    pub monitor: MonitorSection,
}

/// Configuration service section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    /// Profile store path (`~` is expanded)
    pub store: Option<String>,

    /// Addressing mode: "per-interface" or "legacy"
    pub addressing: Option<String>,

    /// Interfaces managed by the store
    #[serde(default)]
    pub interfaces: Vec<String>,
}

/// Live link state sources section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkSection {
    /// Resolver configuration
    pub resolv_conf: Option<String>,

    /// DHCP lease directory; empty string disables lease lookup
    pub lease_dir: Option<String>,
}

/// Reachability probe section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeSection {
    /// Probe host
    pub host: Option<String>,

    /// Probe TCP port
    pub port: Option<u16>,

    /// Connect timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

/// Monitoring configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorSection {
    /// Configuration polling interval in seconds
    pub config_interval: Option<u64>,

    /// Reachability polling interval in seconds
    pub probe_interval: Option<u64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# ethcfg Configuration File

[gateway]
# Profile store (default: <data dir>/ethcfg/profiles.json)
# store = "~/.local/share/ethcfg/profiles.json"

# Addressing mode: "per-interface" or "legacy" (one configuration for all)
# addressing = "per-interface"

# Interfaces managed by the store (empty = discover non-loopback interfaces)
# Note: CLI --manage values REPLACE these entirely (not merged)
# interfaces = ["eth0"]

[link]
# Resolver configuration (source of DNS servers)
# resolv_conf = "/etc/resolv.conf"

# DHCP lease directory (files named by interface index); "" disables
# lease_dir = "/run/systemd/netif/leases"

[probe]
# Host and port used to check internet reachability
# host = "www.google.com"
# port = 80

# Connect timeout in milliseconds (default: 2000)
# timeout_ms = 2000

[monitor]
# Configuration polling interval in seconds (default: 2)
config_interval = 2

# Reachability polling interval in seconds (default: 5)
probe_interval = 5
"#
    .to_string()
}
