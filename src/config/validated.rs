//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::gateway::Addressing;
use crate::network::platform::LinkPaths;
use crate::probe::{ProbeTarget, ReachabilityProbe};

use super::cli::Cli;
use super::defaults;
use super::error::ConfigError;
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    /// Profile store path
    pub store_path: PathBuf,

    /// How the store addresses configurations
    pub addressing: Addressing,

    /// Interfaces managed by the store; empty means "discover"
    pub interfaces: Vec<String>,

    /// Live link state sources
    pub link_paths: LinkPaths,

    /// Reachability probe
    pub probe: ReachabilityProbe,

    /// Configuration polling interval
    pub config_interval: Duration,

    /// Reachability polling interval
    pub probe_interval: Duration,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interfaces = if self.interfaces.is_empty() {
            "discover".to_string()
        } else {
            self.interfaces.join(",")
        };

        write!(
            f,
            "Config {{ store: {}, addressing: {}, interfaces: {}, probe: {} ({}ms), \
             config_interval: {}s, probe_interval: {}s }}",
            self.store_path.display(),
            self.addressing,
            interfaces,
            self.probe.target(),
            self.probe.timeout().as_millis(),
            self.config_interval.as_secs(),
            self.probe_interval.as_secs(),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The addressing mode is unknown
    /// - An interface name is empty or malformed
    /// - The probe host is empty or the port is zero
    /// - Duration values are zero
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let store_path = Self::resolve_store_path(cli, toml);
        let addressing = Self::resolve_addressing(cli, toml)?;
        let interfaces = Self::resolve_interfaces(cli, toml)?;
        let link_paths = Self::resolve_link_paths(toml);
        let probe = Self::build_probe(cli, toml)?;

        // Priority: CLI explicit > TOML > default
        let config_interval = positive_secs(
            "config_interval",
            cli.config_interval
                .or_else(|| toml.and_then(|t| t.monitor.config_interval))
                .unwrap_or(defaults::CONFIG_INTERVAL_SECS),
        )?;
        let probe_interval = positive_secs(
            "probe_interval",
            cli.probe_interval
                .or_else(|| toml.and_then(|t| t.monitor.probe_interval))
                .unwrap_or(defaults::PROBE_INTERVAL_SECS),
        )?;

        Ok(Self {
            store_path,
            addressing,
            interfaces,
            link_paths,
            probe,
            config_interval,
            probe_interval,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_store_path(cli: &Cli, toml: Option<&TomlConfig>) -> PathBuf {
        if let Some(ref path) = cli.store {
            return path.clone();
        }

        toml.and_then(|t| t.gateway.store.as_deref())
            .map_or_else(defaults::store_path, expand_home)
    }

    fn resolve_addressing(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Addressing, ConfigError> {
        // Flag only enables legacy; it cannot force per-interface over TOML
        if cli.legacy_addressing {
            return Ok(Addressing::Legacy);
        }

        toml.and_then(|t| t.gateway.addressing.as_deref())
            .map_or(Ok(Addressing::default()), parse_addressing)
    }

    fn resolve_interfaces(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Vec<String>, ConfigError> {
        // CLI list replaces the TOML list entirely
        let names = if cli.managed_interfaces.is_empty() {
            toml.map(|t| t.gateway.interfaces.clone()).unwrap_or_default()
        } else {
            cli.managed_interfaces.clone()
        };

        let mut interfaces: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            validate_interface_name(&name)?;
            if !interfaces.contains(&name) {
                interfaces.push(name);
            }
        }
        Ok(interfaces)
    }

    fn resolve_link_paths(toml: Option<&TomlConfig>) -> LinkPaths {
        let mut paths = LinkPaths::default();
        let Some(link) = toml.map(|t| &t.link) else {
            return paths;
        };

        if let Some(ref resolv_conf) = link.resolv_conf {
            paths.resolv_conf = expand_home(resolv_conf);
        }
        if let Some(ref lease_dir) = link.lease_dir {
            paths.lease_dir = if lease_dir.is_empty() {
                None
            } else {
                Some(expand_home(lease_dir))
            };
        }
        paths
    }

    fn build_probe(cli: &Cli, toml: Option<&TomlConfig>) -> Result<ReachabilityProbe, ConfigError> {
        let probe = toml.map(|t| &t.probe);

        let host = cli
            .probe_host
            .as_deref()
            .or_else(|| probe.and_then(|p| p.host.as_deref()))
            .unwrap_or(defaults::PROBE_HOST)
            .trim();
        if host.is_empty() {
            return Err(ConfigError::InvalidProbeTarget {
                reason: "host must not be empty".to_string(),
            });
        }

        let port = cli
            .probe_port
            .or_else(|| probe.and_then(|p| p.port))
            .unwrap_or(defaults::PROBE_PORT);
        if port == 0 {
            return Err(ConfigError::InvalidProbeTarget {
                reason: "port must be greater than 0".to_string(),
            });
        }

        let timeout_ms = cli
            .probe_timeout
            .or_else(|| probe.and_then(|p| p.timeout_ms))
            .unwrap_or(defaults::PROBE_TIMEOUT_MS);
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "probe_timeout",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(ReachabilityProbe::new(
            ProbeTarget::new(host, port),
            Duration::from_millis(timeout_ms),
        ))
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn positive_secs(field: &'static str, seconds: u64) -> Result<Duration, ConfigError> {
    if seconds == 0 {
        return Err(ConfigError::InvalidDuration {
            field,
            reason: "must be greater than 0".to_string(),
        });
    }
    Ok(Duration::from_secs(seconds))
}

fn parse_addressing(s: &str) -> Result<Addressing, ConfigError> {
    match s.to_lowercase().as_str() {
        "per-interface" | "per_interface" | "interface" => Ok(Addressing::PerInterface),
        "legacy" | "single" => Ok(Addressing::Legacy),
        _ => Err(ConfigError::InvalidAddressing {
            value: s.to_string(),
        }),
    }
}

fn validate_interface_name(name: &str) -> Result<(), ConfigError> {
    let reason = if name.is_empty() {
        "must not be empty"
    } else if name.chars().any(char::is_whitespace) {
        "must not contain whitespace"
    } else if name.contains('/') {
        "must not contain '/'"
    } else {
        return Ok(());
    };

    Err(ConfigError::InvalidInterface {
        name: name.to_string(),
        reason,
    })
}

/// Expands a leading `~` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => &rest[1..],
        _ => return PathBuf::from(path),
    };

    dirs::home_dir().map_or_else(|| PathBuf::from(path), |home| home.join(rest))
}
