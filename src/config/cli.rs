//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ethcfg: Ethernet configuration manager
///
/// Shows the configuration actually in effect on Ethernet interfaces,
/// validates and applies static or DHCP settings, and watches
/// configuration and internet reachability.
#[derive(Debug, Parser)]
#[command(name = "ethcfg")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run (default: watch the first interface)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the profile store
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Interface managed by the profile store (can be specified multiple times)
    #[arg(long = "manage", value_name = "NAME", global = true)]
    pub managed_interfaces: Vec<String>,

    /// Store a single configuration for all interfaces
    #[arg(long = "legacy-addressing", global = true)]
    pub legacy_addressing: bool,

    /// Host the reachability probe connects to
    #[arg(long = "probe-host", global = true)]
    pub probe_host: Option<String>,

    /// TCP port the reachability probe connects to
    #[arg(long = "probe-port", global = true)]
    pub probe_port: Option<u16>,

    /// Reachability probe timeout in milliseconds
    #[arg(long = "probe-timeout", value_name = "MS", global = true)]
    pub probe_timeout: Option<u64>,

    /// Configuration polling interval in seconds
    #[arg(long = "config-interval", global = true)]
    pub config_interval: Option<u64>,

    /// Reachability polling interval in seconds
    #[arg(long = "probe-interval", global = true)]
    pub probe_interval: Option<u64>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for ethcfg
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "ethcfg.toml")]
        output: PathBuf,
    },

    /// List configurable interfaces
    List,

    /// Show the configuration in effect on an interface
    Show {
        /// Interface name (default: first available)
        interface: Option<String>,
    },

    /// Apply a DHCP or static configuration to an interface
    Set {
        /// Interface name
        interface: String,

        /// Obtain the address via DHCP
        #[arg(long, conflicts_with_all = ["address", "gateway", "dns"])]
        dhcp: bool,

        /// Static address with prefix length, e.g. 192.168.1.50/24
        #[arg(long, required_unless_present = "dhcp")]
        address: Option<String>,

        /// Static gateway address
        #[arg(long, required_unless_present = "dhcp")]
        gateway: Option<String>,

        /// Comma-separated DNS servers
        #[arg(long, required_unless_present = "dhcp")]
        dns: Option<String>,
    },

    /// Watch configuration and reachability until interrupted
    Watch {
        /// Interface name (default: first available)
        interface: Option<String>,

        /// Do not probe internet reachability
        #[arg(long = "no-probe")]
        no_probe: bool,
    },

    /// Probe internet reachability once
    Probe,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }

    /// The command to run; `watch` when none was given.
    #[must_use]
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Watch {
            interface: None,
            no_probe: false,
        })
    }
}
