//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::path::PathBuf;
use std::time::Duration;

/// Default configuration polling interval in seconds.
pub const CONFIG_INTERVAL_SECS: u64 = 2;

/// Default reachability polling interval in seconds.
pub const PROBE_INTERVAL_SECS: u64 = 5;

/// Default reachability probe host.
pub const PROBE_HOST: &str = "www.google.com";

/// Default reachability probe port.
pub const PROBE_PORT: u16 = 80;

/// Default reachability probe timeout in milliseconds.
pub const PROBE_TIMEOUT_MS: u64 = 2000;

/// Resolver configuration.
pub const RESOLV_CONF: &str = "/etc/resolv.conf";

/// systemd-networkd DHCP lease directory.
pub const LEASE_DIR: &str = "/run/systemd/netif/leases";

/// Profile store file name inside the data directory.
pub const STORE_FILE_NAME: &str = "profiles.json";

/// Default configuration polling interval as Duration.
#[must_use]
pub const fn config_interval() -> Duration {
    Duration::from_secs(CONFIG_INTERVAL_SECS)
}

/// Default reachability polling interval as Duration.
#[must_use]
pub const fn probe_interval() -> Duration {
    Duration::from_secs(PROBE_INTERVAL_SECS)
}

/// Default reachability probe timeout as Duration.
#[must_use]
pub const fn probe_timeout() -> Duration {
    Duration::from_millis(PROBE_TIMEOUT_MS)
}

/// Default profile store location.
///
/// `<data_local_dir>/ethcfg/profiles.json`, or `./profiles.json` when the
/// platform has no data directory.
#[must_use]
pub fn store_path() -> PathBuf {
    dirs::data_local_dir().map_or_else(
        || PathBuf::from(STORE_FILE_NAME),
        |dir| dir.join("ethcfg").join(STORE_FILE_NAME),
    )
}
