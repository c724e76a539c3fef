//! File-backed configuration gateway.

use std::collections::BTreeMap;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::network::IpConfiguration;

use super::{Addressing, ConfigurationGateway, GatewayError};

/// Current store file format version.
///
/// Increment this when making breaking changes to the format.
const STORE_FILE_VERSION: u32 = 1;

/// On-disk profile store format.
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    /// Format version.
    version: u32,

    /// Unix timestamp of the last write. For debugging only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<String>,

    /// Per-interface configurations.
    #[serde(default)]
    interfaces: BTreeMap<String, IpConfiguration>,

    /// The single configuration used under legacy addressing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<IpConfiguration>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            version: STORE_FILE_VERSION,
            saved_at: None,
            interfaces: BTreeMap::new(),
            default: None,
        }
    }
}

fn unix_timestamp_now() -> String {
    use std::time::SystemTime;

    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();

    format!("{}", duration.as_secs())
}

/// A [`ConfigurationGateway`] that keeps profiles in a JSON file.
///
/// Stands in for a platform configuration service: interfaces known to the
/// host but never configured report `UNASSIGNED`, and a store file the
/// process may not read or write reports [`GatewayError::AccessDenied`].
///
/// # Atomic Writes
///
/// Each write goes to its own temporary file next to `{path}` and is renamed
/// over it, so the store is either fully written or left untouched.
///
/// # Concurrency
///
/// Writes hold a lock across load, modify and save, so writes to different
/// interfaces through one gateway (or its clones) never overwrite each
/// other. Writers in other processes are not coordinated.
#[derive(Debug, Clone)]
pub struct FileGateway {
    path: PathBuf,
    interfaces: Vec<String>,
    addressing: Addressing,
    write_lock: Arc<Mutex<()>>,
}

impl FileGateway {
    /// Creates a gateway storing profiles at `path` for the given interfaces.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, interfaces: Vec<String>) -> Self {
        Self {
            path: path.into(),
            interfaces,
            addressing: Addressing::PerInterface,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Sets the addressing capability reported to the core.
    #[must_use]
    pub const fn with_addressing(mut self, addressing: Addressing) -> Self {
        self.addressing = addressing;
        self
    }

    /// Returns the path to the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, e: io::Error) -> GatewayError {
        if e.kind() == ErrorKind::PermissionDenied {
            GatewayError::AccessDenied {
                context: self.path.display().to_string(),
            }
        } else {
            GatewayError::Store(e)
        }
    }

    fn load(&self) -> Result<StoreFile, GatewayError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreFile::default()),
            Err(e) => return Err(self.io_error(e)),
        };

        let store: StoreFile = serde_json::from_str(&content).map_err(GatewayError::Format)?;
        if store.version != STORE_FILE_VERSION {
            return Err(GatewayError::Platform {
                message: format!(
                    "Incompatible store version: expected {STORE_FILE_VERSION}, got {}",
                    store.version
                ),
            });
        }
        Ok(store)
    }

    fn save(&self, mut store: StoreFile) -> Result<(), GatewayError> {
        store.saved_at = Some(unix_timestamp_now());
        let content = serde_json::to_string_pretty(&store).map_err(GatewayError::Format)?;

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;

        let mut temp = NamedTempFile::new_in(parent).map_err(|e| self.io_error(e))?;
        temp.write_all(content.as_bytes()).map_err(|e| self.io_error(e))?;
        temp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        Ok(())
    }

    fn is_known(&self, store: &StoreFile, interface: &str) -> bool {
        self.interfaces.iter().any(|known| known == interface)
            || store.interfaces.contains_key(interface)
    }
}

impl ConfigurationGateway for FileGateway {
    fn addressing(&self) -> Addressing {
        self.addressing
    }

    fn list_interfaces(&self) -> Result<Vec<String>, GatewayError> {
        let store = self.load()?;
        let mut names = self.interfaces.clone();
        for name in store.interfaces.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        Ok(names)
    }

    fn get_configuration(
        &self,
        interface: Option<&str>,
    ) -> Result<Option<IpConfiguration>, GatewayError> {
        let mut store = self.load()?;
        let Some(interface) = interface else {
            return Ok(Some(store.default.unwrap_or_else(IpConfiguration::unassigned)));
        };

        if let Some(config) = store.interfaces.remove(interface) {
            return Ok(Some(config));
        }
        if self.is_known(&store, interface) {
            return Ok(Some(IpConfiguration::unassigned()));
        }
        Ok(None)
    }

    fn set_configuration(
        &self,
        interface: Option<&str>,
        config: &IpConfiguration,
    ) -> Result<(), GatewayError> {
        let config = config.submittable().ok_or_else(|| GatewayError::Rejected {
            reason: "static configuration requires address, gateway and DNS servers".to_string(),
        })?;

        // The guard protects no data; a poisoned lock is still usable.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut store = self.load()?;
        match interface {
            Some(interface) => {
                if !self.is_known(&store, interface) {
                    return Err(GatewayError::InterfaceNotFound {
                        interface: interface.to_string(),
                    });
                }
                store.interfaces.insert(interface.to_string(), config);
            }
            None => store.default = Some(config),
        }

        tracing::debug!("Writing profile store {}", self.path.display());
        self.save(store)
    }
}
