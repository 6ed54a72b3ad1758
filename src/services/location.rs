//! Steam install root discovery.
//!
//! The install root is found by probing an ordered list of key-value store
//! entries (the Windows registry, or the `registry.vdf` mirror the Linux and
//! macOS clients keep) and then the platform's conventional install
//! directories. The first candidate that exists on disk wins.
//!
//! # Examples
//!
//! ```ignore
//! use steamwatch::services::location::{LocationResolver, SystemStore};
//!
//! let store = SystemStore::new();
//! match LocationResolver::new(&store).resolve() {
//!     Some(root) => println!("Steam at {}", root),
//!     None => println!("Steam not found"),
//! }
//! ```

use camino::Utf8PathBuf;

/// Top-level scope of a store lookup (a registry hive on Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreScope {
    CurrentUser,
    LocalMachine,
}

/// A single `(scope, key path, value name)` lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreProbe {
    pub scope: StoreScope,
    pub key_path: &'static str,
    pub value_name: &'static str,
}

impl StoreProbe {
    pub const fn new(scope: StoreScope, key_path: &'static str, value_name: &'static str) -> Self {
        Self {
            scope,
            key_path,
            value_name,
        }
    }
}

/// Probes tried in order when looking for the Steam install root.
pub const STEAM_PROBES: [StoreProbe; 5] = [
    StoreProbe::new(StoreScope::CurrentUser, r"Software\Valve\Steam", "SteamPath"),
    StoreProbe::new(
        StoreScope::LocalMachine,
        r"SOFTWARE\WOW6432Node\Valve\Steam",
        "SteamPath",
    ),
    StoreProbe::new(StoreScope::LocalMachine, r"SOFTWARE\Valve\Steam", "SteamPath"),
    StoreProbe::new(
        StoreScope::LocalMachine,
        r"SOFTWARE\WOW6432Node\Valve\Steam",
        "InstallPath",
    ),
    StoreProbe::new(StoreScope::LocalMachine, r"SOFTWARE\Valve\Steam", "InstallPath"),
];

/// Read-only key-value lookup returning zero or one string.
///
/// Implementations must treat every failure (missing key, unreadable store,
/// wrong value type) as `None`.
pub trait KeyValueStore {
    fn read_string(&self, scope: StoreScope, key_path: &str, value_name: &str) -> Option<String>;
}

/// The host's real configuration store.
#[derive(Debug, Clone, Default)]
pub struct SystemStore {
    #[cfg(not(windows))]
    registry_file: Option<Utf8PathBuf>,
}

#[cfg(windows)]
impl SystemStore {
    pub fn new() -> Self {
        Self {}
    }
}

#[cfg(windows)]
impl KeyValueStore for SystemStore {
    fn read_string(&self, scope: StoreScope, key_path: &str, value_name: &str) -> Option<String> {
        use winreg::RegKey;
        use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

        let hive = match scope {
            StoreScope::CurrentUser => RegKey::predef(HKEY_CURRENT_USER),
            StoreScope::LocalMachine => RegKey::predef(HKEY_LOCAL_MACHINE),
        };

        let key = match hive.open_subkey(key_path) {
            Ok(key) => key,
            Err(e) => {
                tracing::debug!("Registry key {:?}\\{} unavailable: {}", scope, key_path, e);
                return None;
            }
        };

        key.get_value::<String, _>(value_name).ok()
    }
}

#[cfg(not(windows))]
impl SystemStore {
    /// Store backed by `~/.steam/registry.vdf`.
    pub fn new() -> Self {
        let registry_file = dirs::home_dir()
            .and_then(|home| Utf8PathBuf::from_path_buf(home).ok())
            .map(|home| home.join(".steam").join("registry.vdf"));
        Self { registry_file }
    }

    /// Store backed by an explicit `registry.vdf` file.
    pub fn with_registry_file(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            registry_file: Some(path.into()),
        }
    }
}

#[cfg(not(windows))]
impl KeyValueStore for SystemStore {
    /// The mirror only holds the current user's hive, and its nesting is not
    /// tracked: the first `value_name` entry in the file is returned.
    fn read_string(&self, scope: StoreScope, _key_path: &str, value_name: &str) -> Option<String> {
        use crate::services::vdf::{FieldExtractor, QuotedPairExtractor};

        if scope != StoreScope::CurrentUser {
            return None;
        }

        let path = self.registry_file.as_ref()?;
        let content = match std::fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                tracing::debug!("Registry mirror {} unreadable: {}", path, e);
                return None;
            }
        };

        QuotedPairExtractor.first(&content, value_name)
    }
}

/// Finds the Steam install root.
pub struct LocationResolver<'a> {
    store: &'a dyn KeyValueStore,
    probes: Vec<StoreProbe>,
    fallback_roots: Vec<Utf8PathBuf>,
}

impl<'a> LocationResolver<'a> {
    /// Resolver using [`STEAM_PROBES`] and the platform's conventional roots.
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self {
            store,
            probes: STEAM_PROBES.to_vec(),
            fallback_roots: conventional_roots(),
        }
    }

    /// Resolver with explicit probes and fallback directories.
    pub fn with_probes(
        store: &'a dyn KeyValueStore,
        probes: Vec<StoreProbe>,
        fallback_roots: Vec<Utf8PathBuf>,
    ) -> Self {
        Self {
            store,
            probes,
            fallback_roots,
        }
    }

    /// Returns the first probed path that exists on disk.
    ///
    /// `None` is a normal outcome (Steam is not installed), not an error.
    pub fn resolve(&self) -> Option<Utf8PathBuf> {
        for probe in &self.probes {
            let Some(value) = self
                .store
                .read_string(probe.scope, probe.key_path, probe.value_name)
            else {
                continue;
            };

            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            let candidate = Utf8PathBuf::from(value);
            if candidate.exists() {
                tracing::info!(
                    "Steam install root found via {:?}\\{}\\{}: {}",
                    probe.scope,
                    probe.key_path,
                    probe.value_name,
                    candidate
                );
                return Some(candidate);
            }

            tracing::debug!("Probe {} points to missing path {}", probe.value_name, candidate);
        }

        if let Some(root) = self.fallback_roots.iter().find(|root| root.exists()) {
            tracing::info!("Steam install root found at conventional location: {}", root);
            return Some(root.clone());
        }

        tracing::info!("Steam install root not found");
        None
    }
}

#[cfg(target_os = "windows")]
fn conventional_roots() -> Vec<Utf8PathBuf> {
    vec![
        Utf8PathBuf::from(r"C:\Program Files (x86)\Steam"),
        Utf8PathBuf::from(r"C:\Program Files\Steam"),
    ]
}

#[cfg(target_os = "macos")]
fn conventional_roots() -> Vec<Utf8PathBuf> {
    home_dir()
        .map(|home| vec![home.join("Library").join("Application Support").join("Steam")])
        .unwrap_or_default()
}

#[cfg(target_os = "linux")]
fn conventional_roots() -> Vec<Utf8PathBuf> {
    home_dir()
        .map(|home| {
            vec![
                home.join(".steam").join("steam"),
                home.join(".local").join("share").join("Steam"),
            ]
        })
        .unwrap_or_default()
}

#[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
fn conventional_roots() -> Vec<Utf8PathBuf> {
    Vec::new()
}

#[cfg(any(target_os = "macos", target_os = "linux"))]
fn home_dir() -> Option<Utf8PathBuf> {
    dirs::home_dir().and_then(|home| Utf8PathBuf::from_path_buf(home).ok())
}
