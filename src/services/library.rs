//! Library enumeration: the install root's own `steamapps` plus every extra
//! library declared in `steamapps/libraryfolders.vdf`.

use crate::services::vdf::{FieldExtractor, QuotedPairExtractor};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;

/// Directory under each library (and under the install root) holding manifests.
pub const STEAMAPPS_DIR: &str = "steamapps";

/// Library manifest, relative to the install root.
pub const LIBRARY_MANIFEST: &str = "steamapps/libraryfolders.vdf";

/// Ordered, de-duplicated set of `steamapps` directories.
///
/// The primary library (`<install root>/steamapps`) always comes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySet {
    // keyed by normalized path so `C:/Steam` and `c:\steam` collapse on Windows
    roots: IndexMap<String, Utf8PathBuf>,
}

impl LibrarySet {
    pub fn new(primary: Utf8PathBuf) -> Self {
        let mut set = Self {
            roots: IndexMap::new(),
        };
        set.insert(primary);
        set
    }

    /// Adds a library; returns false if an equivalent path is already present.
    pub fn insert(&mut self, path: Utf8PathBuf) -> bool {
        let key = dedup_key(&path);
        if self.roots.contains_key(&key) {
            return false;
        }
        self.roots.insert(key, path);
        true
    }

    /// The install root's own `steamapps` directory.
    pub fn primary(&self) -> &Utf8Path {
        self.roots
            .values()
            .next()
            .map(Utf8PathBuf::as_path)
            .unwrap_or(Utf8Path::new(""))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Utf8Path> {
        self.roots.values().map(Utf8PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Builds the library set for an install root.
///
/// A missing or malformed `libraryfolders.vdf` yields only the primary
/// library. Declared libraries are kept only if `<path>/steamapps` exists.
pub fn enumerate_libraries(install_root: &Utf8Path) -> LibrarySet {
    let mut libraries = LibrarySet::new(install_root.join(STEAMAPPS_DIR));

    let manifest = install_root.join(LIBRARY_MANIFEST);
    let content = match std::fs::read(&manifest) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            tracing::debug!("No library manifest at {}: {}", manifest, e);
            return libraries;
        }
    };

    for path in QuotedPairExtractor.values(&content, "path") {
        let steamapps = Utf8PathBuf::from(path).join(STEAMAPPS_DIR);
        if !steamapps.exists() {
            tracing::debug!("Skipping missing library {}", steamapps);
            continue;
        }
        if libraries.insert(steamapps.clone()) {
            tracing::debug!("Found library {}", steamapps);
        }
    }

    libraries
}

#[cfg(windows)]
fn dedup_key(path: &Utf8Path) -> String {
    path.as_str()
        .replace('/', "\\")
        .trim_end_matches('\\')
        .to_lowercase()
}

#[cfg(not(windows))]
fn dedup_key(path: &Utf8Path) -> String {
    path.as_str().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap()
    }

    fn write_library_manifest(root: &Utf8Path, paths: &[&Utf8Path]) {
        fs::create_dir_all(root.join(STEAMAPPS_DIR)).unwrap();
        let mut content = String::from("\"libraryfolders\"\n{\n");
        for (i, path) in paths.iter().enumerate() {
            let escaped = path.as_str().replace('\\', "\\\\");
            content.push_str(&format!(
                "\t\"{}\"\n\t{{\n\t\t\"path\"\t\t\"{}\"\n\t}}\n",
                i, escaped
            ));
        }
        content.push_str("}\n");
        fs::write(root.join(LIBRARY_MANIFEST), content).unwrap();
    }

    #[test]
    fn test_missing_manifest_yields_primary_only() {
        let steam = TempDir::new().unwrap();
        let libraries = enumerate_libraries(&utf8(&steam));
        assert_eq!(libraries.len(), 1);
        assert_eq!(libraries.primary(), utf8(&steam).join(STEAMAPPS_DIR));
    }

    #[test]
    fn test_declared_libraries_added_in_order() {
        let steam = TempDir::new().unwrap();
        let lib_a = TempDir::new().unwrap();
        let lib_b = TempDir::new().unwrap();
        fs::create_dir_all(utf8(&lib_a).join(STEAMAPPS_DIR)).unwrap();
        fs::create_dir_all(utf8(&lib_b).join(STEAMAPPS_DIR)).unwrap();

        let root = utf8(&steam);
        write_library_manifest(&root, &[&root, &utf8(&lib_a), &utf8(&lib_b)]);

        let libraries: Vec<Utf8PathBuf> = enumerate_libraries(&root)
            .iter()
            .map(Utf8Path::to_path_buf)
            .collect();
        assert_eq!(
            libraries,
            vec![
                root.join(STEAMAPPS_DIR),
                utf8(&lib_a).join(STEAMAPPS_DIR),
                utf8(&lib_b).join(STEAMAPPS_DIR),
            ]
        );
    }

    #[test]
    fn test_missing_declared_library_skipped() {
        let steam = TempDir::new().unwrap();
        let root = utf8(&steam);
        write_library_manifest(&root, &[Utf8Path::new("/no/such/library")]);

        assert_eq!(enumerate_libraries(&root).len(), 1);
    }

    #[test]
    fn test_garbage_manifest_is_not_an_error() {
        let steam = TempDir::new().unwrap();
        let root = utf8(&steam);
        fs::create_dir_all(root.join(STEAMAPPS_DIR)).unwrap();
        fs::write(root.join(LIBRARY_MANIFEST), [0xff, 0xfe, 0x00, b'{']).unwrap();

        assert_eq!(enumerate_libraries(&root).len(), 1);
    }

    #[test]
    fn test_library_set_dedup() {
        let mut set = LibrarySet::new(Utf8PathBuf::from("/steam/steamapps"));
        assert!(!set.insert(Utf8PathBuf::from("/steam/steamapps/")));
        assert!(set.insert(Utf8PathBuf::from("/games/steamapps")));
        assert_eq!(set.len(), 2);
    }
}
