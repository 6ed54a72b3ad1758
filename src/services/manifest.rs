//! Per-app manifest lookup (`appmanifest_<id>.acf`).
//!
//! Manifests are rewritten by Steam while it runs, so nothing here is cached:
//! every lookup reads the files again.

use crate::models::ManifestRecord;
use crate::services::library::LibrarySet;
use crate::services::vdf::{FieldExtractor, QuotedPairExtractor};
use camino::{Utf8Path, Utf8PathBuf};

/// File name of the manifest for `app_id`.
pub fn manifest_file_name(app_id: &str) -> String {
    format!("appmanifest_{}.acf", app_id)
}

/// App id encoded in a manifest file name, if the name is one.
pub fn app_id_from_file_name(file_name: &str) -> Option<&str> {
    let id = file_name
        .strip_prefix("appmanifest_")?
        .strip_suffix(".acf")?;
    (!id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())).then_some(id)
}

fn read_lossy(path: &Utf8Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            tracing::debug!("Manifest {} unreadable: {}", path, e);
            None
        }
    }
}

/// Reads one manifest file.
///
/// Returns `None` if the file is missing or unreadable, or has no `name`.
/// A missing `StateFlags` is reported as 0.
pub fn read_manifest(path: &Utf8Path, app_id: &str) -> Option<ManifestRecord> {
    let content = read_lossy(path)?;
    let extractor = QuotedPairExtractor;

    let Some(name) = extractor.first(&content, "name") else {
        tracing::debug!("Manifest {} has no name", path);
        return None;
    };

    Some(ManifestRecord {
        app_id: app_id.to_string(),
        name,
        state_flags: extractor.first_u32(&content, "StateFlags").unwrap_or(0),
    })
}

/// `StateFlags` of one manifest file, whether or not it carries a name.
pub fn read_state_flags(path: &Utf8Path) -> Option<u32> {
    QuotedPairExtractor.first_u32(&read_lossy(path)?, "StateFlags")
}

/// Looks up app manifests across every library.
#[derive(Debug, Clone)]
pub struct ManifestIndex {
    libraries: LibrarySet,
}

impl ManifestIndex {
    pub fn new(libraries: LibrarySet) -> Self {
        Self { libraries }
    }

    /// First readable manifest for `app_id`, scanning libraries in order.
    pub fn lookup(&self, app_id: &str) -> Option<ManifestRecord> {
        let file_name = manifest_file_name(app_id);
        self.libraries
            .iter()
            .map(|library| library.join(&file_name))
            .filter(|path| path.exists())
            .find_map(|path| read_manifest(&path, app_id))
    }

    /// Display name for `app_id`, or `AppID <id>` when no manifest matches.
    pub fn display_name(&self, app_id: &str) -> String {
        self.lookup(app_id)
            .map(|record| record.name)
            .unwrap_or_else(|| ManifestRecord::fallback_name(app_id))
    }

    /// Every manifest file present in `library`, with its app id.
    pub fn manifests_in(library: &Utf8Path) -> Vec<(String, Utf8PathBuf)> {
        let entries = match std::fs::read_dir(library) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Library {} unreadable: {}", library, e);
                return Vec::new();
            }
        };

        entries
            .flatten()
            .filter_map(|entry| {
                let file_name = entry.file_name();
                let app_id = app_id_from_file_name(file_name.to_str()?)?.to_string();
                let path = library.join(file_name.to_str()?);
                Some((app_id, path))
            })
            .collect()
    }
}
