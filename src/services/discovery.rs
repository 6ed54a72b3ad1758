//! Active-set discovery: which apps look like they are downloading.

use crate::models::manifest::ACTIVE_STATE_FLAGS;
use crate::services::library::LibrarySet;
use crate::services::manifest::{ManifestIndex, read_state_flags};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;

/// Directory under a library where Steam stages in-progress downloads.
pub const DOWNLOADING_DIR: &str = "downloading";

/// Staging directory for `app_id` inside `library`.
pub fn staging_dir(library: &Utf8Path, app_id: &str) -> Utf8PathBuf {
    library.join(DOWNLOADING_DIR).join(app_id)
}

/// App ids that look like they are downloading, across every library.
///
/// An app qualifies if its staging directory exists in the library holding
/// its manifest, or if the manifest's `StateFlags` is an active state.
pub fn discover_active(libraries: &LibrarySet) -> IndexSet<String> {
    let mut active = IndexSet::new();

    for library in libraries.iter() {
        for (app_id, manifest_path) in ManifestIndex::manifests_in(library) {
            if active.contains(&app_id) {
                continue;
            }

            if staging_dir(library, &app_id).exists() {
                tracing::debug!("AppID {} has a staging directory in {}", app_id, library);
                active.insert(app_id);
                continue;
            }

            let flagged = read_state_flags(&manifest_path)
                .is_some_and(|flags| ACTIVE_STATE_FLAGS.contains(&flags));
            if flagged {
                tracing::debug!("AppID {} manifest reports an active state", app_id);
                active.insert(app_id);
            }
        }
    }

    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::manifest::manifest_file_name;
    use std::fs;
    use tempfile::TempDir;

    fn library(dir: &TempDir) -> Utf8PathBuf {
        let path = Utf8PathBuf::try_from(dir.path().join("steamapps")).unwrap();
        fs::create_dir_all(&path).unwrap();
        path
    }

    fn write_manifest(library: &Utf8Path, app_id: &str, state_flags: u32) {
        fs::write(
            library.join(manifest_file_name(app_id)),
            format!(
                "\"AppState\"\n{{\n\t\"name\"\t\t\"App {}\"\n\t\"StateFlags\"\t\t\"{}\"\n}}\n",
                app_id, state_flags
            ),
        )
        .unwrap();
    }

    #[test]
    fn test_active_by_state_flags() {
        let dir = TempDir::new().unwrap();
        let lib = library(&dir);
        write_manifest(&lib, "1", 4);
        write_manifest(&lib, "2", 1026);
        write_manifest(&lib, "3", 6);

        let mut active: Vec<String> = discover_active(&LibrarySet::new(lib)).into_iter().collect();
        active.sort();
        assert_eq!(active, vec!["1", "3"]);
    }

    #[test]
    fn test_active_by_staging_dir() {
        let dir = TempDir::new().unwrap();
        let lib = library(&dir);
        write_manifest(&lib, "42", 1026);
        fs::create_dir_all(staging_dir(&lib, "42")).unwrap();

        let active = discover_active(&LibrarySet::new(lib));
        assert!(active.contains("42"));
    }

    #[test]
    fn test_nameless_manifest_still_flagged() {
        let dir = TempDir::new().unwrap();
        let lib = library(&dir);
        fs::write(lib.join(manifest_file_name("8")), "\"StateFlags\" \"2\"\n").unwrap();

        assert!(discover_active(&LibrarySet::new(lib)).contains("8"));
    }

    #[test]
    fn test_staging_dir_without_manifest_ignored() {
        let dir = TempDir::new().unwrap();
        let lib = library(&dir);
        fs::create_dir_all(staging_dir(&lib, "77")).unwrap();

        assert!(discover_active(&LibrarySet::new(lib)).is_empty());
    }

    #[test]
    fn test_duplicates_across_libraries_collapsed() {
        let dir_a = TempDir::new().unwrap();
        let dir_b = TempDir::new().unwrap();
        let lib_a = library(&dir_a);
        let lib_b = library(&dir_b);
        write_manifest(&lib_a, "5", 4);
        write_manifest(&lib_b, "5", 2);

        let mut libraries = LibrarySet::new(lib_a);
        libraries.insert(lib_b);
        assert_eq!(discover_active(&libraries).len(), 1);
    }
}
