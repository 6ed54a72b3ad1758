//! Strategy B: infer download state from staging directories and manifests.

use crate::models::{DownloadStatusRecord, StrategyKind};
use crate::services::activity;
use crate::services::discovery::{discover_active, staging_dir};
use crate::services::library::enumerate_libraries;
use crate::services::manifest::ManifestIndex;
use crate::services::sampler::SizeSampler;
use crate::strategy::DetectionStrategy;
use camino::{Utf8Path, Utf8PathBuf};
use std::time::SystemTime;

/// Filesystem-based detection: one record per app that looks active.
///
/// Speed comes from staging directory growth between polls; active vs paused
/// comes from how recently files in the staging directory changed. Staging
/// directories are only looked up in the primary library.
pub struct FilesystemStrategy {
    install_root: Utf8PathBuf,
    sampler: SizeSampler,
}

impl FilesystemStrategy {
    pub fn new(install_root: &Utf8Path) -> Self {
        Self {
            install_root: install_root.to_path_buf(),
            sampler: SizeSampler::new(),
        }
    }

    pub fn sampler(&self) -> &SizeSampler {
        &self.sampler
    }
}

impl DetectionStrategy for FilesystemStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Filesystem
    }

    fn source(&self) -> String {
        enumerate_libraries(&self.install_root)
            .iter()
            .map(Utf8Path::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn poll(&mut self, now: SystemTime) -> Vec<DownloadStatusRecord> {
        let libraries = enumerate_libraries(&self.install_root);
        let active = discover_active(&libraries);
        if active.is_empty() {
            return Vec::new();
        }

        let staging_root = libraries.primary().to_path_buf();
        let index = ManifestIndex::new(libraries);

        active
            .iter()
            .map(|app_id| {
                let staging = staging_dir(&staging_root, app_id);
                let speed = self.sampler.sample(app_id, &staging, now);
                let status = activity::classify(&staging, now);
                tracing::debug!("AppID {}: {} at {:.2} MB/s", app_id, status, speed);

                DownloadStatusRecord::new(
                    app_id.as_str(),
                    index.display_name(app_id),
                    speed,
                    status,
                    now,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DownloadStatus;
    use std::fs::{self, File};
    use std::time::Duration;
    use tempfile::TempDir;

    fn steam_root(dir: &TempDir) -> Utf8PathBuf {
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join("steamapps")).unwrap();
        root
    }

    #[test]
    fn test_no_manifests_no_records() {
        let dir = TempDir::new().unwrap();
        let mut strategy = FilesystemStrategy::new(&steam_root(&dir));
        assert!(strategy.poll(SystemTime::now()).is_empty());
    }

    #[test]
    fn test_fresh_staging_dir_is_downloading() {
        let dir = TempDir::new().unwrap();
        let root = steam_root(&dir);
        fs::write(
            root.join("steamapps/appmanifest_730.acf"),
            "\"name\" \"Counter-Strike 2\"\n\"StateFlags\" \"1026\"\n",
        )
        .unwrap();
        let staging = root.join("steamapps/downloading/730");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("chunk"), vec![0u8; 1024]).unwrap();

        let mut strategy = FilesystemStrategy::new(&root);
        let records = strategy.poll(SystemTime::now());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].display_name, "Counter-Strike 2");
        assert_eq!(records[0].status, DownloadStatus::Downloading);
        assert_eq!(records[0].speed_mbps, 0.0);
        assert_eq!(strategy.sampler().last_sample("730").unwrap().bytes, 1024);
    }

    #[test]
    fn test_stale_staging_dir_is_paused() {
        let dir = TempDir::new().unwrap();
        let root = steam_root(&dir);
        fs::write(root.join("steamapps/appmanifest_730.acf"), "\"StateFlags\" \"4\"\n").unwrap();
        let staging = root.join("steamapps/downloading/730");
        fs::create_dir_all(&staging).unwrap();
        let chunk = File::create(staging.join("chunk")).unwrap();
        let now = SystemTime::now();
        chunk.set_modified(now - Duration::from_secs(600)).unwrap();

        let mut strategy = FilesystemStrategy::new(&root);
        let records = strategy.poll(now);
        assert_eq!(records[0].status, DownloadStatus::Paused);
        assert_eq!(records[0].display_name, "AppID 730");
    }
}
