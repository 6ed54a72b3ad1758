/// `StateFlags` values that mark an app as queued, updating or downloading.
pub const ACTIVE_STATE_FLAGS: [u32; 3] = [2, 4, 6];

/// Fields read from one `appmanifest_<id>.acf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRecord {
    pub app_id: String,
    pub name: String,
    /// Raw `StateFlags` value, 0 when the manifest carries none
    pub state_flags: u32,
}

impl ManifestRecord {
    pub fn has_active_state(&self) -> bool {
        ACTIVE_STATE_FLAGS.contains(&self.state_flags)
    }

    /// Name shown for an app whose manifest could not be found.
    pub fn fallback_name(app_id: &str) -> String {
        format!("AppID {}", app_id)
    }
}
