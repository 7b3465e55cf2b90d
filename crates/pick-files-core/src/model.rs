use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One file observed in a source folder, keyed across runs by its content
/// fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Base file name.
    pub name: String,
    /// Scan root joined with the path relative to it.
    pub path: String,
    /// Hex-encoded content hash.
    pub fingerprint: String,
    /// Start time of the most recent scan that saw this content.
    pub last_seen: DateTime<Utc>,
    /// Completion time of the most recent copy; `None` if never picked.
    #[serde(default)]
    pub last_picked: Option<DateTime<Utc>>,
}

impl FileRecord {
    pub fn new(path: &Path, fingerprint: String, last_seen: DateTime<Utc>) -> Self {
        let name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            name,
            path: path.to_string_lossy().into_owned(),
            fingerprint,
            last_seen,
            last_picked: None,
        }
    }

    pub fn with_last_picked(mut self, last_picked: DateTime<Utc>) -> Self {
        self.last_picked = Some(last_picked);
        self
    }
}
