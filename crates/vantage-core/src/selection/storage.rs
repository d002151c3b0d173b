// ── Last-used selection persistence ──

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The part of a selection remembered between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSelection {
    #[serde(default)]
    pub projects: Vec<i64>,
    #[serde(default)]
    pub environments: Vec<String>,
}

/// Where last-used selections live, one record per organization.
pub trait SelectionStorage: Send + Sync {
    /// `Ok(None)` when nothing was stored for `org`.
    fn load(&self, org: &str) -> Result<Option<StoredSelection>, CoreError>;

    fn save(&self, org: &str, selection: &StoredSelection) -> Result<(), CoreError>;
}

/// In-process storage. Holds serialized records so corrupt data can be
/// injected in tests the same way it would appear on disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw record for `org`, bypassing serialization.
    pub fn insert_raw(&self, org: &str, raw: impl Into<String>) {
        self.records.lock().insert(org.to_owned(), raw.into());
    }

    pub fn raw(&self, org: &str) -> Option<String> {
        self.records.lock().get(org).cloned()
    }
}

impl SelectionStorage for MemoryStorage {
    fn load(&self, org: &str) -> Result<Option<StoredSelection>, CoreError> {
        self.records
            .lock()
            .get(org)
            .map(|raw| serde_json::from_str(raw))
            .transpose()
            .map_err(CoreError::from)
    }

    fn save(&self, org: &str, selection: &StoredSelection) -> Result<(), CoreError> {
        let raw = serde_json::to_string(selection)?;
        self.records.lock().insert(org.to_owned(), raw);
        Ok(())
    }
}

/// One JSON file per organization: `<dir>/global-selection-<org>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, org: &str) -> Result<PathBuf, CoreError> {
        if org.is_empty() || org == "." || org == ".." || org.contains(['/', '\\']) {
            return Err(CoreError::InvalidKey {
                field: "organization slug",
                reason: format!("cannot be used as a file name: {org:?}"),
            });
        }
        Ok(self.dir.join(format!("global-selection-{org}.json")))
    }
}

impl SelectionStorage for FileStorage {
    fn load(&self, org: &str) -> Result<Option<StoredSelection>, CoreError> {
        let path = self.path_for(org)?;
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&self, org: &str, selection: &StoredSelection) -> Result<(), CoreError> {
        let path = self.path_for(org)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, serde_json::to_string_pretty(selection)?)?;
        Ok(())
    }
}
