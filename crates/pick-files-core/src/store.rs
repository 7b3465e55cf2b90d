use crate::error::Error;
use crate::model::FileRecord;
use serde::{Deserialize, Serialize};
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_STORE_FILENAME: &str = "pick-files-db.json";
/// Environment variable naming a data directory the store is relocated into.
pub const DATA_DIR_ENV: &str = "SNAP_USER_DATA";

#[derive(Debug, Serialize, Deserialize)]
struct HistoryFile {
    schema: u32,
    #[serde(default)]
    files: Vec<FileRecord>,
}

/// Resolve the store location, placing the default file name under
/// `data_dir` when one is given.
pub fn resolve_store_path(data_dir: Option<&OsStr>) -> PathBuf {
    match data_dir {
        Some(dir) if !dir.is_empty() => Path::new(dir).join(DEFAULT_STORE_FILENAME),
        _ => PathBuf::from(DEFAULT_STORE_FILENAME),
    }
}

/// Durable record of every file seen or picked, as a versioned JSON file.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location, honouring `SNAP_USER_DATA`.
    pub fn open_default() -> Self {
        Self::open(resolve_store_path(env::var_os(DATA_DIR_ENV).as_deref()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read all records. A missing store is the first run and yields an
    /// empty collection; an unreadable or corrupt one is an error.
    pub fn load(&self) -> Result<Vec<FileRecord>, Error> {
        let encoded = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    "Could not find history store at {}, will create new one",
                    self.path.display()
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(Error::Io(err)),
        };

        let history: HistoryFile =
            serde_json::from_slice(&encoded).map_err(|source| Error::CorruptStore {
                path: self.path.clone(),
                source,
            })?;

        if history.schema > SCHEMA_VERSION {
            return Err(Error::UnsupportedSchema {
                found: history.schema,
                supported: SCHEMA_VERSION,
            });
        }

        debug!("Read {} records from history store", history.files.len());
        Ok(history.files)
    }

    /// Replace the stored records. Writes a sibling temporary file first and
    /// renames it over the store so a failed write never truncates history.
    pub fn save(&self, records: &[FileRecord]) -> Result<(), Error> {
        debug!("Writing history store with {} records", records.len());
        let history = HistoryFile {
            schema: SCHEMA_VERSION,
            files: records.to_vec(),
        };
        let encoded = serde_json::to_vec_pretty(&history)
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, &encoded)?;
        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(Error::Io(err));
        }
        Ok(())
    }

    /// Delete the store. Without `force` an existing store is left alone
    /// and `StoreExists` is returned. Returns whether a file was removed.
    pub fn reset(&self, force: bool) -> Result<bool, Error> {
        if !self.exists() {
            return Ok(false);
        }
        if !force {
            return Err(Error::StoreExists(self.path.clone()));
        }
        info!("Resetting history store {}", self.path.display());
        fs::remove_file(&self.path)?;
        Ok(true)
    }

    /// Size of the store file in bytes, if present.
    pub fn disk_size(&self) -> Option<u64> {
        fs::metadata(&self.path).ok().map(|m| m.len())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_STORE_FILENAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
