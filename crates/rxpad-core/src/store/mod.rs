//! Flat-file persistence for visit records and clinic settings.

mod backup;
mod records;
mod settings;
mod table;

pub use backup::*;
pub use records::*;
pub use settings::*;
pub use table::*;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::AppConfig;
use crate::models::ValidationError;

/// Storage errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Record file is missing column {0:?}")]
    MissingColumn(String),

    #[error("Malformed record on line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    #[error("{count} records share the key {key}")]
    DuplicateKey { key: String, count: usize },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Visit record table backed by a single file plus its backup.
#[derive(Debug, Clone)]
pub struct RecordStore {
    records_path: PathBuf,
    backup_path: PathBuf,
}

impl RecordStore {
    /// Create a store over explicit file paths.
    pub fn new(records_path: impl Into<PathBuf>, backup_path: impl Into<PathBuf>) -> Self {
        Self {
            records_path: records_path.into(),
            backup_path: backup_path.into(),
        }
    }

    /// Create a store using the configured data directory.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.records_path(), config.backup_path())
    }

    pub fn records_path(&self) -> &Path {
        &self.records_path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }
}

/// Replace `path` with `bytes` via a sibling temp file and rename.
pub(crate) fn write_replacing(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_paths() {
        let config = AppConfig::with_data_dir("/data");
        let store = RecordStore::from_config(&config);
        assert_eq!(store.records_path(), Path::new("/data/patient_records.csv"));
        assert_eq!(store.backup_path(), Path::new("/data/patient_records.bak"));
    }

    #[test]
    fn test_write_replacing_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.txt");
        write_replacing(&path, b"hello").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"hello");
        write_replacing(&path, b"bye").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"bye");
    }
}
