//! Single-generation backup for one-step undo.

use std::fs;

use tracing::{info, warn};

use super::{write_replacing, write_table, RecordStore, StoreResult};

/// Result of restoring from backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored,
    NoBackup,
}

impl RecordStore {
    /// Overwrite the backup with the current table.
    ///
    /// Without a record file the backup becomes a header-only table, so
    /// restoring it yields the empty state.
    pub fn snapshot(&self) -> StoreResult<()> {
        if self.records_path.exists() {
            let bytes = fs::read(&self.records_path)?;
            write_replacing(&self.backup_path, &bytes)?;
        } else {
            write_replacing(&self.backup_path, &write_table(&[])?)?;
        }
        Ok(())
    }

    /// Check whether an undo is possible.
    pub fn has_backup(&self) -> bool {
        self.backup_path.exists()
    }

    /// Replace the live table with the backup, byte for byte.
    ///
    /// Does not snapshot first, so a second restore is a no-op.
    pub fn restore_from_backup(&self) -> StoreResult<RestoreOutcome> {
        if !self.has_backup() {
            warn!(path = %self.backup_path.display(), "no backup to restore");
            return Ok(RestoreOutcome::NoBackup);
        }
        let bytes = fs::read(&self.backup_path)?;
        write_replacing(&self.records_path, &bytes)?;
        info!("restored records from backup");
        Ok(RestoreOutcome::Restored)
    }
}
