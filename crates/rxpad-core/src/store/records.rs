//! Visit record operations.

use std::fs;
use std::io::ErrorKind;

use tracing::{debug, info};

use super::{parse_table, write_replacing, write_table, RecordStore, StoreError, StoreResult};
use crate::models::{PatientRecord, RecordKey};

/// Result of saving a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No row had the key; the record was appended
    Created,
    /// The existing row's non-key fields were overwritten
    Updated,
}

/// Result of deleting by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Number of rows removed
    Deleted(usize),
    NotFound,
}

/// A record together with its position in the table.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    /// Zero-based position in insertion order
    pub row: usize,
    pub record: PatientRecord,
}

impl RecordStore {
    /// Load every record in insertion order.
    ///
    /// A missing file is a first run and yields an empty table.
    pub fn load(&self) -> StoreResult<Vec<PatientRecord>> {
        match fs::read(&self.records_path) {
            Ok(bytes) => parse_table(&bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.records_path.display(), "no record file yet");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the whole table.
    pub(crate) fn write_all(&self, records: &[PatientRecord]) -> StoreResult<()> {
        let bytes = write_table(records)?;
        write_replacing(&self.records_path, &bytes)
    }

    /// Insert or update the record keyed by (name, date).
    ///
    /// The name is trimmed before matching. Validation happens before the
    /// backup is taken, so a rejected save leaves both files untouched.
    pub fn upsert(&self, record: &PatientRecord) -> StoreResult<UpsertOutcome> {
        record.validate()?;

        let key = record.key();
        let mut incoming = record.clone();
        incoming.name = key.name.clone();

        let mut records = self.load()?;
        let matches: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.matches(&key))
            .map(|(i, _)| i)
            .collect();

        if matches.len() > 1 {
            return Err(StoreError::DuplicateKey {
                key: key.to_string(),
                count: matches.len(),
            });
        }

        self.snapshot()?;

        let outcome = match matches.first() {
            Some(&idx) => {
                records[idx].update_from(&incoming);
                UpsertOutcome::Updated
            }
            None => {
                records.push(incoming);
                UpsertOutcome::Created
            }
        };

        self.write_all(&records)?;
        info!(key = %key, ?outcome, "saved record");
        Ok(outcome)
    }

    /// Remove every row with the given key.
    ///
    /// The table is loaded before the backup is taken, so a record file
    /// that fails to parse never replaces the last good backup.
    pub fn delete(&self, key: &RecordKey) -> StoreResult<DeleteOutcome> {
        let mut records = self.load()?;
        self.snapshot()?;

        let before = records.len();
        records.retain(|r| !r.matches(key));
        let removed = before - records.len();

        if removed == 0 {
            info!(key = %key, "nothing to delete");
            return Ok(DeleteOutcome::NotFound);
        }

        self.write_all(&records)?;
        info!(key = %key, removed, "deleted record");
        Ok(DeleteOutcome::Deleted(removed))
    }

    /// Get the single record with this key.
    pub fn get(&self, key: &RecordKey) -> StoreResult<Option<PatientRecord>> {
        let mut found: Vec<PatientRecord> = self
            .load()?
            .into_iter()
            .filter(|r| r.matches(key))
            .collect();

        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            count => Err(StoreError::DuplicateKey {
                key: key.to_string(),
                count,
            }),
        }
    }

    /// Search history rows by name or diagnosis substring, ignoring case.
    ///
    /// With an empty query every row is returned, most recent first.
    /// Otherwise matches keep insertion order.
    pub fn find_rows(&self, query: &str) -> StoreResult<Vec<HistoryRow>> {
        let rows = self
            .load()?
            .into_iter()
            .enumerate()
            .map(|(row, record)| HistoryRow { row, record });

        if query.is_empty() {
            let mut all: Vec<HistoryRow> = rows.collect();
            all.reverse();
            return Ok(all);
        }

        let needle = query.to_lowercase();
        Ok(rows.filter(|h| h.record.matches_search(&needle)).collect())
    }

    /// Search records; see [`RecordStore::find_rows`].
    pub fn find(&self, query: &str) -> StoreResult<Vec<PatientRecord>> {
        Ok(self
            .find_rows(query)?
            .into_iter()
            .map(|h| h.record)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sex;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, RecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("records.csv"), dir.path().join("records.bak"));
        (dir, store)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn record(name: &str, d: u32, diagnosis: &str) -> PatientRecord {
        let mut r = PatientRecord::new(name, date(d));
        r.age = 30;
        r.sex = Sex::F;
        r.diagnosis = diagnosis.into();
        r.medicines = vec!["Paracetamol 500mg".into()];
        r
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let (_dir, store) = setup_store();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_upsert_creates() {
        let (_dir, store) = setup_store();
        let r = record("Asha Rao", 1, "Fever");

        assert_eq!(store.upsert(&r).unwrap(), UpsertOutcome::Created);
        assert_eq!(store.load().unwrap(), vec![r]);
    }

    #[test]
    fn test_upsert_updates_non_key_fields() {
        let (_dir, store) = setup_store();
        store.upsert(&record("Asha Rao", 1, "Fever")).unwrap();
        store.upsert(&record("Ravi", 1, "BP")).unwrap();

        let mut changed = record("Asha Rao", 1, "Dengue");
        changed.age = 35;
        assert_eq!(store.upsert(&changed).unwrap(), UpsertOutcome::Updated);

        let records = store.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].diagnosis, "Dengue");
        assert_eq!(records[0].age, 35);
        assert_eq!(records[1].name, "Ravi");
    }

    #[test]
    fn test_upsert_trims_name() {
        let (_dir, store) = setup_store();
        store.upsert(&record("  Asha Rao  ", 1, "Fever")).unwrap();
        assert_eq!(
            store.upsert(&record("Asha Rao", 1, "Cold")).unwrap(),
            UpsertOutcome::Updated
        );
        assert_eq!(store.load().unwrap()[0].name, "Asha Rao");
    }

    #[test]
    fn test_upsert_rejects_empty_name() {
        let (_dir, store) = setup_store();
        let err = store.upsert(&record("  ", 1, "Fever")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(!store.records_path().exists());
        assert!(!store.backup_path().exists());
    }

    #[test]
    fn test_upsert_rejects_duplicate_key() {
        let (_dir, store) = setup_store();
        let dup = record("Asha Rao", 1, "Fever");
        store.write_all(&[dup.clone(), dup.clone()]).unwrap();

        let err = store.upsert(&dup).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { count: 2, .. }));
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = setup_store();
        store.upsert(&record("Asha Rao", 1, "Fever")).unwrap();
        store.upsert(&record("Ravi", 2, "BP")).unwrap();

        let outcome = store.delete(&RecordKey::new("Asha Rao", date(1))).unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted(1));

        let records = store.load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Ravi");
    }

    #[test]
    fn test_delete_not_found() {
        let (_dir, store) = setup_store();
        store.upsert(&record("Asha Rao", 1, "Fever")).unwrap();
        let outcome = store.delete(&RecordKey::new("Asha Rao", date(9))).unwrap();
        assert_eq!(outcome, DeleteOutcome::NotFound);
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_get() {
        let (_dir, store) = setup_store();
        store.upsert(&record("Asha Rao", 1, "Fever")).unwrap();

        let found = store.get(&RecordKey::new("Asha Rao", date(1))).unwrap();
        assert_eq!(found.unwrap().diagnosis, "Fever");
        assert!(store.get(&RecordKey::new("Asha", date(1))).unwrap().is_none());
    }

    #[test]
    fn test_find_without_query_is_newest_first() {
        let (_dir, store) = setup_store();
        store.upsert(&record("A", 1, "x")).unwrap();
        store.upsert(&record("B", 2, "y")).unwrap();
        store.upsert(&record("C", 3, "z")).unwrap();

        let names: Vec<String> = store.find("").unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["C", "B", "A"]);

        let rows: Vec<usize> = store.find_rows("").unwrap().into_iter().map(|h| h.row).collect();
        assert_eq!(rows, vec![2, 1, 0]);
    }

    #[test]
    fn test_find_matches_name_or_diagnosis() {
        let (_dir, store) = setup_store();
        store.upsert(&record("Asha Rao", 1, "Fever")).unwrap();
        store.upsert(&record("Ravi", 2, "Viral fever")).unwrap();
        store.upsert(&record("Meena", 3, "Cold")).unwrap();

        let names: Vec<String> = store.find("FEVER").unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Asha Rao", "Ravi"]);

        let names: Vec<String> = store.find("mee").unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Meena"]);
    }
}
