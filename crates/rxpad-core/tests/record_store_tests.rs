//! Record store integration tests.

use std::fs;

use chrono::NaiveDate;
use rxpad_core::models::{PatientRecord, RecordKey, Sex};
use rxpad_core::store::{DeleteOutcome, RecordStore, RestoreOutcome, UpsertOutcome};
use rxpad_core::{AppConfig, Clinic, FormState};
use tempfile::TempDir;

fn setup_store() -> (TempDir, RecordStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::from_config(&AppConfig::with_data_dir(dir.path()));
    (dir, store)
}

fn visit(name: &str, day: u32, diagnosis: &str) -> PatientRecord {
    PatientRecord {
        date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        name: name.to_string(),
        age: 40,
        sex: Sex::M,
        mobile: String::new(),
        diagnosis: diagnosis.to_string(),
        medicines: vec!["Tab A".to_string()],
    }
}

fn seed(store: &RecordStore) {
    store.upsert(&visit("Ravi", 1, "BP")).unwrap();
    store.upsert(&visit("Meena", 2, "Cold")).unwrap();
    store.upsert(&visit("Kiran", 3, "Sprain")).unwrap();
}

#[test]
fn test_asha_example_into_empty_table() {
    let (dir, _store) = setup_store();
    let clinic = Clinic::open(AppConfig::with_data_dir(dir.path()));

    let mut form = FormState::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    form.name = "Asha Rao".into();
    form.age = 34;
    form.sex = Sex::F;
    form.mobile = "9876500000".into();
    form.diagnosis = "Fever".into();
    form.medicines = "Paracetamol 500mg\nRest 3 days".into();

    assert_eq!(clinic.save(&form).unwrap(), UpsertOutcome::Created);

    let text = fs::read_to_string(clinic.config().records_path()).unwrap();
    assert_eq!(
        text,
        "Date,Name,Age,Sex,Mobile,Diagnosis,Medicines\n\
         2024-03-01,Asha Rao,34,F,9876500000,Fever,Paracetamol 500mg; Rest 3 days\n"
    );
}

#[test]
fn test_new_key_adds_exactly_one_row() {
    let (_dir, store) = setup_store();
    seed(&store);
    let before = store.load().unwrap();

    let added = visit("Asha Rao", 4, "Fever");
    assert_eq!(store.upsert(&added).unwrap(), UpsertOutcome::Created);

    let after = store.load().unwrap();
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(&after[..before.len()], &before[..]);
    assert_eq!(after.last().unwrap(), &added);
}

#[test]
fn test_existing_key_overwrites_only_non_key_fields() {
    let (_dir, store) = setup_store();
    seed(&store);

    let mut changed = visit("Meena", 2, "Flu");
    changed.age = 29;
    changed.sex = Sex::F;
    changed.mobile = "9000000000".into();
    changed.medicines = vec!["Steam".into(), "Rest".into()];
    assert_eq!(store.upsert(&changed).unwrap(), UpsertOutcome::Updated);

    let after = store.load().unwrap();
    assert_eq!(after.len(), 3);
    assert_eq!(after[1], changed);
    assert_eq!(after[0], visit("Ravi", 1, "BP"));
    assert_eq!(after[2], visit("Kiran", 3, "Sprain"));
}

#[test]
fn test_delete_leaves_other_rows_byte_identical() {
    let (_dir, store) = setup_store();
    seed(&store);
    let before = fs::read_to_string(store.records_path()).unwrap();

    let key = RecordKey::new("Meena", NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    assert_eq!(store.delete(&key).unwrap(), DeleteOutcome::Deleted(1));

    let after = fs::read_to_string(store.records_path()).unwrap();
    let expected: Vec<&str> = before.lines().filter(|l| !l.contains("Meena")).collect();
    assert_eq!(after.lines().collect::<Vec<_>>(), expected);
}

#[test]
fn test_undo_after_each_mutation() {
    let (_dir, store) = setup_store();
    seed(&store);

    // Save
    let before = fs::read(store.records_path()).unwrap();
    store.upsert(&visit("Asha Rao", 4, "Fever")).unwrap();
    assert_eq!(store.restore_from_backup().unwrap(), RestoreOutcome::Restored);
    assert_eq!(fs::read(store.records_path()).unwrap(), before);

    // Update
    store.upsert(&visit("Ravi", 1, "Diabetes")).unwrap();
    assert_eq!(store.restore_from_backup().unwrap(), RestoreOutcome::Restored);
    assert_eq!(fs::read(store.records_path()).unwrap(), before);

    // Delete
    let key = RecordKey::new("Kiran", NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
    store.delete(&key).unwrap();
    assert_eq!(store.restore_from_backup().unwrap(), RestoreOutcome::Restored);
    assert_eq!(fs::read(store.records_path()).unwrap(), before);
}

#[test]
fn test_second_undo_does_not_go_further_back() {
    let (_dir, store) = setup_store();
    seed(&store);
    store.upsert(&visit("Asha Rao", 4, "Fever")).unwrap();

    store.restore_from_backup().unwrap();
    store.restore_from_backup().unwrap();

    // Still has Kiran, i.e. only the last change was undone
    let names: Vec<String> = store.load().unwrap().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["Ravi", "Meena", "Kiran"]);
}

#[test]
fn test_backup_matches_record_file_before_mutation() {
    let (_dir, store) = setup_store();
    seed(&store);
    let before = fs::read(store.records_path()).unwrap();

    store.upsert(&visit("Asha Rao", 4, "Fever")).unwrap();
    assert_eq!(fs::read(store.backup_path()).unwrap(), before);
}

#[test]
fn test_malformed_file_is_a_load_error() {
    let (_dir, store) = setup_store();
    fs::write(
        store.records_path(),
        "Date,Name,Age,Sex,Mobile,Diagnosis,Medicines\n2024-03-01,Asha,old,F,,Fever,\n",
    )
    .unwrap();

    assert!(store.load().is_err());
    // A failing load must not clobber the file on save
    assert!(store.upsert(&visit("Ravi", 1, "BP")).is_err());
    assert!(fs::read_to_string(store.records_path()).unwrap().contains("Asha,old"));
}

#[test]
fn test_failed_delete_keeps_last_good_backup() {
    let (_dir, store) = setup_store();
    seed(&store);
    store.upsert(&visit("Asha", 1, "Fever")).unwrap();
    let good_backup = fs::read(store.backup_path()).unwrap();

    fs::write(
        store.records_path(),
        "Date,Name,Age,Sex,Mobile,Diagnosis,Medicines\n2024-03-01,Asha,old,F,,Fever,\n",
    )
    .unwrap();

    let key = RecordKey::new("Asha", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    assert!(store.delete(&key).is_err());
    assert_eq!(fs::read(store.backup_path()).unwrap(), good_backup);

    // Undo still reaches the table from before the corruption
    assert_eq!(store.restore_from_backup().unwrap(), RestoreOutcome::Restored);
    let names: Vec<String> = store.load().unwrap().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["Ravi", "Meena", "Kiran"]);
}
