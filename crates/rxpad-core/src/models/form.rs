//! In-progress visit being edited.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::record::{parse_medicines_text, PatientRecord, RecordKey, Sex, ValidationError};

/// The editing session's current form.
///
/// Never persisted directly; a record is only written through an explicit
/// save. Medicines are kept as the raw text the user typed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormState {
    pub name: String,
    pub age: u32,
    pub sex: Sex,
    pub mobile: String,
    pub date: NaiveDate,
    pub diagnosis: String,
    /// One medicine per line
    pub medicines: String,
    /// History row the form was last populated from
    pub selected_row: Option<usize>,
}

impl FormState {
    /// Create an empty form dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            name: String::new(),
            age: 0,
            sex: Sex::default(),
            mobile: String::new(),
            date: today,
            diagnosis: String::new(),
            medicines: String::new(),
            selected_row: None,
        }
    }

    /// Create an empty form dated with the local calendar date.
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    /// Reset every field to its default.
    pub fn clear(&mut self, today: NaiveDate) {
        *self = Self::new(today);
    }

    /// Populate the form from a history row.
    ///
    /// Returns false (and leaves the form untouched) when `row` is already
    /// the selected one, so edits made after selecting are kept.
    pub fn select(&mut self, row: usize, record: &PatientRecord) -> bool {
        if self.selected_row == Some(row) {
            return false;
        }
        self.name = record.name.clone();
        self.age = record.age;
        self.sex = record.sex;
        self.mobile = record.mobile.clone();
        self.date = record.date;
        self.diagnosis = record.diagnosis.clone();
        self.medicines = record.medicines_text();
        self.selected_row = Some(row);
        true
    }

    /// Forget which history row the form came from.
    ///
    /// Needed whenever the table is replaced wholesale, since row positions
    /// may then point at different visits.
    pub fn forget_selection(&mut self) {
        self.selected_row = None;
    }

    /// Key of the visit the form currently describes.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.name, self.date)
    }

    /// Non-blank medicine lines.
    pub fn medicine_lines(&self) -> Vec<String> {
        parse_medicines_text(&self.medicines)
    }

    /// Convert into a savable record.
    pub fn to_record(&self) -> Result<PatientRecord, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(PatientRecord {
            date: self.date,
            name: name.to_string(),
            age: self.age,
            sex: self.sex,
            mobile: self.mobile.clone(),
            diagnosis: self.diagnosis.clone(),
            medicines: self.medicine_lines(),
        })
    }

    /// Record view used for rendering, without name validation.
    pub fn as_record(&self) -> PatientRecord {
        PatientRecord {
            date: self.date,
            name: self.name.clone(),
            age: self.age,
            sex: self.sex,
            mobile: self.mobile.clone(),
            diagnosis: self.diagnosis.clone(),
            medicines: self.medicine_lines(),
        }
    }
}
