//! Visit record models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Delimiter used to flatten medicine lines into a single record field.
///
/// The join is not escaped: a medicine line that itself contains this
/// sequence splits into two lines when the record is read back.
pub const MEDICINE_DELIMITER: &str = "; ";

/// Date format used in the record file.
pub const RECORD_DATE_FORMAT: &str = "%Y-%m-%d";

/// Input validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Name is required")]
    EmptyName,

    #[error("Unknown sex value: {0:?} (expected M, F or Other)")]
    InvalidSex(String),

    #[error("Invalid date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid age {0:?}")]
    InvalidAge(String),
}

/// Patient sex as recorded on the visit.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sex {
    #[default]
    M,
    F,
    Other,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::M => "M",
            Sex::F => "F",
            Sex::Other => "Other",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "M" => Ok(Sex::M),
            "F" => Ok(Sex::F),
            "Other" => Ok(Sex::Other),
            other => Err(ValidationError::InvalidSex(other.to_string())),
        }
    }
}

/// Natural key of a visit: exact patient name plus visit date.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub name: String,
    pub date: NaiveDate,
}

impl RecordKey {
    /// Build a key, trimming surrounding whitespace from the name.
    pub fn new(name: &str, date: NaiveDate) -> Self {
        Self {
            name: name.trim().to_string(),
            date,
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.name, self.date.format(RECORD_DATE_FORMAT))
    }
}

/// One patient visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientRecord {
    /// Visit date
    pub date: NaiveDate,
    /// Patient name (part of the natural key)
    pub name: String,
    /// Age in years
    pub age: u32,
    pub sex: Sex,
    /// Mobile number, free text
    pub mobile: String,
    pub diagnosis: String,
    /// Prescribed medicines, one entry per line
    pub medicines: Vec<String>,
}

impl PatientRecord {
    /// Create a record with the required fields; everything else empty.
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            date,
            name: name.into(),
            age: 0,
            sex: Sex::default(),
            mobile: String::new(),
            diagnosis: String::new(),
            medicines: Vec::new(),
        }
    }

    /// Get this record's natural key.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.name, self.date)
    }

    /// Check whether this record has the given key (exact, case-sensitive).
    pub fn matches(&self, key: &RecordKey) -> bool {
        self.name == key.name && self.date == key.date
    }

    /// Check the record is savable.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    /// Overwrite every non-key field from `other`.
    pub fn update_from(&mut self, other: &PatientRecord) {
        self.age = other.age;
        self.sex = other.sex;
        self.mobile = other.mobile.clone();
        self.diagnosis = other.diagnosis.clone();
        self.medicines = other.medicines.clone();
    }

    /// Check if the name or diagnosis contains `needle` (already lowercased).
    pub fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.diagnosis.to_lowercase().contains(needle)
    }

    /// Medicines flattened for storage.
    pub fn medicines_field(&self) -> String {
        join_medicines(&self.medicines)
    }

    /// Medicines as newline-separated text, the way the form edits them.
    pub fn medicines_text(&self) -> String {
        self.medicines.join("\n")
    }
}

/// Split free text into medicine lines, dropping blank ones.
pub fn parse_medicines_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join medicine lines into the stored single-field form.
pub fn join_medicines(lines: &[String]) -> String {
    lines.join(MEDICINE_DELIMITER)
}

/// Split a stored medicines field back into lines.
pub fn split_medicines(field: &str) -> Vec<String> {
    if field.is_empty() {
        return Vec::new();
    }
    field.split(MEDICINE_DELIMITER).map(str::to_string).collect()
}

/// Parse a visit date in record-file format.
pub fn parse_visit_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), RECORD_DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_medicines_round_trip() {
        let lines = vec!["Paracetamol 500mg".to_string(), "Cough syrup".to_string()];
        let field = join_medicines(&lines);
        assert_eq!(field, "Paracetamol 500mg; Cough syrup");
        assert_eq!(split_medicines(&field), lines);
    }

    #[test]
    fn test_blank_lines_dropped() {
        assert_eq!(parse_medicines_text("A\n\nB"), vec!["A", "B"]);
        assert_eq!(parse_medicines_text("  \n\t\n"), Vec::<String>::new());
        assert_eq!(parse_medicines_text("A\r\nB\r\n"), vec!["A", "B"]);
    }

    #[test]
    fn test_empty_field_has_no_medicines() {
        assert!(split_medicines("").is_empty());
    }

    #[test]
    fn test_delimiter_inside_line_splits() {
        // Known limitation of the unescaped format.
        let lines = vec!["Take 1; then 2".to_string()];
        assert_eq!(split_medicines(&join_medicines(&lines)).len(), 2);
    }

    #[test]
    fn test_sex_parsing() {
        assert_eq!("M".parse::<Sex>().unwrap(), Sex::M);
        assert_eq!("F".parse::<Sex>().unwrap(), Sex::F);
        assert_eq!("Other".parse::<Sex>().unwrap(), Sex::Other);
        assert_eq!(
            "male".parse::<Sex>(),
            Err(ValidationError::InvalidSex("male".into()))
        );
    }

    #[test]
    fn test_key_matching_is_exact() {
        let record = PatientRecord::new("Asha Rao", date(2024, 3, 1));
        assert!(record.matches(&RecordKey::new("Asha Rao", date(2024, 3, 1))));
        assert!(record.matches(&RecordKey::new("  Asha Rao ", date(2024, 3, 1))));
        assert!(!record.matches(&RecordKey::new("asha rao", date(2024, 3, 1))));
        assert!(!record.matches(&RecordKey::new("Asha Rao", date(2024, 3, 2))));
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let record = PatientRecord::new("   ", date(2024, 3, 1));
        assert_eq!(record.validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_update_from_keeps_key() {
        let mut existing = PatientRecord::new("Asha Rao", date(2024, 3, 1));
        let mut incoming = PatientRecord::new("Someone Else", date(2025, 1, 1));
        incoming.age = 35;
        incoming.diagnosis = "Cold".into();
        incoming.medicines = vec!["Steam".into()];

        existing.update_from(&incoming);

        assert_eq!(existing.name, "Asha Rao");
        assert_eq!(existing.date, date(2024, 3, 1));
        assert_eq!(existing.age, 35);
        assert_eq!(existing.diagnosis, "Cold");
        assert_eq!(existing.medicines, vec!["Steam"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut record = PatientRecord::new("Asha Rao", date(2024, 3, 1));
        record.diagnosis = "Viral Fever".into();
        assert!(record.matches_search("asha"));
        assert!(record.matches_search("fever"));
        assert!(!record.matches_search("cough"));
    }

    #[test]
    fn test_parse_visit_date() {
        assert_eq!(parse_visit_date("2024-03-01").unwrap(), date(2024, 3, 1));
        assert!(parse_visit_date("01/03/2024").is_err());
    }

    proptest! {
        #[test]
        fn prop_medicines_round_trip(lines in prop::collection::vec("[A-Za-z0-9 ]{0,20}[A-Za-z0-9]", 1..8)) {
            let lines: Vec<String> = lines
                .into_iter()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect();
            prop_assume!(!lines.is_empty());
            prop_assert_eq!(split_medicines(&join_medicines(&lines)), lines);
        }
    }
}
