//! RxPad Core Library
//!
//! Single-clinician visit records and printable prescriptions.
//!
//! # Architecture
//!
//! ```text
//!   Form State ──Save──▶ Record Store ──▶ patient_records.csv
//!       │                     │
//!       │                 snapshot ──▶ patient_records.bak ──Undo──┐
//!       │                                                          │
//!       │                     ◀────────────────────────────────────┘
//!       │
//!       ├──▶ Layout ──▶ PDF Renderer ◀── Settings Store (clinic_settings.json)
//!       │                    ▲
//!       │                    └── signature.png
//!       │
//!       └──▶ Share-Link Builder ──▶ https://wa.me/<digits>?text=...
//! ```
//!
//! # Modules
//!
//! - [`models`]: Domain types (PatientRecord, ClinicSettings, FormState)
//! - [`store`]: Record file, backup snapshot and settings file
//! - [`export`]: Page layout, PDF output and share links
//! - [`clinic`]: Session handlers wiring the form to the stores
//! - [`config`]: Data file locations and phone policy

pub mod clinic;
pub mod config;
pub mod export;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use clinic::{Clinic, ClinicError, ClinicResult};
pub use config::{AppConfig, PhonePolicy};
pub use export::{build_share_link, render_prescription, RenderError, ShareLink, ShareWarning};
pub use models::{ClinicSettings, FormState, PatientRecord, RecordKey, Sex, ValidationError};
pub use store::{
    DeleteOutcome, HistoryRow, RecordStore, RestoreOutcome, SettingsStore, StoreError,
    UpsertOutcome,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum RxPadError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Render error: {0}")]
    RenderError(String),
}

impl From<ClinicError> for RxPadError {
    fn from(e: ClinicError) -> Self {
        match e {
            ClinicError::Store(StoreError::Validation(v)) => RxPadError::InvalidInput(v.to_string()),
            ClinicError::Store(s) => RxPadError::StorageError(s.to_string()),
            ClinicError::Render(r) => RxPadError::RenderError(r.to_string()),
            ClinicError::NotPng => RxPadError::InvalidInput(ClinicError::NotPng.to_string()),
        }
    }
}

impl From<StoreError> for RxPadError {
    fn from(e: StoreError) -> Self {
        ClinicError::from(e).into()
    }
}

impl From<ValidationError> for RxPadError {
    fn from(e: ValidationError) -> Self {
        RxPadError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for RxPadError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        RxPadError::StorageError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open a clinic session over the given data directory.
///
/// `country_code` overrides the default share-link prefix.
#[uniffi::export]
pub fn open_clinic(
    data_dir: String,
    country_code: Option<String>,
) -> Result<Arc<RxPadCore>, RxPadError> {
    let mut config = AppConfig::with_data_dir(data_dir);
    if let Some(code) = country_code {
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(RxPadError::InvalidInput(format!("bad country code {code:?}")));
        }
        config.phone.country_code = code;
    }
    Ok(Arc::new(RxPadCore {
        clinic: Arc::new(Mutex::new(Clinic::open(config))),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe session wrapper for FFI.
#[derive(uniffi::Object)]
pub struct RxPadCore {
    clinic: Arc<Mutex<Clinic>>,
}

#[uniffi::export]
impl RxPadCore {
    // =========================================================================
    // Record Operations
    // =========================================================================

    /// History rows; newest first when `query` is empty.
    pub fn list_history(&self, query: String) -> Result<Vec<FfiHistoryRow>, RxPadError> {
        let clinic = self.clinic.lock()?;
        let rows = clinic.history(&query)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert or update a visit keyed by (name, date).
    pub fn save_record(&self, record: FfiPatientRecord) -> Result<FfiSaveOutcome, RxPadError> {
        let clinic = self.clinic.lock()?;
        let record = PatientRecord::try_from(record)?;
        let outcome = clinic.records().upsert(&record)?;
        Ok(outcome.into())
    }

    /// Delete a visit. Returns the number of rows removed.
    pub fn delete_record(&self, name: String, date: String) -> Result<u32, RxPadError> {
        let clinic = self.clinic.lock()?;
        let key = RecordKey::new(&name, models::parse_visit_date(&date)?);
        match clinic.records().delete(&key)? {
            DeleteOutcome::Deleted(n) => Ok(n as u32),
            DeleteOutcome::NotFound => Ok(0),
        }
    }

    /// Undo the last change. Returns false when there is no backup.
    pub fn undo(&self) -> Result<bool, RxPadError> {
        let clinic = self.clinic.lock()?;
        Ok(clinic.records().restore_from_backup()? == RestoreOutcome::Restored)
    }

    // =========================================================================
    // Profile Operations
    // =========================================================================

    pub fn get_settings(&self) -> Result<FfiClinicSettings, RxPadError> {
        let clinic = self.clinic.lock()?;
        Ok(clinic.settings().clone().into())
    }

    pub fn update_settings(&self, settings: FfiClinicSettings) -> Result<(), RxPadError> {
        let mut clinic = self.clinic.lock()?;
        clinic.update_settings(settings.into())?;
        Ok(())
    }

    /// Store a PNG signature to print on prescriptions.
    pub fn save_signature(&self, png: Vec<u8>) -> Result<(), RxPadError> {
        let clinic = self.clinic.lock()?;
        clinic.save_signature(&png)?;
        Ok(())
    }

    // =========================================================================
    // Document Operations
    // =========================================================================

    /// Render a prescription PDF.
    pub fn render_pdf(&self, record: FfiPatientRecord) -> Result<Vec<u8>, RxPadError> {
        let clinic = self.clinic.lock()?;
        let record = PatientRecord::try_from(record)?;
        Ok(clinic.render_record(&record)?)
    }

    pub fn pdf_file_name(&self, patient_name: String) -> String {
        export::prescription_file_name(&patient_name)
    }

    /// Share link, or None when the mobile number has no digits.
    pub fn share_link(
        &self,
        mobile: String,
        patient_name: String,
    ) -> Result<Option<FfiShareLink>, RxPadError> {
        let clinic = self.clinic.lock()?;
        Ok(clinic.share_link_for(&mobile, &patient_name).map(Into::into))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe visit record. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientRecord {
    pub date: String,
    pub name: String,
    pub age: u32,
    pub sex: String,
    pub mobile: String,
    pub diagnosis: String,
    pub medicines: Vec<String>,
}

impl From<PatientRecord> for FfiPatientRecord {
    fn from(record: PatientRecord) -> Self {
        Self {
            date: record.date.format(models::RECORD_DATE_FORMAT).to_string(),
            name: record.name,
            age: record.age,
            sex: record.sex.to_string(),
            mobile: record.mobile,
            diagnosis: record.diagnosis,
            medicines: record.medicines,
        }
    }
}

impl TryFrom<FfiPatientRecord> for PatientRecord {
    type Error = ValidationError;

    fn try_from(record: FfiPatientRecord) -> Result<Self, Self::Error> {
        Ok(PatientRecord {
            date: models::parse_visit_date(&record.date)?,
            name: record.name,
            age: record.age,
            sex: record.sex.parse()?,
            mobile: record.mobile,
            diagnosis: record.diagnosis,
            medicines: record
                .medicines
                .into_iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
        })
    }
}

/// FFI-safe history row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiHistoryRow {
    pub row: u32,
    pub record: FfiPatientRecord,
}

impl From<HistoryRow> for FfiHistoryRow {
    fn from(row: HistoryRow) -> Self {
        Self {
            row: row.row as u32,
            record: row.record.into(),
        }
    }
}

/// FFI-safe clinic profile.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClinicSettings {
    pub doctor_name: String,
    pub degrees: String,
    pub registration: String,
    pub clinic_name: String,
    pub address: String,
    pub contact: String,
}

impl From<ClinicSettings> for FfiClinicSettings {
    fn from(s: ClinicSettings) -> Self {
        Self {
            doctor_name: s.doctor_name,
            degrees: s.degrees,
            registration: s.registration,
            clinic_name: s.clinic_name,
            address: s.address,
            contact: s.contact,
        }
    }
}

impl From<FfiClinicSettings> for ClinicSettings {
    fn from(s: FfiClinicSettings) -> Self {
        ClinicSettings {
            doctor_name: s.doctor_name,
            degrees: s.degrees,
            registration: s.registration,
            clinic_name: s.clinic_name,
            address: s.address,
            contact: s.contact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiSaveOutcome {
    Created,
    Updated,
}

impl From<UpsertOutcome> for FfiSaveOutcome {
    fn from(outcome: UpsertOutcome) -> Self {
        match outcome {
            UpsertOutcome::Created => FfiSaveOutcome::Created,
            UpsertOutcome::Updated => FfiSaveOutcome::Updated,
        }
    }
}

/// FFI-safe share link.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiShareLink {
    pub number: String,
    pub url: String,
    /// Human-readable warning for odd-looking numbers
    pub warning: Option<String>,
}

impl From<ShareLink> for FfiShareLink {
    fn from(link: ShareLink) -> Self {
        Self {
            number: link.number,
            url: link.url,
            warning: link.warning.map(|w| w.to_string()),
        }
    }
}
