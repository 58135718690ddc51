//! Session handlers tying the form to the stores and the renderer.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;
use crate::export::{build_share_link, load_signature, prescription_file_name, render_prescription};
use crate::export::{RenderError, ShareLink};
use crate::models::{ClinicSettings, FormState, PatientRecord};
use crate::store::{
    write_replacing, DeleteOutcome, HistoryRow, RecordStore, RestoreOutcome, SettingsStore, StoreError,
    UpsertOutcome,
};

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Session errors.
#[derive(Error, Debug)]
pub enum ClinicError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Signature must be a PNG image")]
    NotPng,
}

pub type ClinicResult<T> = Result<T, ClinicError>;

/// One running session over a data directory.
///
/// Settings are read once when the session opens and replaced when saved.
pub struct Clinic {
    config: AppConfig,
    records: RecordStore,
    settings_store: SettingsStore,
    settings: ClinicSettings,
}

impl Clinic {
    /// Open a session on the configured data directory.
    pub fn open(config: AppConfig) -> Self {
        let records = RecordStore::from_config(&config);
        let settings_store = SettingsStore::from_config(&config);
        let settings = settings_store.load();
        info!(data_dir = %config.data_dir.display(), "opened clinic");
        Self {
            config,
            records,
            settings_store,
            settings,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn settings(&self) -> &ClinicSettings {
        &self.settings
    }

    /// Persist the form as a visit record.
    pub fn save(&self, form: &FormState) -> ClinicResult<UpsertOutcome> {
        let record = form.to_record().map_err(StoreError::from)?;
        Ok(self.records.upsert(&record)?)
    }

    /// Delete the visit the form describes; the form is reset on success.
    pub fn delete(&self, form: &mut FormState, today: NaiveDate) -> ClinicResult<DeleteOutcome> {
        let outcome = self.records.delete(&form.key())?;
        if let DeleteOutcome::Deleted(_) = outcome {
            form.clear(today);
        }
        Ok(outcome)
    }

    /// Undo the last mutation.
    ///
    /// A restored table invalidates the form's history row selection; the
    /// field values themselves are kept.
    pub fn undo(&self, form: &mut FormState) -> ClinicResult<RestoreOutcome> {
        let outcome = self.records.restore_from_backup()?;
        if outcome == RestoreOutcome::Restored {
            form.forget_selection();
        }
        Ok(outcome)
    }

    /// History rows for the search box.
    pub fn history(&self, query: &str) -> ClinicResult<Vec<HistoryRow>> {
        Ok(self.records.find_rows(query)?)
    }

    /// Load a history row into the form.
    pub fn select(&self, form: &mut FormState, row: &HistoryRow) -> bool {
        form.select(row.row, &row.record)
    }

    /// Replace the clinic profile.
    pub fn update_settings(&mut self, settings: ClinicSettings) -> ClinicResult<()> {
        self.settings_store.save(&settings)?;
        self.settings = settings;
        Ok(())
    }

    /// Store the doctor's signature image.
    pub fn save_signature(&self, png: &[u8]) -> ClinicResult<()> {
        if !png.starts_with(&PNG_MAGIC) {
            return Err(ClinicError::NotPng);
        }
        write_replacing(&self.config.signature_path(), png)?;
        info!("saved signature image");
        Ok(())
    }

    /// Render the form as a prescription PDF.
    pub fn render(&self, form: &FormState) -> ClinicResult<Vec<u8>> {
        self.render_record(&form.as_record())
    }

    /// Render any record with the current clinic profile and signature.
    pub fn render_record(&self, record: &PatientRecord) -> ClinicResult<Vec<u8>> {
        let signature = load_signature(&self.config.signature_path());
        Ok(render_prescription(&self.settings, record, signature.as_deref())?)
    }

    /// File name for the rendered document.
    pub fn file_name(&self, form: &FormState) -> String {
        prescription_file_name(&form.name)
    }

    /// Share link for the form's mobile number, if it has one.
    pub fn share_link(&self, form: &FormState) -> Option<ShareLink> {
        self.share_link_for(&form.mobile, &form.name)
    }

    pub fn share_link_for(&self, mobile: &str, patient_name: &str) -> Option<ShareLink> {
        build_share_link(mobile, patient_name, &self.settings.doctor_name, &self.config.phone)
    }
}
