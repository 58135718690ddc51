//! Clinic settings file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{write_replacing, StoreResult};
use crate::config::AppConfig;
use crate::models::ClinicSettings;

/// Settings file holding the clinic/doctor profile.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.settings_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings file.
    ///
    /// `Ok(None)` means no file yet; a file that cannot be parsed is an
    /// error so callers can tell corruption apart from a first run.
    pub fn try_load(&self) -> StoreResult<Option<ClinicSettings>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Read the settings, falling back to defaults. Never fails.
    pub fn load(&self) -> ClinicSettings {
        match self.try_load() {
            Ok(Some(settings)) => settings,
            Ok(None) => ClinicSettings::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable settings, using defaults");
                ClinicSettings::default()
            }
        }
    }

    /// Replace the settings file wholesale.
    pub fn save(&self, settings: &ClinicSettings) -> StoreResult<()> {
        let json = serde_json::to_vec(settings)?;
        write_replacing(&self.path, &json)?;
        info!(path = %self.path.display(), "saved clinic settings");
        Ok(())
    }
}
