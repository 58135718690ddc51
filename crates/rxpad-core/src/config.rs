//! Application configuration and data file locations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "RxPad";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Visit records, one row per visit.
pub const RECORDS_FILE: &str = "patient_records.csv";
/// Single-generation copy of the records file.
pub const BACKUP_FILE: &str = "patient_records.bak";
pub const SETTINGS_FILE: &str = "clinic_settings.json";
pub const SIGNATURE_FILE: &str = "signature.png";

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "rxpad=info,rxpad_core=info"
}

/// How mobile numbers are turned into share links.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhonePolicy {
    /// Country calling code prepended to local numbers
    pub country_code: String,
    /// Digit count of a local number without country code
    pub local_digits: usize,
    /// Messaging service base URL, without trailing slash
    pub service_base: String,
}

impl Default for PhonePolicy {
    fn default() -> Self {
        Self {
            country_code: "91".into(),
            local_digits: 10,
            service_base: "https://wa.me".into(),
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Directory holding the records, backup, settings and signature files
    pub data_dir: PathBuf,
    pub phone: PhonePolicy,
    /// Pause between the shutdown notice and process exit
    #[serde(with = "secs")]
    pub exit_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            phone: PhonePolicy::default(),
            exit_delay: Duration::from_secs(3),
        }
    }
}

impl AppConfig {
    /// Config rooted at `data_dir` with default policy.
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join(RECORDS_FILE)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.data_dir.join(BACKUP_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    pub fn signature_path(&self) -> PathBuf {
        self.data_dir.join(SIGNATURE_FILE)
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_under_data_dir() {
        let config = AppConfig::with_data_dir("/tmp/clinic");
        assert_eq!(config.records_path(), PathBuf::from("/tmp/clinic/patient_records.csv"));
        assert_eq!(config.backup_path(), PathBuf::from("/tmp/clinic/patient_records.bak"));
        assert_eq!(config.settings_path(), PathBuf::from("/tmp/clinic/clinic_settings.json"));
        assert_eq!(config.signature_path(), PathBuf::from("/tmp/clinic/signature.png"));
    }

    #[test]
    fn test_default_phone_policy() {
        let policy = PhonePolicy::default();
        assert_eq!(policy.country_code, "91");
        assert_eq!(policy.local_digits, 10);
    }

    #[test]
    fn test_config_json() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"exit_delay\":3"));
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
