//! Command-line definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rxpad_core::models::{parse_visit_date, RecordKey, Sex};
use rxpad_core::{AppConfig, ClinicSettings, PatientRecord};

#[derive(Parser)]
#[command(name = "rxpad")]
#[command(version)]
#[command(about = "Record patient visits and print prescriptions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding records, settings and signature
    #[arg(long, env = "RXPAD_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Country code prefixed to local mobile numbers in share links
    #[arg(long, env = "RXPAD_COUNTRY_CODE", default_value = "91", value_parser = parse_country_code)]
    pub country_code: String,

    /// Digit count of a local mobile number
    #[arg(long, default_value_t = 10)]
    pub local_digits: usize,

    /// Seconds to wait after the shutdown notice
    #[arg(long, default_value_t = 3)]
    pub exit_delay: u64,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::with_data_dir(&self.data_dir);
        config.phone.country_code = self.country_code.clone();
        config.phone.local_digits = self.local_digits;
        config.exit_delay = std::time::Duration::from_secs(self.exit_delay);
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List visits, newest first, or search by name/diagnosis
    History {
        /// Case-insensitive name or diagnosis substring
        query: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Save a visit (creates or updates by name and date)
    Save(VisitArgs),

    /// Delete a visit
    Delete(KeyArgs),

    /// Restore the records file from before the last change
    Undo,

    /// Write the prescription PDF for a saved visit
    Pdf {
        #[command(flatten)]
        key: KeyArgs,

        /// Output path (defaults to Rx_<name>.pdf in the current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the share link for a saved visit
    Share(KeyArgs),

    /// Show or change the clinic profile
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Store a PNG signature printed on prescriptions
    Signature {
        /// PNG file
        path: PathBuf,
    },

    /// Interactive session with a working form
    Shell,
}

#[derive(Args, Clone)]
pub struct KeyArgs {
    /// Patient name
    #[arg(long)]
    pub name: String,

    /// Visit date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub date: NaiveDate,
}

impl KeyArgs {
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.name, self.date)
    }
}

#[derive(Args, Clone)]
pub struct VisitArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    #[arg(long, default_value_t = 0)]
    pub age: u32,

    /// M, F or Other
    #[arg(long, default_value = "M", value_parser = parse_sex)]
    pub sex: Sex,

    #[arg(long, default_value = "")]
    pub mobile: String,

    #[arg(long, default_value = "")]
    pub diagnosis: String,

    /// One medicine; repeat for more
    #[arg(short, long = "medicine")]
    pub medicines: Vec<String>,
}

impl VisitArgs {
    pub fn record(&self) -> PatientRecord {
        PatientRecord {
            date: self.key.date,
            name: self.key.name.trim().to_string(),
            age: self.age,
            sex: self.sex,
            mobile: self.mobile.clone(),
            diagnosis: self.diagnosis.clone(),
            medicines: self
                .medicines
                .iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the current profile
    Show,

    /// Change profile fields; unspecified fields keep their value
    Set(SettingsArgs),
}

#[derive(Args, Default)]
pub struct SettingsArgs {
    #[arg(long)]
    pub doctor_name: Option<String>,
    #[arg(long)]
    pub degrees: Option<String>,
    #[arg(long)]
    pub registration: Option<String>,
    #[arg(long)]
    pub clinic_name: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub contact: Option<String>,
}

impl SettingsArgs {
    /// Apply the given fields on top of `current`.
    pub fn apply(self, current: &ClinicSettings) -> ClinicSettings {
        let current = current.clone();
        ClinicSettings {
            doctor_name: self.doctor_name.unwrap_or(current.doctor_name),
            degrees: self.degrees.unwrap_or(current.degrees),
            registration: self.registration.unwrap_or(current.registration),
            clinic_name: self.clinic_name.unwrap_or(current.clinic_name),
            address: self.address.unwrap_or(current.address),
            contact: self.contact.unwrap_or(current.contact),
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    parse_visit_date(s).map_err(|e| e.to_string())
}

fn parse_sex(s: &str) -> Result<Sex, String> {
    s.parse::<Sex>().map_err(|e| e.to_string())
}

fn parse_country_code(s: &str) -> Result<String, String> {
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        Ok(s.to_string())
    } else {
        Err(format!("country code must be digits only, got {s:?}"))
    }
}
