//! Clinic and doctor profile.

use serde::{Deserialize, Serialize};

/// Clinic settings printed on every prescription.
///
/// Field names on disk follow the existing settings file, so older files
/// keep loading. Keys missing from a file fall back to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClinicSettings {
    #[serde(rename = "doc_name")]
    pub doctor_name: String,
    #[serde(rename = "doc_degree")]
    pub degrees: String,
    #[serde(rename = "doc_reg")]
    pub registration: String,
    pub clinic_name: String,
    pub address: String,
    pub contact: String,
}

impl Default for ClinicSettings {
    fn default() -> Self {
        Self {
            doctor_name: "Dr. Your Name".into(),
            degrees: "MBBS, MD".into(),
            registration: "Reg No: 12345".into(),
            clinic_name: "My Clinic".into(),
            address: "Clinic Address City".into(),
            contact: "Ph: 9876543210".into(),
        }
    }
}
