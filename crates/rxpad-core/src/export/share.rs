//! Messaging share links.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::config::PhonePolicy;

/// Something odd about the number that still produced a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShareWarning {
    /// Digit count matches neither a local nor a country-prefixed number
    UnusualLength(usize),
}

impl std::fmt::Display for ShareWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShareWarning::UnusualLength(n) => {
                write!(f, "mobile number has {n} digits; the link may not work")
            }
        }
    }
}

/// A ready-to-open share link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLink {
    /// Digits the link is addressed to
    pub number: String,
    pub url: String,
    pub warning: Option<ShareWarning>,
}

/// Strip non-digits and prefix the country code onto local numbers.
///
/// Returns `None` when no digits remain.
pub fn clean_mobile(mobile: &str, policy: &PhonePolicy) -> Option<String> {
    let digits: String = mobile.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    if digits.len() == policy.local_digits {
        return Some(format!("{}{}", policy.country_code, digits));
    }
    Some(digits)
}

fn check_length(number: &str, policy: &PhonePolicy) -> Option<ShareWarning> {
    let full = policy.local_digits + policy.country_code.len();
    if number.len() == full && number.starts_with(&policy.country_code) {
        None
    } else {
        Some(ShareWarning::UnusualLength(number.len()))
    }
}

/// Greeting sent along with the prescription.
pub fn share_message(patient_name: &str, doctor_name: &str) -> String {
    format!(
        "Namaste {}, please find your prescription from {} attached.",
        patient_name, doctor_name
    )
}

/// Build the share link, or `None` when the mobile number has no digits.
pub fn build_share_link(
    mobile: &str,
    patient_name: &str,
    doctor_name: &str,
    policy: &PhonePolicy,
) -> Option<ShareLink> {
    let number = clean_mobile(mobile, policy)?;
    let warning = check_length(&number, policy);
    let url = format!(
        "{}/{}?text={}",
        policy.service_base.trim_end_matches('/'),
        number,
        percent_encode(&share_message(patient_name, doctor_name))
    );
    Some(ShareLink {
        number,
        url,
        warning,
    })
}

/// Percent-encode for a query value. Unreserved characters and `/` pass
/// through; everything else is `%XX` over its UTF-8 bytes.
fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'.' | b'-' | b'~' | b'/' => {
                out.push(b as char)
            }
            _ => {
                let _ = write!(out, "%{:02X}", b);
            }
        }
    }
    out
}
