//! Terminal output for history listings, the working form and settings.

use std::io::{self, Write};

use rxpad_core::{ClinicSettings, FormState, HistoryRow};
use serde::Serialize;

const NAME_WIDTH: usize = 24;
const DIAGNOSIS_WIDTH: usize = 28;

/// History row as printed by `history --json`.
#[derive(Serialize)]
pub struct HistoryEntry<'a> {
    pub row: usize,
    pub date: String,
    pub name: &'a str,
    pub age: u32,
    pub sex: &'static str,
    pub mobile: &'a str,
    pub diagnosis: &'a str,
    pub medicines: &'a [String],
}

impl<'a> From<&'a HistoryRow> for HistoryEntry<'a> {
    fn from(row: &'a HistoryRow) -> Self {
        let r = &row.record;
        Self {
            row: row.row,
            date: r.date.to_string(),
            name: &r.name,
            age: r.age,
            sex: r.sex.as_str(),
            mobile: &r.mobile,
            diagnosis: &r.diagnosis,
            medicines: &r.medicines,
        }
    }
}

fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(3)).collect();
        out.push_str("...");
        out
    }
}

/// Numbered listing; numbers are what `open <n>` takes.
pub fn print_history(out: &mut impl Write, rows: &[HistoryRow]) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "no records");
    }
    writeln!(
        out,
        "{:>3}  {:<10}  {:<NAME_WIDTH$}  {:>3}  {:<5}  {:<DIAGNOSIS_WIDTH$}",
        "#", "Date", "Name", "Age", "Sex", "Diagnosis"
    )?;
    for (i, row) in rows.iter().enumerate() {
        let r = &row.record;
        writeln!(
            out,
            "{:>3}  {:<10}  {:<NAME_WIDTH$}  {:>3}  {:<5}  {:<DIAGNOSIS_WIDTH$}",
            i + 1,
            r.date,
            clip(&r.name, NAME_WIDTH),
            r.age,
            r.sex.as_str(),
            clip(&r.diagnosis, DIAGNOSIS_WIDTH),
        )?;
    }
    Ok(())
}

pub fn print_history_json(out: &mut impl Write, rows: &[HistoryRow]) -> anyhow::Result<()> {
    let entries: Vec<HistoryEntry<'_>> = rows.iter().map(HistoryEntry::from).collect();
    serde_json::to_writer_pretty(&mut *out, &entries)?;
    writeln!(out)?;
    Ok(())
}

pub fn print_form(out: &mut impl Write, form: &FormState) -> io::Result<()> {
    writeln!(out, "Name:      {}", form.name)?;
    writeln!(out, "Age:       {}", form.age)?;
    writeln!(out, "Sex:       {}", form.sex)?;
    writeln!(out, "Mobile:    {}", form.mobile)?;
    writeln!(out, "Date:      {}", form.date)?;
    writeln!(out, "Diagnosis: {}", form.diagnosis)?;
    writeln!(out, "Medicines:")?;
    for line in form.medicine_lines() {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}

pub fn print_settings(out: &mut impl Write, settings: &ClinicSettings) -> io::Result<()> {
    writeln!(out, "Doctor:       {}", settings.doctor_name)?;
    writeln!(out, "Degrees:      {}", settings.degrees)?;
    writeln!(out, "Registration: {}", settings.registration)?;
    writeln!(out, "Clinic:       {}", settings.clinic_name)?;
    writeln!(out, "Address:      {}", settings.address)?;
    writeln!(out, "Contact:      {}", settings.contact)
}
