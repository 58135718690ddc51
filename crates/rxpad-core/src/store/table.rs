//! Record file codec.
//!
//! The file is comma-separated with a fixed header, minimal quoting and
//! `\n` line endings. Medicines occupy a single field joined with `"; "`.

use csv::StringRecord;

use super::{StoreError, StoreResult};
use crate::models::{parse_visit_date, split_medicines, PatientRecord, RECORD_DATE_FORMAT};

/// Record file header, in column order.
pub const COLUMNS: [&str; 7] = [
    "Date",
    "Name",
    "Age",
    "Sex",
    "Mobile",
    "Diagnosis",
    "Medicines",
];

/// Column positions resolved from a file header.
struct ColumnLayout {
    date: usize,
    name: usize,
    age: usize,
    sex: usize,
    /// Older files were written before the mobile column existed
    mobile: Option<usize>,
    diagnosis: usize,
    medicines: usize,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> StoreResult<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| find(name).ok_or_else(|| StoreError::MissingColumn(name.to_string()));

        Ok(Self {
            date: require("Date")?,
            name: require("Name")?,
            age: require("Age")?,
            sex: require("Sex")?,
            mobile: find("Mobile"),
            diagnosis: require("Diagnosis")?,
            medicines: require("Medicines")?,
        })
    }

    fn parse_row(&self, row: &StringRecord) -> Result<PatientRecord, String> {
        let field = |idx: usize| row.get(idx).unwrap_or("");

        let name = field(self.name).to_string();
        if name.trim().is_empty() {
            return Err("empty name".into());
        }

        Ok(PatientRecord {
            date: parse_visit_date(field(self.date)).map_err(|e| e.to_string())?,
            name,
            age: parse_age(field(self.age))?,
            sex: field(self.sex).parse().map_err(|e: crate::models::ValidationError| e.to_string())?,
            mobile: self.mobile.map(field).unwrap_or("").to_string(),
            diagnosis: field(self.diagnosis).to_string(),
            medicines: split_medicines(field(self.medicines)),
        })
    }
}

/// Parse an age cell. Whole-number floats (`"34.0"`) are accepted since
/// spreadsheet tools write integer columns that way once a blank appears.
fn parse_age(cell: &str) -> Result<u32, String> {
    let cell = cell.trim();
    if let Ok(age) = cell.parse::<u32>() {
        return Ok(age);
    }
    match cell.parse::<f64>() {
        Ok(v) if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => Ok(v as u32),
        _ => Err(format!("invalid age {cell:?}")),
    }
}

/// Parse a whole record file.
///
/// Any malformed row fails the load; rows are never silently dropped.
pub fn parse_table(bytes: &[u8]) -> StoreResult<Vec<PatientRecord>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();
    let layout = ColumnLayout::from_headers(&headers)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        if row.len() != headers.len() {
            return Err(StoreError::MalformedRow {
                line,
                reason: format!("expected {} fields, found {}", headers.len(), row.len()),
            });
        }

        let record = layout
            .parse_row(&row)
            .map_err(|reason| StoreError::MalformedRow { line, reason })?;
        records.push(record);
    }

    Ok(records)
}

/// Serialize records into record file bytes, header included.
pub fn write_table(records: &[PatientRecord]) -> StoreResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(COLUMNS)?;
    for record in records {
        writer.write_record([
            record.date.format(RECORD_DATE_FORMAT).to_string(),
            record.name.clone(),
            record.age.to_string(),
            record.sex.to_string(),
            record.mobile.clone(),
            record.diagnosis.clone(),
            record.medicines_field(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| StoreError::Io(e.into_error()))
}
