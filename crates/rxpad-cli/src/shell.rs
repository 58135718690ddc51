//! Interactive session over a working form.

use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use chrono::NaiveDate;
use rxpad_core::models::{parse_visit_date, Sex};
use rxpad_core::{
    Clinic, DeleteOutcome, FormState, HistoryRow, RestoreOutcome, UpsertOutcome,
};
use thiserror::Error;
use tracing::debug;

use crate::render::{print_form, print_history};

const HELP: &str = "\
commands:
  new                      clear the form
  show                     print the form
  set <field> <value>      field: name, age, sex, mobile, date, diagnosis
  meds                     enter medicines, one per line, end with a lone '.'
  save                     save the form
  delete                   delete the visit matching the form's name and date
  undo                     undo the last save or delete
  history [query]          list visits (newest first) or search
  open <n>                 load row n of the last listing into the form
  pdf [path]               write the prescription PDF
  share                    print the share link
  exit                     close the session";

/// Shell command errors; reported and the session continues.
#[derive(Error, Debug, PartialEq)]
pub enum ShellError {
    #[error("unknown command {0:?} (try 'help')")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("unknown field {0:?}")]
    UnknownField(String),

    #[error("invalid value: {0}")]
    BadValue(String),

    #[error("no row {0} in the last listing")]
    NoSuchRow(usize),
}

/// What the loop should do after a command.
#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Exit,
}

/// A running interactive session.
pub struct Shell<'a, R, W> {
    clinic: &'a Clinic,
    form: FormState,
    listing: Vec<HistoryRow>,
    input: R,
    out: W,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(clinic: &'a Clinic, input: R, out: W) -> Self {
        Self::with_clock(clinic, input, out, local_today)
    }

    fn with_clock(clinic: &'a Clinic, input: R, out: W, today: fn() -> NaiveDate) -> Self {
        Self {
            clinic,
            form: FormState::new(today()),
            listing: Vec::new(),
            input,
            out,
            today,
        }
    }

    /// Read and run commands until `exit` or end of input.
    pub fn run(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "{}: type 'help' for commands", self.clinic.settings().clinic_name)?;
        loop {
            write!(self.out, "rx> ")?;
            self.out.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(());
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match self.dispatch(line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => {
                    self.shutdown()?;
                    return Ok(());
                }
                Err(e) => writeln!(self.out, "error: {e:#}")?,
            }
        }
    }

    fn shutdown(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "SHUTTING DOWN...")?;
        writeln!(self.out, "You can safely close this window now.")?;
        self.out.flush()?;
        std::thread::sleep(self.clinic.config().exit_delay);
        Ok(())
    }

    fn dispatch(&mut self, line: &str) -> anyhow::Result<Flow> {
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        debug!(cmd, "shell command");

        match cmd {
            "help" => writeln!(self.out, "{HELP}")?,
            "new" => {
                self.form.clear((self.today)());
                writeln!(self.out, "form cleared")?;
            }
            "show" => print_form(&mut self.out, &self.form)?,
            "set" => {
                let (field, value) = rest
                    .split_once(' ')
                    .map(|(f, v)| (f, v.trim()))
                    .unwrap_or((rest, ""));
                if field.is_empty() {
                    return Err(ShellError::Usage("set <field> <value>").into());
                }
                self.set_field(field, value)?;
            }
            "meds" => self.read_medicines()?,
            "save" => match self.clinic.save(&self.form)? {
                UpsertOutcome::Created => writeln!(self.out, "saved {}", self.form.name.trim())?,
                UpsertOutcome::Updated => writeln!(self.out, "updated {}", self.form.name.trim())?,
            },
            "delete" => match self.clinic.delete(&mut self.form, (self.today)())? {
                DeleteOutcome::Deleted(_) => writeln!(self.out, "deleted")?,
                DeleteOutcome::NotFound => writeln!(self.out, "no saved visit matches this form")?,
            },
            "undo" => match self.clinic.undo(&mut self.form)? {
                RestoreOutcome::Restored => writeln!(self.out, "undo successful")?,
                RestoreOutcome::NoBackup => writeln!(self.out, "nothing to undo")?,
            },
            "history" => {
                self.listing = self.clinic.history(rest)?;
                print_history(&mut self.out, &self.listing)?;
            }
            "open" => {
                let n: usize = rest
                    .parse()
                    .map_err(|_| ShellError::Usage("open <n>"))?;
                let row = n
                    .checked_sub(1)
                    .and_then(|i| self.listing.get(i))
                    .ok_or(ShellError::NoSuchRow(n))?
                    .clone();
                if self.clinic.select(&mut self.form, &row) {
                    print_form(&mut self.out, &self.form)?;
                } else {
                    writeln!(self.out, "already open")?;
                }
            }
            "pdf" => {
                let path = if rest.is_empty() {
                    PathBuf::from(self.clinic.file_name(&self.form))
                } else {
                    PathBuf::from(rest)
                };
                let bytes = self.clinic.render(&self.form)?;
                fs::write(&path, bytes)?;
                writeln!(self.out, "wrote {}", path.display())?;
            }
            "share" => match self.clinic.share_link(&self.form) {
                Some(link) => {
                    if let Some(warning) = &link.warning {
                        writeln!(self.out, "warning: {warning}")?;
                    }
                    writeln!(self.out, "{}", link.url)?;
                }
                None => writeln!(self.out, "share unavailable: no mobile number")?,
            },
            "exit" | "quit" => return Ok(Flow::Exit),
            other => return Err(ShellError::UnknownCommand(other.to_string()).into()),
        }
        Ok(Flow::Continue)
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), ShellError> {
        let bad = |e: &dyn std::fmt::Display| ShellError::BadValue(e.to_string());
        match field {
            "name" => self.form.name = value.to_string(),
            "age" => self.form.age = value.parse().map_err(|e| bad(&e))?,
            "sex" => self.form.sex = value.parse::<Sex>().map_err(|e| bad(&e))?,
            "mobile" => self.form.mobile = value.to_string(),
            "date" => self.form.date = parse_visit_date(value).map_err(|e| bad(&e))?,
            "diagnosis" => self.form.diagnosis = value.to_string(),
            other => return Err(ShellError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    fn read_medicines(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "enter medicines, one per line; '.' to finish")?;
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim() == "." {
                break;
            }
            lines.push(line.to_string());
        }
        self.form.medicines = lines.join("\n");
        writeln!(self.out, "{} medicine line(s)", self.form.medicine_lines().len())?;
        Ok(())
    }
}
