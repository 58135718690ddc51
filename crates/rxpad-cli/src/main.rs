//! rxpad: record patient visits and print prescriptions from the terminal.
//!
//! Usage:
//!   rxpad history [query] [--json]
//!   rxpad save --name <name> --date <YYYY-MM-DD> [--age ..] [-m <medicine>]...
//!   rxpad delete --name <name> --date <YYYY-MM-DD>
//!   rxpad undo
//!   rxpad pdf --name <name> --date <YYYY-MM-DD> [--out <file>]
//!   rxpad share --name <name> --date <YYYY-MM-DD>
//!   rxpad settings show | set [--doctor-name ..] ...
//!   rxpad signature <file.png>
//!   rxpad shell

mod cli;
mod render;
mod shell;

use std::fs;
use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use clap::Parser;
use rxpad_core::config::{default_log_filter, APP_VERSION};
use rxpad_core::export::prescription_file_name;
use rxpad_core::{Clinic, DeleteOutcome, RestoreOutcome, UpsertOutcome};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, SettingsAction};
use crate::render::{print_history, print_history_json, print_settings};
use crate::shell::Shell;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("rxpad=debug,rxpad_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_log_filter()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    info!("rxpad starting v{}", APP_VERSION);

    let mut clinic = Clinic::open(cli.config());
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::History { query, json } => {
            let rows = clinic
                .history(query.as_deref().unwrap_or(""))
                .context("Failed to read the record file")?;
            if json {
                print_history_json(&mut out, &rows)?;
            } else {
                print_history(&mut out, &rows)?;
            }
        }

        Commands::Save(args) => {
            let record = args.record();
            let outcome = clinic
                .records()
                .upsert(&record)
                .context("Failed to save the record")?;
            match outcome {
                UpsertOutcome::Created => writeln!(out, "Saved {} ({})", record.name.trim(), record.date)?,
                UpsertOutcome::Updated => writeln!(out, "Updated {} ({})", record.name.trim(), record.date)?,
            }
        }

        Commands::Delete(key) => {
            match clinic.records().delete(&key.key()).context("Failed to delete the record")? {
                DeleteOutcome::Deleted(_) => writeln!(out, "Deleted {}", key.key())?,
                DeleteOutcome::NotFound => writeln!(out, "No record for {}", key.key())?,
            }
        }

        Commands::Undo => match clinic
            .records()
            .restore_from_backup()
            .context("Failed to restore the backup")?
        {
            RestoreOutcome::Restored => writeln!(out, "Undo successful")?,
            RestoreOutcome::NoBackup => writeln!(out, "No backup found")?,
        },

        Commands::Pdf { key, out: path } => {
            let Some(record) = clinic.records().get(&key.key())? else {
                bail!("No record for {}", key.key());
            };
            let bytes = clinic
                .render_record(&record)
                .context("Failed to render the prescription")?;
            let path = path.unwrap_or_else(|| prescription_file_name(&record.name).into());
            fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
            writeln!(out, "Wrote {}", path.display())?;
        }

        Commands::Share(key) => {
            let Some(record) = clinic.records().get(&key.key())? else {
                bail!("No record for {}", key.key());
            };
            match clinic.share_link_for(&record.mobile, &record.name) {
                Some(link) => {
                    if let Some(warning) = &link.warning {
                        writeln!(out, "Warning: {warning}")?;
                    }
                    writeln!(out, "{}", link.url)?;
                }
                None => writeln!(out, "Share unavailable: no mobile number on this record")?,
            }
        }

        Commands::Settings { action } => match action {
            SettingsAction::Show => print_settings(&mut out, clinic.settings())?,
            SettingsAction::Set(args) => {
                let updated = args.apply(clinic.settings());
                clinic
                    .update_settings(updated)
                    .context("Failed to save settings")?;
                print_settings(&mut out, clinic.settings())?;
            }
        },

        Commands::Signature { path } => {
            let png = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
            clinic.save_signature(&png)?;
            writeln!(out, "Signature saved")?;
        }

        Commands::Shell => {
            drop(out);
            let stdin = io::stdin();
            Shell::new(&clinic, stdin.lock(), io::stdout().lock()).run()?;
        }
    }

    Ok(())
}
