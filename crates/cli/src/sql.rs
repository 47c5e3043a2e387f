//! `rollbook sql`: review-first SQL scripts for the students table.

use std::path::PathBuf;

use clap::Subcommand;
use rollbook_io::emails::{missing_from_list, read_email_list};
use rollbook_io::masterlist::read_masterlist;
use rollbook_io::sql::{emails_script, final_script, updates_script, SqlScript};
use rollbook_recon::ReconResult;

use crate::util::{load_corrections, write_or_print};
use crate::CliError;

#[derive(Subcommand)]
pub enum SqlCommands {
    /// Safe renames, INSERTs for missing students, KEEP notes for orphans
    #[command(after_help = "\
Examples:
  rollbook sql updates comparison.json --corrections corrections.toml
  rollbook sql updates comparison.json --corrections corrections.toml -o update_students.sql")]
    Updates {
        /// Comparison JSON written by `rollbook compare -o`
        comparison: PathBuf,

        /// Corrections TOML (safe_updates)
        #[arg(long, env = "ROLLBOOK_CORRECTIONS")]
        corrections: PathBuf,

        /// Output SQL file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Rewrite mapped database rows from the masterlist, insert the rest
    #[command(after_help = "\
Examples:
  rollbook sql final masterlist.csv --corrections corrections.toml -o final_update_students.sql")]
    Final {
        /// Masterlist CSV export
        masterlist: PathBuf,

        /// Corrections TOML (id_map)
        #[arg(long, env = "ROLLBOOK_CORRECTIONS")]
        corrections: PathBuf,

        /// Output SQL file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Student emails, teacher accounts and the principal account
    #[command(after_help = "\
Examples:
  rollbook sql emails --corrections corrections.toml
  rollbook sql emails --corrections corrections.toml --email-list list.txt -o emails.sql")]
    Emails {
        /// Corrections TOML (student_emails, teachers, principal)
        #[arg(long, env = "ROLLBOOK_CORRECTIONS")]
        corrections: PathBuf,

        /// Pasted distribution list; mapped emails absent from it are reported
        #[arg(long)]
        email_list: Option<PathBuf>,

        /// Output SQL file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

pub fn cmd_sql(cmd: SqlCommands) -> Result<(), CliError> {
    match cmd {
        SqlCommands::Updates { comparison, corrections, output } => {
            let corrections = load_corrections(&corrections)?;
            let result: ReconResult = rollbook_io::json::import(&comparison)?;
            emit(updates_script(&result, &corrections), output)
        }
        SqlCommands::Final { masterlist, corrections, output } => {
            let corrections = load_corrections(&corrections)?;
            let entries = read_masterlist(&masterlist)?;
            emit(final_script(&entries, &corrections), output)
        }
        SqlCommands::Emails { corrections, email_list, output } => {
            let corrections = load_corrections(&corrections)?;
            if let Some(ref path) = email_list {
                let list = read_email_list(path)?;
                log::info!("{} addresses in {}", list.len(), path.display());
                for (name, email) in missing_from_list(&corrections, &list) {
                    log::warn!("{name}: {email} is not in the email list");
                }
            }
            emit(emails_script(&corrections), output)
        }
    }
}

fn emit(script: SqlScript, output: Option<PathBuf>) -> Result<(), CliError> {
    write_or_print(output.as_deref(), &script.text)?;
    let s = &script.stats;
    eprintln!(
        "{} updates, {} inserts, {} kept, {} skipped",
        s.updates, s.inserts, s.kept, s.skipped
    );
    Ok(())
}
