//! `rollbook masterlist`: masterlist CSV to JSON.

use std::path::PathBuf;

use rollbook_io::masterlist::{count_by_grade, read_masterlist};

use crate::CliError;

pub fn cmd_masterlist(csv_path: PathBuf, output: PathBuf) -> Result<(), CliError> {
    let entries = read_masterlist(&csv_path)?;

    if entries.is_empty() {
        log::warn!("{}: no students in grades 6-12", csv_path.display());
    }
    for (grade, count) in count_by_grade(&entries) {
        log::info!("grade {grade}: {count} students");
    }

    rollbook_io::json::export(&entries, &output)?;
    eprintln!("{} students in grades 6-12, wrote {}", entries.len(), output.display());
    Ok(())
}
