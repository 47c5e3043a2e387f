//! `rollbook check`: validate config files without running anything.

use std::path::PathBuf;

use crate::util::{load_corrections, load_rules};
use crate::CliError;

pub fn cmd_check(rules: Option<PathBuf>, corrections: Option<PathBuf>) -> Result<(), CliError> {
    if let Some(ref path) = rules {
        let config = load_rules(Some(path.as_path()))?;
        let r = &config.roster;
        eprintln!(
            "valid: rules {} (length {}..={}, {} placeholders, duplicate_policy = {})",
            path.display(),
            r.min_len,
            r.max_len,
            r.placeholders.len(),
            config.matching.duplicate_policy,
        );
    }

    if let Some(ref path) = corrections {
        let c = load_corrections(path)?;
        eprintln!(
            "valid: corrections {} ({} safe updates, {} id mappings, {} student emails, {} teachers, principal: {})",
            path.display(),
            c.safe_updates.len(),
            c.id_map.len(),
            c.student_emails.len(),
            c.teachers.len(),
            if c.principal.is_some() { "yes" } else { "no" },
        );
    }

    Ok(())
}
