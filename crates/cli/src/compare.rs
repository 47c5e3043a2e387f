//! `rollbook compare`: masterlist vs database export.

use std::collections::BTreeMap;
use std::path::PathBuf;

use rollbook_recon::model::ReconResult;
use rollbook_recon::{ReconInput, StudentRecord};

use crate::exit_codes::EXIT_NEEDS_REVIEW;
use crate::util::{load_rules, pad_right, write_or_print};
use crate::CliError;

const NAME_WIDTH: usize = 28;

pub fn cmd_compare(
    masterlist_path: PathBuf,
    database_path: PathBuf,
    output: Option<PathBuf>,
    rules_path: Option<PathBuf>,
    json_output: bool,
    strict: bool,
) -> Result<(), CliError> {
    let rules = load_rules(rules_path.as_deref())?;

    // Masterlist entries carry `student_id` and extra columns; both shapes
    // deserialize as StudentRecord.
    let source: Vec<StudentRecord> = rollbook_io::json::import(&masterlist_path)?;
    let target: Vec<StudentRecord> = rollbook_io::json::import(&database_path)?;
    log::info!(
        "loaded {} masterlist and {} database records",
        source.len(),
        target.len()
    );

    let input = ReconInput { source, target };
    let result = rollbook_recon::run(rules.matching.duplicate_policy, &input);

    if let Some(ref path) = output {
        rollbook_io::json::export(&result, path)?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        let json_str = rollbook_io::json::to_pretty_string(&result)?;
        write_or_print(None, &format!("{json_str}\n"))?;
    } else {
        print_report(&result);
    }

    if strict && !result.summary.is_clean() {
        return Err(CliError::new(EXIT_NEEDS_REVIEW, "reconciliation needs review")
            .with_hint("rerun without --strict to accept, or fix the records listed above"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Human report (stderr)
// ---------------------------------------------------------------------------

fn print_report(result: &ReconResult) {
    let s = &result.summary;
    eprintln!(
        "{} masterlist / {} database records: {} matched, {} name mismatches, {} not in database, {} only in database",
        s.source_records, s.target_records, s.matches, s.name_mismatches, s.not_in_target, s.orphans,
    );

    let reordered: Vec<_> = result.matches.iter().filter(|m| m.reordered).collect();
    if !reordered.is_empty() {
        eprintln!();
        eprintln!("REORDERED NAMES (matched, database -> masterlist)");
        for m in reordered {
            eprintln!("  {} [{}] grade {}", m.full_name, m.target_id, m.grade);
        }
    }

    if !result.name_mismatches.is_empty() {
        eprintln!();
        eprintln!("NAME MISMATCHES (database -> masterlist)");
        for m in &result.name_mismatches {
            eprintln!(
                "  {} -> {} [{}] grade {}",
                pad_right(&format!("{} ({})", m.target_full_name, m.target_english_name), NAME_WIDTH),
                m.source_full_name,
                m.target_id,
                m.grade,
            );
        }
    }

    if !result.not_in_target.is_empty() {
        eprintln!();
        eprintln!("NOT IN DATABASE");
        for ((_, grade), students) in by_grade(&result.not_in_target) {
            eprintln!("  Grade {grade}: {} students", students.len());
            for student in students {
                eprintln!("    - {} ({})", student.full_name, student.english_name);
            }
        }
    }

    if !result.orphans.is_empty() {
        eprintln!();
        eprintln!("ONLY IN DATABASE");
        for orphan in &result.orphans {
            eprintln!(
                "  - Grade {}: {} ({})",
                orphan.grade, orphan.full_name, orphan.english_name
            );
        }
    }

    if !result.duplicate_keys.is_empty() {
        eprintln!();
        eprintln!("DUPLICATE KEYS ({} policy)", result.meta.duplicate_policy);
        for d in &result.duplicate_keys {
            eprintln!(
                "  {} '{}': {} records, kept {}",
                d.index, d.key, d.count, d.kept_id
            );
        }
    }
}

/// Group by numeric grade, ascending; unparseable grades sort last.
fn by_grade(records: &[StudentRecord]) -> BTreeMap<(u32, &str), Vec<&StudentRecord>> {
    let mut groups: BTreeMap<(u32, &str), Vec<&StudentRecord>> = BTreeMap::new();
    for r in records {
        let order = r.grade.trim().parse().unwrap_or(u32::MAX);
        groups.entry((order, r.grade.as_str())).or_default().push(r);
    }
    groups
}
