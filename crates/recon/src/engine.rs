use crate::config::{DuplicatePolicy, RulesConfig};
use crate::error::ReconError;
use crate::matcher::match_records;
use crate::model::{ReconInput, ReconMeta, ReconResult};
use crate::roster::{RosterBook, RosterDocument, RosterExtractor};
use crate::summary::compute_summary;

/// Run reconciliation of `input.source` against `input.target`.
pub fn run(policy: DuplicatePolicy, input: &ReconInput) -> ReconResult {
    let output = match_records(&input.source, &input.target, policy);
    let summary = compute_summary(&output, input.source.len(), input.target.len());

    log::info!(
        "reconciled {} source / {} target records: {} matched, {} mismatched, {} missing, {} orphaned",
        summary.source_records,
        summary.target_records,
        summary.matches,
        summary.name_mismatches,
        summary.not_in_target,
        summary.orphans,
    );

    ReconResult {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            duplicate_policy: policy,
        },
        summary,
        matches: output.matches,
        name_mismatches: output.name_mismatches,
        not_in_target: output.not_in_target,
        orphans: output.orphans,
        duplicate_keys: output.duplicate_keys,
    }
}

/// Extract and deduplicate students from every document, in the order given.
pub fn build_roster(config: &RulesConfig, documents: &[RosterDocument]) -> Result<RosterBook, ReconError> {
    let extractor = RosterExtractor::new(&config.roster)?;
    let mut book = RosterBook::default();

    for doc in documents {
        let students = extractor.extract_document(&doc.cells);
        log::info!("{}: {} of {} rows kept", doc.id, students.len(), doc.cells.len());
        for student in students {
            book.add(student, &doc.id);
        }
    }

    Ok(book)
}
