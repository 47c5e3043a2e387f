use std::collections::BTreeMap;

use crate::model::{Bucket, MatchOutput, ReconSummary};

/// Compute summary statistics from match output.
pub fn compute_summary(output: &MatchOutput, source_records: usize, target_records: usize) -> ReconSummary {
    let mut bucket_counts: BTreeMap<String, usize> = BTreeMap::new();
    for (bucket, count) in [
        (Bucket::Match, output.matches.len()),
        (Bucket::NameMismatch, output.name_mismatches.len()),
        (Bucket::NotInTarget, output.not_in_target.len()),
        (Bucket::Orphan, output.orphans.len()),
    ] {
        if count > 0 {
            bucket_counts.insert(bucket.to_string(), count);
        }
    }

    ReconSummary {
        source_records,
        target_records,
        matches: output.matches.len(),
        reordered_matches: output.matches.iter().filter(|m| m.reordered).count(),
        name_mismatches: output.name_mismatches.len(),
        not_in_target: output.not_in_target.len(),
        orphans: output.orphans.len(),
        duplicate_keys: output.duplicate_keys.len(),
        bucket_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MatchedRecord, StudentRecord};

    fn matched(id: &str) -> MatchedRecord {
        MatchedRecord {
            target_id: format!("t{id}"),
            full_name: "Gyuri Lim".into(),
            english_name: "Gyuri".into(),
            source_id: id.into(),
            grade: "9".into(),
            reordered: false,
        }
    }

    #[test]
    fn summary_counts() {
        let output = MatchOutput {
            matches: vec![matched("1"), MatchedRecord { reordered: true, ..matched("2") }],
            not_in_target: vec![StudentRecord::new("3", "Sua An", "Sua", "7")],
            ..MatchOutput::default()
        };
        let summary = compute_summary(&output, 3, 2);
        assert_eq!(summary.source_records, 3);
        assert_eq!(summary.target_records, 2);
        assert_eq!(summary.matches, 2);
        assert_eq!(summary.reordered_matches, 1);
        assert_eq!(summary.not_in_target, 1);
        assert_eq!(summary.orphans, 0);
        assert_eq!(summary.bucket_counts.get("match"), Some(&2));
        assert!(!summary.bucket_counts.contains_key("orphan"));
        assert!(!summary.is_clean());
    }

    #[test]
    fn empty_output_is_clean() {
        let summary = compute_summary(&MatchOutput::default(), 0, 0);
        assert!(summary.is_clean());
        assert!(summary.bucket_counts.is_empty());
    }
}
