use std::collections::{HashMap, HashSet};

use crate::config::DuplicatePolicy;
use crate::model::{
    DuplicateKey, KeyIndex, MatchOutput, MatchedRecord, NameMismatch, StudentRecord,
};
use crate::normalize::{canonical_key, same_tokens};

// ---------------------------------------------------------------------------
// Target indexes
// ---------------------------------------------------------------------------

impl DuplicatePolicy {
    /// Reduce the records sharing one key to the record the index keeps.
    pub fn resolve<'a>(self, group: &[&'a StudentRecord]) -> Option<&'a StudentRecord> {
        match self {
            Self::LastWins => group.last().copied(),
            Self::FirstWins => group.first().copied(),
        }
    }
}

/// Canonical key → target record, for one of the two lookup fields.
///
/// Empty keys are never indexed.
pub struct TargetIndex<'a> {
    pub index: KeyIndex,
    map: HashMap<String, &'a StudentRecord>,
    pub duplicates: Vec<DuplicateKey>,
}

impl<'a> TargetIndex<'a> {
    pub fn build(target: &'a [StudentRecord], index: KeyIndex, policy: DuplicatePolicy) -> Self {
        // Group in first-seen key order so duplicate reports are stable.
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<&'a StudentRecord>> = HashMap::new();
        for record in target {
            let key = key_for(record, index);
            if key.is_empty() {
                continue;
            }
            let group = groups.entry(key.clone()).or_default();
            if group.is_empty() {
                order.push(key);
            }
            group.push(record);
        }

        let mut map = HashMap::with_capacity(groups.len());
        let mut duplicates = Vec::new();
        for key in order {
            let Some(group) = groups.remove(&key) else {
                continue;
            };
            let Some(kept) = policy.resolve(&group) else {
                continue;
            };
            if group.len() > 1 {
                log::warn!(
                    "{} key '{}' shared by {} target records; keeping '{}' ({})",
                    index,
                    key,
                    group.len(),
                    kept.source_id,
                    policy,
                );
                duplicates.push(DuplicateKey {
                    index,
                    key: key.clone(),
                    count: group.len(),
                    kept_id: kept.source_id.clone(),
                    record_ids: group.iter().map(|r| r.source_id.clone()).collect(),
                });
            }
            map.insert(key, kept);
        }

        Self { index, map, duplicates }
    }

    pub fn get(&self, key: &str) -> Option<&'a StudentRecord> {
        if key.is_empty() {
            return None;
        }
        self.map.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn key_for(record: &StudentRecord, index: KeyIndex) -> String {
    match index {
        KeyIndex::EnglishName => canonical_key(&record.english_name),
        KeyIndex::FullName => canonical_key(&record.full_name),
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Classify every source record against the target collection.
///
/// Lookup tries the English name first, then the full name; the first hit
/// wins. A hit is a match when the full names agree token for token,
/// otherwise a name mismatch. Target records no source record reaches are
/// orphans.
pub fn match_records(
    source: &[StudentRecord],
    target: &[StudentRecord],
    policy: DuplicatePolicy,
) -> MatchOutput {
    let by_english = TargetIndex::build(target, KeyIndex::EnglishName, policy);
    let by_full = TargetIndex::build(target, KeyIndex::FullName, policy);

    let mut out = MatchOutput::default();
    let mut visited: HashSet<String> = HashSet::new();

    for record in source {
        let english = canonical_key(&record.english_name);
        let full = canonical_key(&record.full_name);

        let hit = by_english.get(&english).or_else(|| by_full.get(&full));

        let Some(found) = hit else {
            log::debug!("not in target: '{}' ({})", record.full_name, record.source_id);
            out.not_in_target.push(record.clone());
            continue;
        };

        let found_english = canonical_key(&found.english_name);
        if !found_english.is_empty() {
            visited.insert(found_english);
        }

        let found_full = canonical_key(&found.full_name);
        if same_tokens(&found_full, &full) {
            let reordered = found_full != full;
            if reordered {
                log::info!(
                    "matched with reordered name: target '{}' vs source '{}'",
                    found.full_name,
                    record.full_name
                );
            }
            out.matches.push(MatchedRecord {
                target_id: found.source_id.clone(),
                full_name: found.full_name.clone(),
                english_name: found.english_name.clone(),
                source_id: record.source_id.clone(),
                grade: record.grade.clone(),
                reordered,
            });
        } else {
            log::debug!(
                "name mismatch: target '{}' vs source '{}'",
                found.full_name,
                record.full_name
            );
            out.name_mismatches.push(NameMismatch {
                target_id: found.source_id.clone(),
                target_full_name: found.full_name.clone(),
                target_english_name: found.english_name.clone(),
                source_full_name: record.full_name.clone(),
                source_english_name: record.english_name.clone(),
                source_id: record.source_id.clone(),
                grade: record.grade.clone(),
            });
        }
    }

    out.orphans = find_orphans(source, target, &visited);

    out.duplicate_keys = by_english.duplicates;
    out.duplicate_keys.extend(by_full.duplicates);
    out
}

/// Target records whose English key was never reached by a lookup and that
/// no source record names by full name or English name either.
pub fn find_orphans(
    source: &[StudentRecord],
    target: &[StudentRecord],
    visited: &HashSet<String>,
) -> Vec<StudentRecord> {
    let source_full: HashSet<String> = source
        .iter()
        .map(|r| canonical_key(&r.full_name))
        .filter(|k| !k.is_empty())
        .collect();
    let source_english: HashSet<String> = source
        .iter()
        .map(|r| canonical_key(&r.english_name))
        .filter(|k| !k.is_empty())
        .collect();

    target
        .iter()
        .filter(|t| {
            let english = canonical_key(&t.english_name);
            if !english.is_empty() && visited.contains(&english) {
                return false;
            }
            let full = canonical_key(&t.full_name);
            let named_by_source = (!full.is_empty() && source_full.contains(&full))
                || (!english.is_empty() && source_english.contains(&english));
            !named_by_source
        })
        .cloned()
        .collect()
}
