use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::DuplicatePolicy;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One student from any source (masterlist or database export).
///
/// `source_id` is only meaningful inside its own collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(default, alias = "id", alias = "student_id", deserialize_with = "string_or_number")]
    pub source_id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub english_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub grade: String,
}

impl StudentRecord {
    pub fn new(source_id: &str, full_name: &str, english_name: &str, grade: &str) -> Self {
        Self {
            source_id: source_id.into(),
            full_name: full_name.into(),
            english_name: english_name.into(),
            grade: grade.into(),
        }
    }

    /// English name for SQL output: the stored one, or the first token of
    /// the full name when empty.
    pub fn english_or_first_token(&self) -> &str {
        if self.english_name.is_empty() {
            self.full_name.split_whitespace().next().unwrap_or("")
        } else {
            &self.english_name
        }
    }
}

/// Database exports sometimes carry ids and grades as JSON numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Null => String::new(),
    })
}

/// The authoritative collection and the collection being reconciled against it.
pub struct ReconInput {
    pub source: Vec<StudentRecord>,
    pub target: Vec<StudentRecord>,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Match,
    NameMismatch,
    NotInTarget,
    Orphan,
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::NameMismatch => write!(f, "name_mismatch"),
            Self::NotInTarget => write!(f, "not_in_target"),
            Self::Orphan => write!(f, "orphan"),
        }
    }
}

/// Source record whose target counterpart has the same canonical full name
/// tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedRecord {
    pub target_id: String,
    pub full_name: String,
    pub english_name: String,
    pub source_id: String,
    pub grade: String,
    /// The two full names agree only after reordering their tokens.
    #[serde(default)]
    pub reordered: bool,
}

/// Same person on both sides, display names formatted differently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameMismatch {
    pub target_id: String,
    pub target_full_name: String,
    pub target_english_name: String,
    pub source_full_name: String,
    pub source_english_name: String,
    pub source_id: String,
    pub grade: String,
}

/// Which target lookup a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyIndex {
    EnglishName,
    FullName,
}

impl std::fmt::Display for KeyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnglishName => write!(f, "english_name"),
            Self::FullName => write!(f, "full_name"),
        }
    }
}

/// A canonical key produced by more than one target record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateKey {
    pub index: KeyIndex,
    pub key: String,
    pub count: usize,
    /// `source_id` of the record the duplicate policy kept.
    pub kept_id: String,
    pub record_ids: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MatchOutput {
    pub matches: Vec<MatchedRecord>,
    pub name_mismatches: Vec<NameMismatch>,
    pub not_in_target: Vec<StudentRecord>,
    pub orphans: Vec<StudentRecord>,
    pub duplicate_keys: Vec<DuplicateKey>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconSummary {
    pub source_records: usize,
    pub target_records: usize,
    pub matches: usize,
    /// Matches whose full names differ only in token order.
    #[serde(default)]
    pub reordered_matches: usize,
    pub name_mismatches: usize,
    pub not_in_target: usize,
    pub orphans: usize,
    pub duplicate_keys: usize,
    pub bucket_counts: BTreeMap<String, usize>,
}

impl ReconSummary {
    /// True when every source record matched and nothing is left over.
    pub fn is_clean(&self) -> bool {
        self.name_mismatches == 0 && self.not_in_target == 0 && self.orphans == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
    pub duplicate_policy: DuplicatePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub matches: Vec<MatchedRecord>,
    pub name_mismatches: Vec<NameMismatch>,
    pub not_in_target: Vec<StudentRecord>,
    pub orphans: Vec<StudentRecord>,
    #[serde(default)]
    pub duplicate_keys: Vec<DuplicateKey>,
}
