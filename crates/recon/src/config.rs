use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Rules file
// ---------------------------------------------------------------------------

/// Row-filter keyword lists and matching policy. Every field has a built-in
/// default, so an empty file is a valid config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    #[serde(default)]
    pub roster: RosterRules,
    #[serde(default)]
    pub matching: MatchingConfig,
}

// ---------------------------------------------------------------------------
// Roster rules
// ---------------------------------------------------------------------------

/// Keyword lists used to reject attendance cells that are notes, headers or
/// placeholders rather than student names. All comparisons are made against
/// the lower-cased cell text.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RosterRules {
    /// Cells equal to one of these are table headers.
    #[serde(default = "default_header_cells")]
    pub header_cells: Vec<String>,
    /// Cells containing one of these are attendance notes.
    #[serde(default = "default_note_fragments")]
    pub note_fragments: Vec<String>,
    /// Cells containing one of these are messages to staff.
    #[serde(default = "default_message_keywords")]
    pub message_keywords: Vec<String>,
    /// Cells equal to one of these are role placeholders.
    #[serde(default = "default_placeholders")]
    pub placeholders: Vec<String>,
    /// A parenthesized segment containing one of these is a note, not an
    /// English name.
    #[serde(default = "default_skip_words")]
    pub skip_words: Vec<String>,
    #[serde(default = "default_min_len")]
    pub min_len: usize,
    #[serde(default = "default_max_len")]
    pub max_len: usize,
}

impl Default for RosterRules {
    fn default() -> Self {
        Self {
            header_cells: default_header_cells(),
            note_fragments: default_note_fragments(),
            message_keywords: default_message_keywords(),
            placeholders: default_placeholders(),
            skip_words: default_skip_words(),
            min_len: default_min_len(),
            max_len: default_max_len(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_header_cells() -> Vec<String> {
    strings(&["student name", "student", ""])
}

fn default_note_fragments() -> Vec<String> {
    strings(&["attendance guide", "w/ coach", "no coach", "coach", "detention", "stu co"])
}

fn default_message_keywords() -> Vec<String> {
    strings(&[
        "hello", "hi,", "please", "thank you", "thanks", "i've", "i am", "mr.", "ms.", "mrs.",
        "attendance", "mark", "added", "changed",
    ])
}

fn default_placeholders() -> Vec<String> {
    strings(&["student names", "student name", "teacher", "varsity team", "coach"])
}

fn default_skip_words() -> Vec<String> {
    strings(&[
        "moved", "death", "excused", "yearbook", "absent", "in cebu", "detention", "stu co",
    ])
}

fn default_min_len() -> usize {
    3
}

fn default_max_len() -> usize {
    50
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchingConfig {
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

/// How a target index resolves two records that normalize to the same key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The record appearing later in the target collection is kept.
    #[default]
    LastWins,
    /// The record appearing first is kept.
    FirstWins,
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LastWins => write!(f, "last_wins"),
            Self::FirstWins => write!(f, "first_wins"),
        }
    }
}

// ---------------------------------------------------------------------------
// Corrections file
// ---------------------------------------------------------------------------

/// One-off manual corrections: renames, id mappings, email and staff tables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Corrections {
    #[serde(default)]
    pub safe_updates: Vec<SafeUpdate>,
    /// Database id → masterlist student id.
    #[serde(default)]
    pub id_map: BTreeMap<String, String>,
    /// Student full name → email. Order follows the file.
    #[serde(default)]
    pub student_emails: toml::Table,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub principal: Option<Principal>,
}

/// A database row whose names are known-good replacements.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SafeUpdate {
    pub id: String,
    pub full_name: String,
    pub english_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Teacher {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Principal {
    pub full_name: String,
    pub english_name: String,
    pub email: String,
    pub grade: String,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl RulesConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: RulesConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let r = &self.roster;
        if r.min_len > r.max_len {
            return Err(ReconError::ConfigValidation(format!(
                "roster.min_len ({}) must not exceed roster.max_len ({})",
                r.min_len, r.max_len
            )));
        }
        if r.skip_words.iter().any(|w| w.trim().is_empty()) {
            return Err(ReconError::ConfigValidation(
                "roster.skip_words must not contain empty entries".into(),
            ));
        }
        Ok(())
    }
}

impl Corrections {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: Corrections =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let mut seen = HashSet::new();
        for update in &self.safe_updates {
            if update.id.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "safe_updates: entry '{}' has an empty id",
                    update.full_name
                )));
            }
            if update.full_name.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "safe_updates: id '{}' has an empty full_name",
                    update.id
                )));
            }
            if !seen.insert(update.id.as_str()) {
                return Err(ReconError::DuplicateMapping {
                    table: "safe_updates".into(),
                    id: update.id.clone(),
                });
            }
        }

        for (db_id, ml_id) in &self.id_map {
            if db_id.trim().is_empty() || ml_id.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "id_map: empty id in mapping '{db_id}' -> '{ml_id}'"
                )));
            }
        }

        for (name, value) in &self.student_emails {
            if name.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "student_emails: empty student name".into(),
                ));
            }
            if !value.is_str() {
                return Err(ReconError::ConfigValidation(format!(
                    "student_emails: value for '{name}' must be a string"
                )));
            }
        }

        for teacher in &self.teachers {
            if teacher.name.trim().is_empty() {
                return Err(ReconError::ConfigValidation("teachers: empty name".into()));
            }
            if !teacher.email.contains('@') {
                return Err(ReconError::ConfigValidation(format!(
                    "teachers: '{}' has invalid email '{}'",
                    teacher.name, teacher.email
                )));
            }
        }

        if let Some(ref p) = self.principal {
            if p.full_name.trim().is_empty() || !p.email.contains('@') {
                return Err(ReconError::ConfigValidation(
                    "principal: full_name and a valid email are required".into(),
                ));
            }
        }

        Ok(())
    }

    /// Student emails in file order. Empty strings mean "no email known".
    pub fn emails(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.student_emails.iter().map(|(name, value)| {
            let email = value.as_str().filter(|e| !e.trim().is_empty());
            (name.as_str(), email)
        })
    }

    /// Masterlist ids already claimed by an `id_map` entry.
    pub fn mapped_masterlist_ids(&self) -> HashSet<&str> {
        self.id_map.values().map(|s| s.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
