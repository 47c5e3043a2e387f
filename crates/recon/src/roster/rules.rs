//! Rule tables for turning an attendance cell into a student.
//!
//! Each table is an ordered list of `(name, pattern)` rules evaluated top to
//! bottom; the first rule that fires decides.

use regex::{Captures, Regex};

use crate::config::RosterRules;
use crate::error::ReconError;
use crate::roster::RosterStudent;

/// Why a cell was not treated as a student name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Header,
    Note,
    DatePrefix,
    TooShort,
    Message,
    Placeholder,
    TooLong,
    AdminText,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Header => write!(f, "header"),
            Self::Note => write!(f, "note"),
            Self::DatePrefix => write!(f, "date_prefix"),
            Self::TooShort => write!(f, "too_short"),
            Self::Message => write!(f, "message"),
            Self::Placeholder => write!(f, "placeholder"),
            Self::TooLong => write!(f, "too_long"),
            Self::AdminText => write!(f, "admin_text"),
        }
    }
}

type GradeExtractor = fn(&Captures) -> Option<String>;

struct GradeRule {
    name: &'static str,
    pattern: Regex,
    extract: GradeExtractor,
}

fn grade_as_written(caps: &Captures) -> Option<String> {
    caps.get(1).map(|m| m.as_str().to_string())
}

fn grade_if_secondary(caps: &Captures) -> Option<String> {
    let n: u32 = caps.get(1)?.as_str().parse().ok()?;
    (6..=12).contains(&n).then(|| n.to_string())
}

const GRADE_RULES: &[(&str, &str, GradeExtractor)] = &[
    ("grade_or_g", r"(?i)(?:Grade|G)\s*(\d+)", grade_as_written),
    ("gr_dot", r"(?i)Gr\.?\s*(\d+)", grade_as_written),
    ("ordinal", r"\b(\d+)(?:st|nd|rd|th)\b", grade_if_secondary),
    ("paren_gr", r"(?i)\(Gr\.?\s*(\d+)\)", grade_as_written),
];

const ADMIN_SHAPES: &[(&str, &str)] = &[
    ("absent", r"^absent"),
    ("excused", r"^excused"),
    ("detention", r"^detention"),
    ("in_cebu", r"^in cebu"),
    ("death_of", r"^death of"),
    ("yearbook", r"^yearbook"),
    ("bare_ordinal", r"^\d+th$"),
    ("bare_number", r"^\d+$"),
    ("bare_gr", r"^gr\.?\s*\d+$"),
];

const CLEANUPS: &[(&str, &str)] = &[
    ("never_seen", r"(?i)-\s*Never seen.*$"),
    ("not_sure", r"(?i)-\s*Not sure.*$"),
    ("moved_to", r"(?i)\s*\(moved to.*\)"),
    ("trailing_ordinal", r"\s+\d+(?:st|nd|rd|th)\s*$"),
    ("trailing_gr", r"(?i)\s+Gr\.?\s*\d+\s*$"),
    ("paren_gr", r"(?i)\s*\(Gr\.?\s*\d+\)"),
];

fn compile(rule: &str, pattern: &str) -> Result<Regex, ReconError> {
    Regex::new(pattern).map_err(|e| ReconError::Pattern {
        rule: rule.into(),
        message: e.to_string(),
    })
}

/// Compiled roster rules. Build once per run.
pub struct RosterExtractor {
    rules: RosterRules,
    date_prefix: Regex,
    admin_shapes: Vec<(&'static str, Regex)>,
    grade_rules: Vec<GradeRule>,
    first_paren: Regex,
    any_paren: Regex,
    grade_marker: Regex,
    cleanups: Vec<(&'static str, Regex)>,
}

impl RosterExtractor {
    pub fn new(rules: &RosterRules) -> Result<Self, ReconError> {
        let admin_shapes = ADMIN_SHAPES
            .iter()
            .map(|(name, pat)| Ok((*name, compile(name, pat)?)))
            .collect::<Result<Vec<_>, ReconError>>()?;
        let grade_rules = GRADE_RULES
            .iter()
            .map(|(name, pat, extract)| {
                Ok(GradeRule { name: *name, pattern: compile(name, pat)?, extract: *extract })
            })
            .collect::<Result<Vec<_>, ReconError>>()?;
        let cleanups = CLEANUPS
            .iter()
            .map(|(name, pat)| Ok((*name, compile(name, pat)?)))
            .collect::<Result<Vec<_>, ReconError>>()?;

        Ok(Self {
            rules: rules.clone(),
            date_prefix: compile("date_prefix", r"^\d+/\d+")?,
            admin_shapes,
            grade_rules,
            first_paren: compile("first_paren", r"\(([^)]+)\)")?,
            any_paren: compile("any_paren", r"\s*\([^)]+\)")?,
            grade_marker: compile("grade_marker", r"^gr\.?\s*\d+$")?,
            cleanups,
        })
    }

    /// First reason this cell is not a student name, if any.
    pub fn rejection(&self, cell: &str) -> Option<Rejection> {
        let cell = cell.trim();
        let lower = cell.to_lowercase();
        let r = &self.rules;

        if r.header_cells.iter().any(|h| *h == lower) {
            return Some(Rejection::Header);
        }
        if r.note_fragments.iter().any(|f| lower.contains(f.as_str())) {
            return Some(Rejection::Note);
        }
        if self.date_prefix.is_match(cell) {
            return Some(Rejection::DatePrefix);
        }
        let len = cell.chars().count();
        if len < r.min_len {
            return Some(Rejection::TooShort);
        }
        if r.message_keywords.iter().any(|k| lower.contains(k.as_str())) {
            return Some(Rejection::Message);
        }
        if r.placeholders.iter().any(|p| p.trim() == lower) {
            return Some(Rejection::Placeholder);
        }
        if len > r.max_len {
            return Some(Rejection::TooLong);
        }
        if let Some((name, _)) = self.admin_shapes.iter().find(|(_, re)| re.is_match(&lower)) {
            log::trace!("admin shape '{name}' matched '{cell}'");
            return Some(Rejection::AdminText);
        }
        None
    }

    /// `"Grade N"` from the first grade rule that fires, or empty.
    pub fn extract_grade(&self, text: &str) -> String {
        for rule in &self.grade_rules {
            if let Some(caps) = rule.pattern.captures(text) {
                if let Some(n) = (rule.extract)(&caps) {
                    log::trace!("grade rule '{}' matched '{}'", rule.name, text);
                    return format!("Grade {n}");
                }
            }
        }
        String::new()
    }

    /// Split a trailing parenthesized English name off the cell.
    ///
    /// Returns `(name, english_name)`. Parenthesized notes (skip words) are
    /// left in place; grade markers are removed without becoming a name.
    pub fn extract_english_name(&self, text: &str) -> (String, String) {
        let Some(caps) = self.first_paren.captures(text) else {
            return (text.to_string(), String::new());
        };
        let inner = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        let lower = inner.to_lowercase();

        if self.rules.skip_words.iter().any(|w| lower.contains(w.as_str())) {
            return (text.to_string(), String::new());
        }

        let without = self.any_paren.replace_all(text, "").trim().to_string();
        if self.grade_marker.is_match(&lower) {
            return (without, String::new());
        }
        (without, inner.to_string())
    }

    /// Strip notes and grade suffixes, then trailing dashes.
    pub fn clean_name(&self, name: &str) -> String {
        let mut out = name.to_string();
        for (_, re) in &self.cleanups {
            out = re.replace_all(&out, "").into_owned();
        }
        out.trim().trim_end_matches('-').trim().to_string()
    }

    /// Turn one cell into a student, or `None` when the cell is rejected or
    /// nothing of a name survives cleaning.
    pub fn extract(&self, cell: &str) -> Option<RosterStudent> {
        let cell = cell.trim();
        if let Some(reason) = self.rejection(cell) {
            log::debug!("rejected ({reason}): '{cell}'");
            return None;
        }

        let grade = self.extract_grade(cell);
        let (name, english_name) = self.extract_english_name(cell);
        let full_name = self.clean_name(&name);
        if full_name.is_empty() {
            log::debug!("rejected (empty after cleaning): '{cell}'");
            return None;
        }

        Some(RosterStudent {
            full_name,
            english_name,
            grade,
            sources: Vec::new(),
        })
    }

    pub fn extract_document(&self, cells: &[String]) -> Vec<RosterStudent> {
        cells.iter().filter_map(|c| self.extract(c)).collect()
    }
}
