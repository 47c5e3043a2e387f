//! Attendance roster extraction and cross-document deduplication.

mod rules;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::normalize::dedup_key;

pub use rules::{Rejection, RosterExtractor};

/// First-cell texts of one attendance export, named by its file stem.
#[derive(Debug, Clone)]
pub struct RosterDocument {
    pub id: String,
    pub cells: Vec<String>,
}

impl RosterDocument {
    pub fn new(id: impl Into<String>, cells: Vec<String>) -> Self {
        Self { id: id.into(), cells }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterStudent {
    pub full_name: String,
    pub english_name: String,
    pub grade: String,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterSummary {
    pub total_students: usize,
    pub students_with_grades: usize,
    pub students_with_english_names: usize,
}

/// Unique students keyed by [`dedup_key`], in first-seen order.
///
/// The first record under a key supplies name, English name and grade;
/// later records only add their document to `sources`.
#[derive(Debug, Clone, Default)]
pub struct RosterBook {
    students: Vec<RosterStudent>,
    by_key: HashMap<String, usize>,
}

impl RosterBook {
    pub fn add(&mut self, student: RosterStudent, source: &str) {
        let key = dedup_key(&student.full_name);
        if let Some(&i) = self.by_key.get(&key) {
            let sources = &mut self.students[i].sources;
            if !sources.iter().any(|s| s == source) {
                sources.push(source.to_string());
            }
            return;
        }

        let mut student = student;
        student.sources = vec![source.to_string()];
        self.by_key.insert(key, self.students.len());
        self.students.push(student);
    }

    pub fn get(&self, key: &str) -> Option<&RosterStudent> {
        self.by_key.get(key).map(|&i| &self.students[i])
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Students ordered by full name, case-insensitively. Ties keep
    /// first-seen order.
    pub fn sorted(&self) -> Vec<&RosterStudent> {
        let mut out: Vec<&RosterStudent> = self.students.iter().collect();
        out.sort_by_cached_key(|s| s.full_name.to_lowercase());
        out
    }

    pub fn summary(&self) -> RosterSummary {
        RosterSummary {
            total_students: self.students.len(),
            students_with_grades: self.students.iter().filter(|s| !s.grade.is_empty()).count(),
            students_with_english_names: self
                .students
                .iter()
                .filter(|s| !s.english_name.is_empty())
                .count(),
        }
    }
}
