// Masterlist CSV import
//
// Layout: a banner line (export date), a header line, then one student per
// row. Columns used (0-indexed): id@1, official name@2, korean@3,
// english@4, grade@5, gender@6.

use std::collections::BTreeMap;
use std::path::Path;

use rollbook_recon::{reorder_last_first, StudentRecord};
use serde::{Deserialize, Serialize};

use crate::IoError;

/// Grades kept from the masterlist, as written in the grade column.
pub const SECONDARY_GRADES: [&str; 7] = ["6", "7", "8", "9", "10", "11", "12"];

const MIN_COLUMNS: usize = 7;

/// Official-name markers that open the trailing section of leavers.
const END_MARKERS: [&str; 2] = ["WITHDRAWN", "DID NOT RETURN"];

/// One masterlist row. `full_name` is `official_name` rewritten to
/// `First Last`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterlistEntry {
    pub student_id: String,
    pub official_name: String,
    pub full_name: String,
    #[serde(default)]
    pub korean_name: String,
    #[serde(default)]
    pub english_name: String,
    pub grade: String,
    #[serde(default)]
    pub gender: String,
}

impl From<&MasterlistEntry> for StudentRecord {
    fn from(entry: &MasterlistEntry) -> Self {
        StudentRecord::new(&entry.student_id, &entry.full_name, &entry.english_name, &entry.grade)
    }
}

pub fn read_masterlist(path: &Path) -> Result<Vec<MasterlistEntry>, IoError> {
    let content = crate::file::read_text(path)?;
    parse_masterlist(&content)
}

/// Parse masterlist CSV text.
///
/// Rows with fewer than seven columns, a grade outside 6..=12, or an empty
/// or `NEW` id are skipped. Parsing stops at the first kept row whose
/// official name carries a leaver marker.
pub fn parse_masterlist(content: &str) -> Result<Vec<MasterlistEntry>, IoError> {
    if content.trim().is_empty() {
        return Err(IoError::MissingLine("banner"));
    }
    let Some((_banner, body)) = content.split_once('\n') else {
        return Err(IoError::MissingLine("header"));
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());
    let mut records = reader.records();

    match records.next() {
        Some(header) => {
            header.map_err(|e| IoError::Csv(e.to_string()))?;
        }
        None => return Err(IoError::MissingLine("header")),
    }

    let mut entries = Vec::new();
    for (row_idx, result) in records.enumerate() {
        let record = result.map_err(|e| IoError::Csv(e.to_string()))?;
        if record.len() < MIN_COLUMNS {
            continue;
        }
        let field = |i: usize| record.get(i).unwrap_or("").trim().to_string();

        let student_id = field(1);
        let official_name = field(2);
        let grade = field(5);

        if !SECONDARY_GRADES.contains(&grade.as_str()) {
            continue;
        }
        if student_id.is_empty() || student_id == "NEW" {
            continue;
        }
        if END_MARKERS.iter().any(|m| official_name.contains(m)) {
            // +3: banner, header, 1-based
            log::info!("masterlist: leaver section at line {}, stopping", row_idx + 3);
            break;
        }

        entries.push(MasterlistEntry {
            full_name: reorder_last_first(&official_name),
            student_id,
            official_name,
            korean_name: field(3),
            english_name: field(4),
            grade,
            gender: field(6),
        });
    }

    Ok(entries)
}

/// Student count per numeric grade.
pub fn count_by_grade(entries: &[MasterlistEntry]) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for entry in entries {
        if let Ok(grade) = entry.grade.parse::<u32>() {
            *counts.entry(grade).or_insert(0) += 1;
        }
    }
    counts
}
