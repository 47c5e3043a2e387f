// SQL script generation
//
// Scripts are plain text meant for review before anyone runs them. Every
// value is single-quoted with embedded quotes doubled.

use std::collections::{BTreeMap, HashMap};

use rollbook_recon::config::Corrections;
use rollbook_recon::{ReconResult, StudentRecord};
use serde::Serialize;

use crate::MasterlistEntry;

/// Statement counts for a generated script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptStats {
    pub updates: usize,
    pub inserts: usize,
    /// Database records listed as `-- KEEP:` comments.
    pub kept: usize,
    /// Configured entries that referred to nothing and were left out.
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct SqlScript {
    pub text: String,
    pub stats: ScriptStats,
}

/// Quote a string as a SQL literal.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

// ---------------------------------------------------------------------------
// Updates script (from a comparison)
// ---------------------------------------------------------------------------

/// Safe renames from the corrections file, INSERTs for every masterlist
/// student missing from the database, and KEEP comments for orphans.
pub fn updates_script(result: &ReconResult, corrections: &Corrections) -> SqlScript {
    let mut stats = ScriptStats::default();
    let mut lines = vec![
        "-- Update student names from masterlist".to_string(),
        "-- Generated automatically - REVIEW BEFORE RUNNING".to_string(),
        String::new(),
    ];

    for update in &corrections.safe_updates {
        lines.push(format!(
            "UPDATE students SET full_name = {}, english_name = {} WHERE id = {};",
            quote(&update.full_name),
            quote(&update.english_name),
            quote(&update.id),
        ));
        stats.updates += 1;
    }
    lines.push(String::new());

    lines.push("-- Add missing students from masterlist".to_string());
    stats.inserts = push_inserts_by_grade(&mut lines, result.not_in_target.iter());

    lines.push(String::new());
    lines.push(
        "-- Students in database but not in masterlist - KEEPING THEM (may have signed up already)"
            .to_string(),
    );
    for orphan in &result.orphans {
        lines.push(format!(
            "-- KEEP: {} ({}) - Grade {}",
            comment_text(&orphan.full_name),
            comment_text(&orphan.english_name),
            comment_text(&orphan.grade),
        ));
        stats.kept += 1;
    }

    SqlScript { text: finish(lines), stats }
}

// ---------------------------------------------------------------------------
// Final script (from the masterlist + id map)
// ---------------------------------------------------------------------------

/// UPDATEs for every `id_map` entry whose masterlist id exists, then
/// INSERTs for masterlist students no entry claims.
pub fn final_script(masterlist: &[MasterlistEntry], corrections: &Corrections) -> SqlScript {
    let mut stats = ScriptStats::default();
    let by_id: HashMap<&str, &MasterlistEntry> =
        masterlist.iter().map(|e| (e.student_id.as_str(), e)).collect();

    let mut lines = vec![
        "-- Update existing students with correct names from masterlist".to_string(),
        "-- Generated automatically".to_string(),
        String::new(),
    ];

    for (db_id, ml_id) in &corrections.id_map {
        let Some(entry) = by_id.get(ml_id.as_str()) else {
            log::warn!("id_map: masterlist id '{ml_id}' (database id '{db_id}') not in masterlist, skipped");
            stats.skipped += 1;
            continue;
        };
        let record = StudentRecord::from(*entry);
        lines.push(format!(
            "UPDATE students SET full_name = {}, english_name = {}, grade = {} WHERE id = {};",
            quote(&record.full_name),
            quote(record.english_or_first_token()),
            quote(&record.grade),
            quote(db_id),
        ));
        stats.updates += 1;
    }

    lines.push(String::new());
    lines.push("-- Add new students from masterlist".to_string());

    let mapped = corrections.mapped_masterlist_ids();
    let mut seen = std::collections::HashSet::new();
    let unmapped: Vec<StudentRecord> = masterlist
        .iter()
        .filter(|e| !mapped.contains(e.student_id.as_str()))
        .filter(|e| seen.insert(e.student_id.as_str()))
        .map(StudentRecord::from)
        .collect();
    stats.inserts = push_inserts_by_grade(&mut lines, unmapped.iter());

    SqlScript { text: finish(lines), stats }
}

// ---------------------------------------------------------------------------
// Emails script (from corrections only)
// ---------------------------------------------------------------------------

/// Email UPDATEs per mapped student, teacher INSERTs, and the principal
/// account when one is configured.
pub fn emails_script(corrections: &Corrections) -> SqlScript {
    let mut stats = ScriptStats::default();
    let mut lines = vec!["-- Update student emails".to_string()];

    for (name, email) in corrections.emails() {
        let Some(email) = email else {
            log::debug!("no email for '{name}'");
            stats.skipped += 1;
            continue;
        };
        lines.push(format!(
            "UPDATE students SET email = {} WHERE full_name = {};",
            quote(email),
            quote(name),
        ));
        stats.updates += 1;
    }

    lines.push(String::new());
    lines.push("-- Add teachers".to_string());
    for teacher in &corrections.teachers {
        lines.push(format!(
            "INSERT INTO teachers (name, email) VALUES ({}, {});",
            quote(&teacher.name),
            quote(&teacher.email),
        ));
        stats.inserts += 1;
    }

    if let Some(ref p) = corrections.principal {
        lines.push(String::new());
        lines.push("-- Add principal account".to_string());
        lines.push(format!(
            "INSERT INTO students (full_name, english_name, email, grade) VALUES ({}, {}, {}, {});",
            quote(&p.full_name),
            quote(&p.english_name),
            quote(&p.email),
            quote(&p.grade),
        ));
        stats.inserts += 1;
    }

    SqlScript { text: finish(lines), stats }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Append `-- Grade N` groups of INSERTs in ascending numeric grade order.
/// Records keep their input order within a grade. Returns the INSERT count.
fn push_inserts_by_grade<'a>(
    lines: &mut Vec<String>,
    records: impl Iterator<Item = &'a StudentRecord>,
) -> usize {
    let mut by_grade: BTreeMap<(u32, &str), Vec<&StudentRecord>> = BTreeMap::new();
    for record in records {
        let order = record.grade.trim().parse::<u32>().unwrap_or(u32::MAX);
        by_grade.entry((order, record.grade.as_str())).or_default().push(record);
    }

    let mut count = 0;
    for ((_, grade), students) in by_grade {
        lines.push(String::new());
        lines.push(format!("-- Grade {}", comment_text(grade)));
        for s in students {
            lines.push(format!(
                "INSERT INTO students (full_name, english_name, grade) VALUES ({}, {}, {});",
                quote(&s.full_name),
                quote(s.english_or_first_token()),
                quote(&s.grade),
            ));
            count += 1;
        }
    }
    count
}

/// Keep free text from breaking out of a `--` comment line.
fn comment_text(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollbook_recon::config::{DuplicatePolicy, Principal, SafeUpdate, Teacher};
    use rollbook_recon::model::ReconInput;

    fn entry(id: &str, official: &str, english: &str, grade: &str) -> MasterlistEntry {
        MasterlistEntry {
            student_id: id.into(),
            official_name: official.into(),
            full_name: rollbook_recon::reorder_last_first(official),
            korean_name: String::new(),
            english_name: english.into(),
            grade: grade.into(),
            gender: String::new(),
        }
    }

    #[test]
    fn quote_escapes_single_quotes() {
        assert_eq!(quote("O'Neil"), "'O''Neil'");
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn updates_script_sections() {
        let input = ReconInput {
            source: vec![
                StudentRecord::new("1085", "Gahyun Park", "Katie", "11"),
                StudentRecord::new("1050", "Sua An", "Sua", "7"),
                StudentRecord::new("1300", "Liam O'Brien", "", "12"),
                StudentRecord::new("1301", "Biya Shin", "Biya", "7"),
            ],
            target: vec![
                StudentRecord::new("eb8c255b", "Park Gahyun", "Katie", "11"),
                StudentRecord::new("3740bcd9", "Song Sam Dong", "Dennis", "12"),
            ],
        };
        let result = rollbook_recon::run(DuplicatePolicy::LastWins, &input);
        let corrections = Corrections {
            safe_updates: vec![SafeUpdate {
                id: "eb8c255b".into(),
                full_name: "Gahyun Park".into(),
                english_name: "Katie".into(),
            }],
            ..Corrections::default()
        };

        let script = updates_script(&result, &corrections);
        let text = &script.text;
        assert!(text.starts_with("-- Update student names from masterlist\n"));
        assert!(text.contains(
            "UPDATE students SET full_name = 'Gahyun Park', english_name = 'Katie' WHERE id = 'eb8c255b';"
        ));

        let grade7 = text.find("-- Grade 7").unwrap();
        let grade12 = text.find("-- Grade 12").unwrap();
        assert!(grade7 < grade12);
        let sua = text
            .find("VALUES ('Sua An', 'Sua', '7');")
            .unwrap();
        let biya = text.find("VALUES ('Biya Shin', 'Biya', '7');").unwrap();
        assert!(grade7 < sua && sua < biya && biya < grade12);
        assert!(text.contains("VALUES ('Liam O''Brien', 'Liam', '12');"));
        assert!(text.contains("-- KEEP: Song Sam Dong (Dennis) - Grade 12"));

        assert_eq!(
            script.stats,
            ScriptStats { updates: 1, inserts: 3, kept: 1, skipped: 0 }
        );
    }

    #[test]
    fn final_script_maps_and_inserts() {
        let masterlist = vec![
            entry("1085", "Park, Gahyun", "Katie", "11"),
            entry("1208", "Dantis, Ayra Mari", "", "9"),
            entry("1050", "An, Sua", "Sua", "7"),
            entry("1227", "Lim, Gyuri", "Gyuri", "9"),
        ];
        let mut corrections = Corrections::default();
        corrections.id_map.insert("eb8c255b".into(), "1085".into());
        corrections.id_map.insert("e14d8495".into(), "1208".into());
        corrections.id_map.insert("ffffffff".into(), "9999".into());

        let script = final_script(&masterlist, &corrections);
        let text = &script.text;
        assert!(text.contains(
            "UPDATE students SET full_name = 'Gahyun Park', english_name = 'Katie', grade = '11' WHERE id = 'eb8c255b';"
        ));
        assert!(text.contains(
            "UPDATE students SET full_name = 'Ayra Mari Dantis', english_name = 'Ayra', grade = '9' WHERE id = 'e14d8495';"
        ));
        assert!(!text.contains("9999"));
        assert!(text.contains("-- Grade 7\nINSERT INTO students (full_name, english_name, grade) VALUES ('Sua An', 'Sua', '7');"));
        assert!(text.contains("VALUES ('Gyuri Lim', 'Gyuri', '9');"));
        assert!(!text.contains("VALUES ('Gahyun Park'"));

        assert_eq!(
            script.stats,
            ScriptStats { updates: 2, inserts: 2, kept: 0, skipped: 1 }
        );
    }

    #[test]
    fn emails_script_sections() {
        let corrections = Corrections::from_toml(
            r#"
[student_emails]
"Gyuri Lim" = "gyuri.lim@school.example"
"Ayra Mari Dantis" = ""
"Liam O'Brien" = "liam@school.example"

[[teachers]]
name = "Ms. Reyes"
email = "reyes@school.example"
"#,
        )
        .unwrap();

        let script = emails_script(&corrections);
        let lines: Vec<&str> = script.text.lines().collect();
        assert_eq!(lines[0], "-- Update student emails");
        assert_eq!(
            lines[1],
            "UPDATE students SET email = 'gyuri.lim@school.example' WHERE full_name = 'Gyuri Lim';"
        );
        assert_eq!(
            lines[2],
            "UPDATE students SET email = 'liam@school.example' WHERE full_name = 'Liam O''Brien';"
        );
        assert!(script.text.contains("INSERT INTO teachers (name, email) VALUES ('Ms. Reyes', 'reyes@school.example');"));
        assert!(!script.text.contains("principal"));
        assert_eq!(script.stats, ScriptStats { updates: 2, inserts: 1, kept: 0, skipped: 1 });
    }

    #[test]
    fn emails_script_with_principal() {
        let corrections = Corrections {
            principal: Some(Principal {
                full_name: "Dana Principal".into(),
                english_name: "Dana".into(),
                email: "dana@school.example".into(),
                grade: "12".into(),
            }),
            teachers: vec![Teacher { name: "Mr. Cruz".into(), email: "cruz@school.example".into() }],
            ..Corrections::default()
        };
        let script = emails_script(&corrections);
        assert!(script.text.ends_with(
            "-- Add principal account\nINSERT INTO students (full_name, english_name, email, grade) VALUES ('Dana Principal', 'Dana', 'dana@school.example', '12');\n"
        ));
        assert_eq!(script.stats.inserts, 2);
    }
}
