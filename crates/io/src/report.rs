// Roster reports: Markdown table and JSON document

use rollbook_recon::roster::{RosterBook, RosterStudent, RosterSummary};
use serde::Serialize;

/// `roster.json` layout: the summary counts followed by the sorted students.
#[derive(Debug, Serialize)]
pub struct RosterReport<'a> {
    #[serde(flatten)]
    pub summary: RosterSummary,
    pub students: Vec<&'a RosterStudent>,
}

impl<'a> RosterReport<'a> {
    pub fn new(book: &'a RosterBook) -> Self {
        Self {
            summary: book.summary(),
            students: book.sorted(),
        }
    }
}

/// Render the roster as a Markdown table, students sorted by name.
pub fn roster_markdown(book: &RosterBook) -> String {
    let mut lines = vec![
        "# All Students Roster".to_string(),
        String::new(),
        "| # | Full Name | English Name | Grade | Source |".to_string(),
        "|---|-----------|--------------|-------|--------|".to_string(),
    ];

    for (i, student) in book.sorted().iter().enumerate() {
        lines.push(format!(
            "| {} | {} | {} | {} | {} |",
            i + 1,
            cell(&student.full_name),
            cell(&student.english_name),
            cell(&student.grade),
            cell(&student.sources.join(", ")),
        ));
    }

    let summary = book.summary();
    lines.extend([
        String::new(),
        "## Summary".to_string(),
        String::new(),
        format!("- **Total unique students:** {}", summary.total_students),
        format!("- **Students with grades specified:** {}", summary.students_with_grades),
        format!("- **Students with English names:** {}", summary.students_with_english_names),
    ]);

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}
