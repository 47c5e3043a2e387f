//! `rollbook roster`: attendance exports to a deduplicated roster.

use std::path::{Path, PathBuf};

use rollbook_io::report::{roster_markdown, RosterReport};
use rollbook_io::IoError;
use rollbook_recon::engine::build_roster;
use rollbook_recon::roster::RosterDocument;

use crate::util::{load_rules, write_or_print};
use crate::CliError;

pub fn cmd_roster(
    dir: PathBuf,
    markdown: Option<PathBuf>,
    json: Option<PathBuf>,
    rules_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let rules = load_rules(rules_path.as_deref())?;

    let files = html_files(&dir)?;
    if files.is_empty() {
        log::warn!("no .html files in {}", dir.display());
    }

    let mut documents = Vec::with_capacity(files.len());
    for path in &files {
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        log::info!("processing: {id}");
        let cells = rollbook_io::html::read_first_cells(path)?;
        documents.push(RosterDocument::new(id, cells));
    }

    let book = build_roster(&rules, &documents)?;

    if let Some(ref path) = json {
        rollbook_io::json::export(&RosterReport::new(&book), path)?;
        eprintln!("wrote {}", path.display());
    }
    if markdown.is_some() || json.is_none() {
        write_or_print(markdown.as_deref(), &roster_markdown(&book))?;
    }

    let summary = book.summary();
    eprintln!(
        "{} documents: {} unique students, {} with grades, {} with English names",
        documents.len(),
        summary.total_students,
        summary.students_with_grades,
        summary.students_with_english_names,
    );
    Ok(())
}

/// `*.html` / `*.htm` files directly inside `dir`, sorted by path.
fn html_files(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    if !dir.exists() {
        return Err(IoError::read(dir, "no such directory").into());
    }
    if !dir.is_dir() {
        return Err(CliError::args(format!("{} is not a directory", dir.display()))
            .with_hint("pass the folder holding the attendance exports"));
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IoError::read(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| IoError::read(dir, e))?.path();
        let is_html = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));
        if is_html && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
