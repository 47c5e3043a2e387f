// Email list scan
//
// Input is whatever a mail client produced when a distribution list was
// copied: `Name <addr>, "Other Name" <addr>, bare@addr`.

use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use rollbook_recon::config::Corrections;

use crate::IoError;

const ADDRESS_PATTERN: &str = r"<([^>]+)>|(\S+@\S+)";

static ADDRESS_RE: OnceLock<Regex> = OnceLock::new();

fn address_re() -> &'static Regex {
    ADDRESS_RE.get_or_init(|| Regex::new(ADDRESS_PATTERN).expect("ADDRESS_PATTERN is a valid regex"))
}

/// Extract addresses in order of appearance, duplicates kept.
pub fn extract_emails(text: &str) -> Vec<String> {
    address_re()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().trim_end_matches([',', ';']).to_string())
        .filter(|addr| addr.contains('@'))
        .collect()
}

pub fn read_email_list(path: &Path) -> Result<Vec<String>, IoError> {
    let text = crate::file::read_text(path)?;
    Ok(extract_emails(&text))
}

/// Mapped student emails that do not occur in `list`, compared
/// case-insensitively. Returns `(student name, email)` in file order.
pub fn missing_from_list<'a>(corrections: &'a Corrections, list: &[String]) -> Vec<(&'a str, &'a str)> {
    let known: HashSet<String> = list.iter().map(|e| e.to_lowercase()).collect();
    corrections
        .emails()
        .filter_map(|(name, email)| email.map(|e| (name, e)))
        .filter(|(_, email)| !known.contains(&email.to_lowercase()))
        .collect()
}
