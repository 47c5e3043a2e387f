//! Name keys used for comparison.
//!
//! Two keys exist. [`canonical_key`] drives record matching; [`dedup_key`]
//! is the stricter key the roster extractor groups by. Neither reorders
//! tokens: `"Park, Gahyun"` and `"Gahyun Park"` produce different keys, so
//! sources written `Last, First` must go through [`reorder_last_first`]
//! before they are compared.

/// Canonical comparison key: drop `,` and `.`, collapse whitespace runs to a
/// single space, trim, lower-case.
///
/// Total and idempotent.
pub fn canonical_key(name: &str) -> String {
    let stripped: String = name.chars().filter(|c| *c != ',' && *c != '.').collect();
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Roster deduplication key: lower-cased with spaces and periods removed.
pub fn dedup_key(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| *c != ' ' && *c != '.')
        .collect()
}

/// Whether two canonical keys name the same tokens, in any order.
///
/// Used only after a lookup has already paired two records: `"park gahyun"`
/// and `"gahyun park"` agree, `"kyungseryn"` and `"seryn kyung"` do not.
pub fn same_tokens(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let mut left: Vec<&str> = a.split(' ').collect();
    let mut right: Vec<&str> = b.split(' ').collect();
    left.sort_unstable();
    right.sort_unstable();
    left == right
}

/// Rewrite an official `Last, First` name as `First Last`.
///
/// Only the first two comma-separated parts are kept. Names without a comma
/// are returned unchanged.
pub fn reorder_last_first(official: &str) -> String {
    if !official.contains(',') {
        return official.to_string();
    }
    let mut parts = official.split(',');
    let last = parts.next().unwrap_or("").trim();
    let first = parts.next().unwrap_or("").trim();
    format!("{first} {last}").trim().to_string()
}
