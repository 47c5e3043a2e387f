use std::io::Write;
use std::path::Path;

use rollbook_recon::{Corrections, RulesConfig};
use unicode_width::UnicodeWidthStr;

use crate::CliError;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Rules file when given, built-in rules otherwise.
pub(crate) fn load_rules(path: Option<&Path>) -> Result<RulesConfig, CliError> {
    let Some(path) = path else {
        return Ok(RulesConfig::default());
    };
    let text = rollbook_io::file::read_text(path)?;
    let rules = RulesConfig::from_toml(&text).map_err(|e| {
        CliError::from(e).with_hint(format!("in rules file {}", path.display()))
    })?;
    log::debug!("rules loaded from {}", path.display());
    Ok(rules)
}

pub(crate) fn load_corrections(path: &Path) -> Result<Corrections, CliError> {
    let text = rollbook_io::file::read_text(path)?;
    let corrections = Corrections::from_toml(&text).map_err(|e| {
        CliError::from(e).with_hint(format!("in corrections file {}", path.display()))
    })?;
    log::debug!(
        "corrections loaded from {}: {} safe updates, {} id mappings, {} emails, {} teachers",
        path.display(),
        corrections.safe_updates.len(),
        corrections.id_map.len(),
        corrections.student_emails.len(),
        corrections.teachers.len(),
    );
    Ok(corrections)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Write `content` to `output`, or to stdout when no path is given.
pub(crate) fn write_or_print(output: Option<&Path>, content: &str) -> Result<(), CliError> {
    match output {
        Some(path) => {
            rollbook_io::file::write_text(path, content)?;
            eprintln!("wrote {}", path.display());
            Ok(())
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(content.as_bytes())
                .and_then(|_| handle.flush())
                .map_err(|e| CliError::general(format!("cannot write to stdout: {e}")))
        }
    }
}

// ---------------------------------------------------------------------------
// Terminal tables
// ---------------------------------------------------------------------------

/// Truncate a string to fit within `width` display columns, adding ".." if truncated.
/// Uses Unicode display width so Hangul alignment stays correct.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if UnicodeWidthStr::width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        return s
            .chars()
            .next()
            .filter(|ch| unicode_width::UnicodeWidthChar::width(*ch).unwrap_or(0) <= width)
            .map(|ch| ch.to_string())
            .unwrap_or_default();
    }

    // Stop at width - 2 to leave room for ".."
    let budget = width - 2;
    let mut used = 0;
    let mut end_byte = 0;
    for (i, ch) in s.char_indices() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            end_byte = i;
            break;
        }
        used += cw;
        end_byte = i + ch.len_utf8();
    }

    format!("{}..", &s[..end_byte])
}

/// Pad or truncate a string to exactly `width` display columns.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let sw = UnicodeWidthStr::width(s);
    if sw > width {
        truncate_display(s, width)
    } else {
        format!("{}{}", s, " ".repeat(width - sw))
    }
}
