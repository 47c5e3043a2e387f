// Attendance HTML import
//
// Spreadsheet "publish to web" exports put one student per table row with
// the name in the first cell. Only <table>/<tr>/<td> structure is consulted;
// everything else is treated as opaque markup.

use std::path::Path;

use crate::IoError;

/// Text chunks of the first `<td>` of every table row that has any.
///
/// A chunk is the trimmed, entity-decoded text between two tags. Rows whose
/// first cell holds no text are omitted.
pub fn first_cell_rows(html: &str) -> Vec<Vec<String>> {
    let mut scanner = RowScanner::default();
    let lc = to_lowercase_fast(html);
    let mut pos = 0;
    let mut text_start = 0;

    while pos < html.len() {
        let Some(rel) = html[pos..].find('<') else {
            break;
        };
        let lt = pos + rel;
        if !opens_markup(&html[lt + 1..]) {
            // `Kim <3 Lee`: a bare `<` is text
            pos = lt + 1;
            continue;
        }
        if lt > text_start {
            scanner.text(&html[text_start..lt]);
        }

        if lc[lt..].starts_with("<!--") {
            pos = match lc[lt + 4..].find("-->") {
                Some(end) => lt + 4 + end + 3,
                None => html.len(),
            };
            text_start = pos;
            continue;
        }

        let Some(tag_end) = find_tag_end(html, lt) else {
            // Unterminated tag: the rest is markup
            text_start = html.len();
            break;
        };
        let (name, closing) = tag_name(&lc[lt + 1..tag_end - 1]);

        if !closing && (name == "script" || name == "style") {
            let close = format!("</{name}");
            pos = match lc[tag_end..].find(&close) {
                Some(rel) => {
                    let close_start = tag_end + rel;
                    html[close_start..].find('>').map_or(html.len(), |g| close_start + g + 1)
                }
                None => html.len(),
            };
            text_start = pos;
            continue;
        }

        scanner.tag(name, closing);
        pos = tag_end;
        text_start = pos;
    }

    if text_start < html.len() {
        scanner.text(&html[text_start..]);
    }
    scanner.finish()
}

/// Candidate name per row: the first chunk of its first cell.
pub fn first_cells(html: &str) -> Vec<String> {
    first_cell_rows(html)
        .into_iter()
        .filter_map(|row| row.into_iter().next())
        .collect()
}

pub fn read_first_cells(path: &Path) -> Result<Vec<String>, IoError> {
    let html = crate::file::read_text(path)?;
    Ok(first_cells(&html))
}

// ---------------------------------------------------------------------------
// Row state machine
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RowScanner {
    table_depth: usize,
    in_row: bool,
    in_cell: bool,
    cell_count: usize,
    current: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RowScanner {
    fn tag(&mut self, name: &str, closing: bool) {
        match (name, closing) {
            ("table", false) => self.table_depth += 1,
            ("table", true) => {
                self.end_row();
                self.table_depth = self.table_depth.saturating_sub(1);
            }
            ("tr", false) if self.table_depth > 0 => {
                // A new row implicitly closes an unterminated one
                self.end_row();
                self.in_row = true;
            }
            ("tr", true) => self.end_row(),
            ("td", false) if self.in_row => {
                self.in_cell = true;
                self.cell_count += 1;
            }
            ("td", true) => self.in_cell = false,
            _ => {}
        }
    }

    fn text(&mut self, raw: &str) {
        if !(self.in_cell && self.cell_count == 1) {
            return;
        }
        let decoded = decode_entities(raw);
        let chunk = decoded.trim();
        if !chunk.is_empty() {
            self.current.push(chunk.to_string());
        }
    }

    fn end_row(&mut self) {
        if self.in_row && !self.current.is_empty() {
            self.rows.push(std::mem::take(&mut self.current));
        }
        self.current.clear();
        self.in_row = false;
        self.in_cell = false;
        self.cell_count = 0;
    }

    fn finish(mut self) -> Vec<Vec<String>> {
        self.end_row();
        self.rows
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Whether the text right after a `<` starts a tag, end tag, comment or
/// declaration.
fn opens_markup(after: &str) -> bool {
    after
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'/' || b == b'!')
}

/// Byte offset just past the `>` closing the tag that starts at `lt`.
/// A `>` inside a quoted attribute value does not close the tag.
fn find_tag_end(html: &str, lt: usize) -> Option<usize> {
    let bytes = html.as_bytes();
    let mut quote: Option<u8> = None;
    let mut prev = b'<';
    for (i, &b) in bytes.iter().enumerate().skip(lt + 1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if (b == b'"' || b == b'\'') && prev == b'=' => quote = Some(b),
            None if b == b'>' => return Some(i + 1),
            None => {}
        }
        if !b.is_ascii_whitespace() {
            prev = b;
        }
    }
    None
}

/// Tag name of the lower-cased text between `<` and `>`, and whether it is a
/// closing tag.
fn tag_name(inner: &str) -> (&str, bool) {
    let (closing, rest) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let end = rest
        .find(|c: char| c.is_ascii_whitespace() || c == '/')
        .unwrap_or(rest.len());
    (&rest[..end], closing)
}

/// Fast ASCII-only lowercasing for tag matching. Byte offsets are preserved.
fn to_lowercase_fast(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// Decode named and numeric character references. Unknown references are
/// left as written.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&semi| semi > 0 && semi <= 10)
            .and_then(|semi| decode_reference(&after[..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(|c: char| c == 'x' || c == 'X') {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '–',
        "mdash" => '—',
        "rsquo" => '’',
        "lsquo" => '‘',
        _ => return None,
    })
}
