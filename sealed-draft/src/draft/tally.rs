// Pick tally: grouping, ordering, and the exported text format.
//
// Export lines are "<count> <full name>". Older exports used
// "<count> - <full name> - <color>"; those still import but are never written.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::card::{Card, Color};

/// One deduplicated row of the tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyEntry {
    pub count: usize,
    pub full_name: String,
    pub color: Color,
}

/// Group picks by (full name, color), most-picked first.
///
/// Equal counts are ordered by name using [`compare_names`], then by color so
/// the order is total.
pub fn tally(picks: &[Card]) -> Vec<TallyEntry> {
    let mut counts: HashMap<(&str, Color), usize> = HashMap::new();
    for card in picks {
        *counts.entry((card.full_name.as_str(), card.color)).or_insert(0) += 1;
    }

    let mut entries: Vec<TallyEntry> = counts
        .into_iter()
        .map(|((name, color), count)| TallyEntry {
            count,
            full_name: name.to_string(),
            color,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| compare_names(&a.full_name, &b.full_name))
            .then_with(|| a.color.cmp(&b.color))
    });
    entries
}

/// Collation-style name order, compared level by level: base letters with
/// accents and case folded away, then accents, then case with lowercase
/// first. Exact code points settle anything left, so distinct names never
/// compare equal.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(&base_letters(b))
        .then_with(|| folded(a).cmp(&folded(b)))
        .then_with(|| case_pattern(a).cmp(&case_pattern(b)))
        .then_with(|| a.cmp(b))
}

fn base_letters(name: &str) -> Vec<char> {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn folded(name: &str) -> Vec<char> {
    name.nfd().flat_map(char::to_lowercase).collect()
}

fn case_pattern(name: &str) -> Vec<bool> {
    name.nfd().map(char::is_uppercase).collect()
}

/// Render a tally in export form, one "<count> <full name>" per line.
pub fn format_canonical(entries: &[TallyEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{} {}", e.count, e.full_name))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TallyParseError {
    #[error("line {line}: expected a leading card count in {content:?}")]
    MissingCount { line: usize, content: String },

    #[error("line {line}: card name is empty")]
    EmptyName { line: usize },

    #[error("line {line}: unknown color {color:?}")]
    InvalidColor { line: usize, color: String },
}

/// A line read back from exported text. Legacy lines carry a color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedEntry {
    pub count: usize,
    pub full_name: String,
    pub color: Option<Color>,
}

/// Parse exported tally text in either the current or the legacy format.
///
/// Blank lines are skipped. Line numbers in errors are 1-based.
pub fn parse_export(text: &str) -> Result<Vec<ImportedEntry>, TallyParseError> {
    let mut entries = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        entries.push(parse_line(i + 1, line)?);
    }
    Ok(entries)
}

fn parse_line(line_no: usize, line: &str) -> Result<ImportedEntry, TallyParseError> {
    let digits = line.find(|c: char| !c.is_ascii_digit()).unwrap_or(line.len());
    let count: usize = line[..digits]
        .parse()
        .map_err(|_| TallyParseError::MissingCount {
            line: line_no,
            content: line.to_string(),
        })?;
    let rest = line[digits..].trim_start();

    // Legacy: "<count> - <full name> - <color>". Names may contain " - "
    // themselves, so the color is split off from the right.
    if let Some(body) = rest.strip_prefix('-') {
        let body = body.trim();
        let (name, color_label) = body.rsplit_once(" - ").ok_or(TallyParseError::InvalidColor {
            line: line_no,
            color: String::new(),
        })?;
        let color = Color::from_label(color_label).ok_or_else(|| TallyParseError::InvalidColor {
            line: line_no,
            color: color_label.trim().to_string(),
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(TallyParseError::EmptyName { line: line_no });
        }
        return Ok(ImportedEntry {
            count,
            full_name: name.to_string(),
            color: Some(color),
        });
    }

    if rest.is_empty() {
        return Err(TallyParseError::EmptyName { line: line_no });
    }
    Ok(ImportedEntry {
        count,
        full_name: rest.to_string(),
        color: None,
    })
}

/// Resolve imported entries against the card pool.
///
/// Each entry expands to `count` copies of the first pool card whose name
/// (and color, when the line carried one) matches. Names that match nothing
/// are returned separately.
pub fn resolve_import(entries: &[ImportedEntry], pool: &[Card]) -> (Vec<Card>, Vec<String>) {
    let mut cards = Vec::new();
    let mut unknown = Vec::new();
    for entry in entries {
        let found = pool.iter().find(|c| {
            c.full_name == entry.full_name && entry.color.map_or(true, |color| c.color == color)
        });
        match found {
            Some(card) => cards.extend(std::iter::repeat(card.clone()).take(entry.count)),
            None => unknown.push(entry.full_name.clone()),
        }
    }
    (cards, unknown)
}
