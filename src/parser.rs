//! OCR text parsing
//!
//! Second pass: turn the raw OCR text captured for each table into typed
//! metric rows. A small state machine tracks whether rows belong to the
//! base or the tuned section; data rows are tried before context triggers
//! so a model named "BaseModel" cannot flip the state.

use crate::artifact::TABLES_MARKER;
use crate::markdown::{render_table, RenderedTable};
use crate::pipeline::{DocumentExtract, TableSource};
use once_cell::sync::Lazy;
use regex::Regex;

/// Which section of a results table a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricContext {
    Base,
    Tuned,
}

/// One parsed metric row.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub model: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Rows of one table, split by context.
#[derive(Debug, Clone, Default)]
pub struct TableSections {
    pub base: Vec<ParsedRow>,
    pub tuned: Vec<ParsedRow>,
}

// Model name, then three floats; OCR may drop the leading zero (".8856")
static ROW_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(.+?)\s+([0-9]*\.\d+)\s+([0-9]*\.\d+)\s+([0-9]*\.\d+)")
        .unwrap_or_else(|e| panic!("invalid row regex: {e}"))
});

static CAPTION_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Caption: TABLE \d+\.?")
        .unwrap_or_else(|e| panic!("invalid caption label regex: {e}"))
});

static TABLE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)TABLE \d+\.?").unwrap_or_else(|e| panic!("invalid table number regex: {e}"))
});

/// Parse one table's OCR text into base and tuned rows.
///
/// Column order in the source is precision, recall, f1. Context switches on
/// lines containing "optimal" or "tuned" (to tuned) or "base" (back to
/// base); rows before any trigger are base rows.
pub fn parse_table_block(text: &str) -> TableSections {
    let mut sections = TableSections::default();
    let mut context = MetricContext::Base;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = ROW_PATTERN.captures(line) {
            let parsed = (
                caps[2].parse::<f64>(),
                caps[3].parse::<f64>(),
                caps[4].parse::<f64>(),
            );
            if let (Ok(precision), Ok(recall), Ok(f1)) = parsed {
                let row = ParsedRow {
                    model: caps[1].trim().to_string(),
                    precision,
                    recall,
                    f1,
                };
                match context {
                    MetricContext::Base => sections.base.push(row),
                    MetricContext::Tuned => sections.tuned.push(row),
                }
                continue;
            }
        }

        let lower = line.to_lowercase();
        if lower.contains("optimal") || lower.contains("tuned") {
            context = MetricContext::Tuned;
        } else if lower.contains("base") {
            context = MetricContext::Base;
        }
    }

    sections
}

/// Render a table's sections, base first. Empty sections produce nothing.
fn render_sections(caption: &str, sections: &TableSections) -> Vec<RenderedTable> {
    let mut tables = Vec::new();
    for (context, rows) in [
        (MetricContext::Base, &sections.base),
        (MetricContext::Tuned, &sections.tuned),
    ] {
        if !rows.is_empty() {
            tables.push(RenderedTable {
                caption: caption.to_string(),
                context,
                markdown: render_table(rows, context),
            });
        }
    }
    tables
}

/// Parse a serialized first-pass artifact into standardized tables.
///
/// The artifact is split on the image-table marker; a document with no
/// marker has zero tables. Within each marked section, "Caption: TABLE n."
/// labels delimit table blocks; text before the first label is skipped.
pub fn parse_artifact(content: &str) -> Vec<RenderedTable> {
    let mut tables = Vec::new();

    let mut parts = content.split(TABLES_MARKER);
    // Text before the first marker never holds table blocks
    let _preamble = parts.next();

    for section in parts {
        let labels: Vec<regex::Match> = CAPTION_LABEL.find_iter(section).collect();
        for (i, label) in labels.iter().enumerate() {
            let block_end = labels
                .get(i + 1)
                .map(|next| next.start())
                .unwrap_or(section.len());
            let block = &section[label.end()..block_end];
            tables.extend(render_sections(label.as_str(), &parse_table_block(block)));
        }
    }

    tables
}

/// Standardize a typed extract directly, without the text round trip.
///
/// Only OCR-sourced tables are parsed; natively covered tables carry no
/// recovered content. Produces the same tables `parse_artifact` would give
/// for the serialized form of the extract.
pub fn standardize_extract(extract: &DocumentExtract) -> Vec<RenderedTable> {
    let mut tables = Vec::new();
    for page in &extract.pages {
        for table in &page.tables {
            if table.source != TableSource::Ocr {
                continue;
            }
            // The serialized block starts right after the "Caption: TABLE n."
            // label, so the caption tail is its first line and can carry a
            // context trigger. Prepend it here to keep both paths identical.
            let (label, block) = match TABLE_NUMBER.find(&table.caption) {
                Some(m) => (
                    format!("Caption: {}", m.as_str()),
                    format!("{}\n{}", &table.caption[m.end()..], table.content),
                ),
                None => (format!("Caption: {}", table.caption), table.content.clone()),
            };
            tables.extend(render_sections(&label, &parse_table_block(&block)));
        }
    }
    tables
}
