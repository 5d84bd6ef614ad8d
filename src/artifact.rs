//! Text artifact serialization
//!
//! The first pass persists its result as a plain-text artifact with literal
//! section markers; the second pass finds table blocks again by scanning
//! for those markers. The byte layout here is load-bearing for any consumer
//! already parsing these files.

use crate::markdown::RenderedTable;
use crate::pipeline::{DocumentExtract, ExtractReport, TableSource};
use chrono::Local;

/// Opens the per-page block of OCR-recovered tables.
pub const TABLES_MARKER: &str = "=== DETECTED IMAGE-BASED TABLES ===";

/// Closes one table's content.
pub const TABLE_FOOTER: &str = "===================================";

/// Opens the appended standardized section.
pub const STANDARDIZED_MARKER: &str = "=== STANDARDIZED MARKDOWN TABLES ===";

/// Serialize the typed extract to the artifact body.
///
/// Per page: a page header, the page text, then, only when the page has
/// OCR-recovered tables, the marker followed by caption, content, and
/// footer for each. Natively covered tables carry no content and are not
/// serialized. Lines are joined with a single newline.
pub fn render_artifact(extract: &DocumentExtract) -> String {
    let mut parts: Vec<String> = Vec::new();

    for page in &extract.pages {
        parts.push(format!("--- Page {} ---", page.number));
        parts.push(page.text.clone());

        let ocr_tables: Vec<_> = page
            .tables
            .iter()
            .filter(|t| t.source == TableSource::Ocr)
            .collect();
        if !ocr_tables.is_empty() {
            parts.push(format!("\n{TABLES_MARKER}"));
            for table in ocr_tables {
                parts.push(format!("Caption: {}", table.caption));
                parts.push(table.content.clone());
                parts.push(format!("{TABLE_FOOTER}\n"));
            }
        }
    }

    parts.join("\n")
}

/// The summary footer appended after the artifact body.
pub fn summary_block(report: &ExtractReport) -> String {
    summary_block_at(report, &Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
}

fn summary_block_at(report: &ExtractReport, timestamp: &str) -> String {
    format!(
        "\n\n--- PROCESSING SUMMARY ---\n\
         Total Tables Detected: {}\n\
         Image-Based Tables Extracted: {}\n\
         Issues/Errors: {}\n\
         Processing Date: {}\n",
        report.total_tables, report.image_tables, report.error_count, timestamp
    )
}

/// The standardized-tables section appended by the second pass.
pub fn standardized_section(tables: &[RenderedTable]) -> String {
    let mut out = format!("\n\n{STANDARDIZED_MARKER}\n");
    if tables.is_empty() {
        out.push_str("\nNo standardized tables available.\n");
    } else {
        for table in tables {
            out.push_str(&format!("\n## {}\n{}\n", table.caption, table.markdown));
        }
    }
    out
}
