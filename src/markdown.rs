//! Standardized markdown rendering
//!
//! Renders parsed metric rows as fixed four-column markdown tables with a
//! context banner, and formats metric values uniformly to four decimals
//! with a leading zero.

use crate::parser::{MetricContext, ParsedRow};

/// A rendered table, one per (caption, context) pair with data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTable {
    /// The normalized caption label, e.g. "Caption: TABLE 3."
    pub caption: String,
    pub context: MetricContext,
    pub markdown: String,
}

/// Format a metric to four decimals. The leading-zero guard covers
/// formatters that render sub-one values as ".9123".
pub fn format_metric(value: f64) -> String {
    let formatted = format!("{:.4}", value);
    if let Some(stripped) = formatted.strip_prefix('.') {
        return format!("0.{stripped}");
    }
    formatted
}

/// Format a raw cell value: numeric input is normalized to four decimals,
/// anything unparseable passes through verbatim.
pub fn format_value(value: &str) -> String {
    match value.trim().parse::<f64>() {
        Ok(v) => format_metric(v),
        Err(_) => value.to_string(),
    }
}

/// Banner line naming the metric context.
pub fn context_label(context: MetricContext) -> &'static str {
    match context {
        MetricContext::Base => "**Context: Base Performance**",
        MetricContext::Tuned => "**Context: Tuned/Optimized Performance**",
    }
}

/// Render rows under a context banner as a markdown table.
///
/// Column order is Model, F1, Precision, Recall regardless of the order
/// metrics appeared in the source text. No trailing newline.
pub fn render_table(rows: &[ParsedRow], context: MetricContext) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 4);
    lines.push(context_label(context).to_string());
    lines.push(String::new());
    lines.push("| Model | F1 Score | Precision | Recall |".to_string());
    lines.push("| :--- | ---: | ---: | ---: |".to_string());

    for row in rows {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            row.model,
            format_metric(row.f1),
            format_metric(row.precision),
            format_metric(row.recall)
        ));
    }

    lines.join("\n")
}

/// Parse one rendered data row back into its typed form. Header, alignment,
/// and banner lines return None.
pub fn parse_markdown_row(line: &str) -> Option<ParsedRow> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|')?.strip_suffix('|')?;
    let cells: Vec<&str> = inner.split('|').map(str::trim).collect();
    if cells.len() != 4 {
        return None;
    }
    Some(ParsedRow {
        model: cells[0].to_string(),
        f1: cells[1].parse().ok()?,
        precision: cells[2].parse().ok()?,
        recall: cells[3].parse().ok()?,
    })
}
