//! Table caption location
//!
//! Finds spans whose text announces a table ("TABLE 3.", "Table 1") and
//! orders them top to bottom so downstream region inference can use the
//! next caption as a vertical stop.

use crate::extractor::PaperPage;
use crate::geometry::Rect;
use regex::Regex;

/// A located table caption.
#[derive(Debug, Clone)]
pub struct Caption {
    /// Full text of the caption span
    pub text: String,
    /// Bounding box in top-origin page coordinates
    pub bbox: Rect,
    /// Page number (1-indexed)
    pub page: u32,
}

/// Find caption spans on a page, sorted by vertical position (top first).
///
/// The pattern is matched against the start of each span's trimmed text,
/// so body-text references like "as shown in Table 2" do not qualify.
pub fn find_table_captions(page: &PaperPage, pattern: &Regex) -> Vec<Caption> {
    let mut captions: Vec<Caption> = page
        .spans
        .iter()
        .filter(|span| pattern.is_match(span.text.trim()))
        .map(|span| Caption {
            text: span.text.trim().to_string(),
            bbox: span.bbox,
            page: page.number,
        })
        .collect();

    captions.sort_by(|a, b| a.bbox.y0.total_cmp(&b.bbox.y0));
    captions
}
