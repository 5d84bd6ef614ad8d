//! Native table coverage
//!
//! Decides whether a caption is already served by a table the text-layer
//! detector found, so the expensive OCR fallback only runs for captions
//! whose table content is an embedded image.

use crate::extractor::{base_font_size, PaperDocument, TextSpan};
use crate::geometry::Rect;
use crate::ExtractError;
use std::collections::HashMap;

/// Source of already-detected table regions, queried per page.
pub trait TableDetector {
    /// Bounding boxes of detected tables on a page, top-origin coordinates.
    fn tables_on_page(&self, page: u32) -> Result<Vec<Rect>, ExtractError>;
}

/// Return the first table that covers a caption, if any.
///
/// A table covers a caption when it starts strictly below the caption with
/// a vertical gap under 100 layout units, and the caption's horizontal
/// midpoint falls strictly inside the table's x extent. Zero gap (touching
/// boxes) does not count.
pub fn covering_table(tables: &[Rect], caption: &Rect) -> Option<Rect> {
    tables
        .iter()
        .find(|table| {
            let gap = caption.gap_below(table);
            gap > 0.0 && gap < 100.0 && table.contains_x(caption.mid_x())
        })
        .copied()
}

/// Tuning knobs for the grid detector.
#[derive(Debug, Clone)]
pub struct GridDetectorConfig {
    /// Spans at or below this fraction of the body font size are table candidates
    pub font_ratio: f32,
    /// Ignore spans smaller than this (likely artifacts)
    pub min_font_size: f32,
    /// Vertical gap that splits two table regions
    pub region_gap: f32,
    /// Minimum distinct rows per region
    pub min_rows: usize,
    /// Minimum spans per region
    pub min_spans: usize,
    /// Column count bounds for a plausible table
    pub min_columns: usize,
    pub max_columns: usize,
    /// Fraction of spans that must align to a column
    pub min_alignment: f32,
    /// Horizontal tolerance for column alignment
    pub alignment_tolerance: f32,
}

impl Default for GridDetectorConfig {
    fn default() -> Self {
        Self {
            font_ratio: 0.90,
            min_font_size: 6.0,
            region_gap: 30.0,
            min_rows: 4,
            min_spans: 6,
            min_columns: 2,
            max_columns: 15,
            min_alignment: 0.5,
            alignment_tolerance: 40.0,
        }
    }
}

/// Detects text-layer tables by clustering small-font spans into aligned
/// grids. Tables rendered as embedded images have no spans and are invisible
/// to this detector, which is exactly what routes them to OCR.
pub struct GridTableDetector {
    tables_by_page: HashMap<u32, Vec<Rect>>,
}

impl GridTableDetector {
    /// Run detection over every page of a loaded document.
    pub fn from_document(doc: &PaperDocument, config: &GridDetectorConfig) -> Self {
        let mut tables_by_page = HashMap::new();
        for page in &doc.pages {
            let tables = detect_grid_tables(&page.spans, config);
            if !tables.is_empty() {
                tables_by_page.insert(page.number, tables);
            }
        }
        Self { tables_by_page }
    }
}

impl TableDetector for GridTableDetector {
    fn tables_on_page(&self, page: u32) -> Result<Vec<Rect>, ExtractError> {
        Ok(self.tables_by_page.get(&page).cloned().unwrap_or_default())
    }
}

/// Detect table bounding boxes in a page's spans.
fn detect_grid_tables(spans: &[TextSpan], config: &GridDetectorConfig) -> Vec<Rect> {
    if spans.len() < config.min_spans {
        return vec![];
    }

    let base_size = base_font_size(spans);
    let threshold = base_size * config.font_ratio;

    let candidates: Vec<&TextSpan> = spans
        .iter()
        .filter(|s| s.font_size <= threshold && s.font_size >= config.min_font_size)
        .collect();

    if candidates.len() < config.min_spans {
        return vec![];
    }

    let mut tables = Vec::new();
    for (y_min, y_max) in find_table_regions(&candidates, config) {
        let region_spans: Vec<&TextSpan> = candidates
            .iter()
            .filter(|s| s.bbox.y0 >= y_min && s.bbox.y0 <= y_max)
            .copied()
            .collect();

        if region_spans.len() < config.min_spans {
            continue;
        }

        let columns = find_column_boundaries(&region_spans);
        if columns.len() < config.min_columns || columns.len() > config.max_columns {
            continue;
        }

        let aligned = region_spans
            .iter()
            .filter(|s| {
                columns
                    .iter()
                    .any(|&col| (s.bbox.x0 - col).abs() < config.alignment_tolerance)
            })
            .count();
        if (aligned as f32 / region_spans.len() as f32) < config.min_alignment {
            continue;
        }

        let bbox = region_spans
            .iter()
            .skip(1)
            .fold(region_spans[0].bbox, |acc, s| acc.union(&s.bbox));
        tables.push(bbox);
    }

    tables
}

/// Find vertical bands dense enough in candidate spans to hold a table.
/// Bands are split where the gap between consecutive rows exceeds the
/// configured threshold, and kept only with enough distinct rows.
fn find_table_regions(candidates: &[&TextSpan], config: &GridDetectorConfig) -> Vec<(f32, f32)> {
    if candidates.is_empty() {
        return vec![];
    }

    let mut y_positions: Vec<f32> = candidates.iter().map(|s| s.bbox.y0).collect();
    y_positions.sort_by(|a, b| a.total_cmp(b));

    let mut regions = Vec::new();
    let mut region_start = y_positions[0];
    let mut region_end = y_positions[0];
    let mut region_count = 1;

    for &y in &y_positions[1..] {
        if y - region_end > config.region_gap {
            if region_count >= config.min_rows {
                regions.push((region_start - 5.0, region_end + 5.0));
            }
            region_start = y;
            region_end = y;
            region_count = 1;
        } else {
            region_end = y;
            region_count += 1;
        }
    }

    if region_count >= config.min_rows {
        regions.push((region_start - 5.0, region_end + 5.0));
    }

    regions
}

/// Cluster span left edges into column positions.
fn find_column_boundaries(spans: &[&TextSpan]) -> Vec<f32> {
    let mut x_positions: Vec<f32> = spans.iter().map(|s| s.bbox.x0).collect();
    x_positions.sort_by(|a, b| a.total_cmp(b));

    if x_positions.is_empty() {
        return vec![];
    }

    // Adaptive threshold: tighter for dense x ranges, looser for sparse
    let x_range = x_positions[x_positions.len() - 1] - x_positions[0];
    let avg_gap = if x_positions.len() > 1 {
        x_range / (x_positions.len() - 1) as f32
    } else {
        60.0
    };
    let cluster_threshold = avg_gap.clamp(25.0, 50.0);

    let mut columns = Vec::new();
    let mut cluster: Vec<f32> = vec![x_positions[0]];

    for &x in &x_positions[1..] {
        let center = cluster.iter().sum::<f32>() / cluster.len() as f32;
        if x - center > cluster_threshold {
            columns.push(center);
            cluster = vec![x];
        } else {
            cluster.push(x);
        }
    }
    columns.push(cluster.iter().sum::<f32>() / cluster.len() as f32);

    // Drop columns that only a stray span or two align to
    let min_items = (spans.len() / columns.len().max(1) / 4).max(2);
    columns
        .into_iter()
        .filter(|&col| {
            spans
                .iter()
                .filter(|s| (s.bbox.x0 - col).abs() < cluster_threshold)
                .count()
                >= min_items
        })
        .collect()
}
