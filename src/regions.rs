//! Crop region inference
//!
//! Given a caption with no covering text-layer table, guess where the
//! rendered table sits: which column of a two-column paper layout, and how
//! far down the page the crop should extend.

use crate::geometry::Rect;
use log::warn;

/// Horizontal slice of the page a caption belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLayout {
    /// Caption midpoint left of 45% of page width
    Left,
    /// Caption midpoint right of 55% of page width
    Right,
    /// Midpoint in the ambiguous middle band
    Full,
}

impl ColumnLayout {
    pub fn describe(&self) -> &'static str {
        match self {
            ColumnLayout::Left => "Left Column Layout",
            ColumnLayout::Right => "Right Column Layout",
            ColumnLayout::Full => "Full Width / Unknown Layout",
        }
    }
}

/// A crop region on a page, ready to be rendered and OCRed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRegion {
    pub page: u32,
    pub rect: Rect,
}

/// Result of region inference for one caption.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionOutcome {
    /// A usable crop region
    Usable(TableRegion),
    /// The first guess collapsed; a fixed-height fallback was substituted
    Recovered(TableRegion),
    /// The caption sits at or past the bottom edge; nothing to crop
    OffPage,
}

/// Infer the crop region below a caption.
///
/// The crop starts just under the caption and runs to just above the next
/// caption when one follows far enough below, otherwise to a fixed depth
/// clamped near the page bottom. `next_caption_top` is the y of the next
/// caption on the same page, if any.
pub fn infer_region(
    caption_bbox: &Rect,
    page: u32,
    page_width: f32,
    page_height: f32,
    next_caption_top: Option<f32>,
) -> (ColumnLayout, RegionOutcome) {
    let mid = caption_bbox.mid_x();
    let (layout, x0, x1) = if mid < page_width * 0.45 {
        (ColumnLayout::Left, 0.0, page_width * 0.55)
    } else if mid > page_width * 0.55 {
        (ColumnLayout::Right, page_width * 0.45, page_width)
    } else {
        (ColumnLayout::Full, 0.0, page_width)
    };

    let y0 = caption_bbox.y1 + 5.0;
    if y0 >= page_height {
        warn!(
            "caption on page {} is at the bottom edge (y0 {:.1} >= height {:.1}), skipping",
            page, y0, page_height
        );
        return (layout, RegionOutcome::OffPage);
    }

    // Stop above the next caption only when it leaves room for a table
    let y1 = match next_caption_top {
        Some(top) if top > y0 + 20.0 => top - 5.0,
        _ => (y0 + 500.0).min(page_height - 50.0),
    };

    let rect = Rect::new(x0, y0, x1, y1);
    if rect.is_degenerate() {
        let fallback = (y0 + 300.0).min(page_height);
        warn!(
            "degenerate crop on page {} (y1 {:.1} <= y0 {:.1}), using fixed height",
            page, y1, y0
        );
        let region = TableRegion {
            page,
            rect: Rect::new(x0, y0, x1, fallback),
        };
        return (layout, RegionOutcome::Recovered(region));
    }

    (layout, RegionOutcome::Usable(TableRegion { page, rect }))
}
