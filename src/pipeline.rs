//! First-pass extraction pipeline
//!
//! Walks a loaded document page by page: finds captions, checks native
//! coverage, infers crop regions for uncovered captions and OCRs them.
//! Produces a typed extract plus a report; nothing here touches process
//! globals, so documents can be processed in parallel.

use crate::captions::{find_table_captions, Caption};
use crate::coverage::{covering_table, TableDetector};
use crate::extractor::PaperDocument;
use crate::ocr::OcrEngine;
use crate::regions::{infer_region, RegionOutcome};
use crate::strategy::StrategyRegistry;
use crate::ExtractError;
use log::info;
use std::collections::HashSet;

/// How a table's content was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    /// A text-layer table already covers the caption; no content recovered
    Native,
    /// Content recovered by rendering and OCRing a crop region
    Ocr,
}

/// One table attributed to a caption.
#[derive(Debug, Clone)]
pub struct ExtractedTable {
    /// Page number (1-indexed)
    pub page: u32,
    /// Full caption text
    pub caption: String,
    /// Recovered text; empty for natively covered tables
    pub content: String,
    pub source: TableSource,
}

/// One page of the extract.
#[derive(Debug, Clone)]
pub struct PageExtract {
    pub number: u32,
    /// Plain page text
    pub text: String,
    pub tables: Vec<ExtractedTable>,
}

/// The typed result of the first pass, one per document.
#[derive(Debug, Clone, Default)]
pub struct DocumentExtract {
    pub pages: Vec<PageExtract>,
}

/// Counters and the processing log for one document.
#[derive(Debug, Clone, Default)]
pub struct ExtractReport {
    /// Captions attributed to a table, covered or not
    pub total_tables: u32,
    /// Captions routed to OCR
    pub image_tables: u32,
    /// Log lines mentioning a warning or error
    pub error_count: u32,
    pub log: Vec<String>,
}

impl ExtractReport {
    /// Record a log line, counting warnings and errors by substring the
    /// same way the summary footer reports them.
    pub fn note(&mut self, message: String) {
        info!("{message}");
        if message.contains("Warning") || message.contains("Error") {
            self.error_count += 1;
        }
        self.log.push(message);
    }
}

// Captions are deduplicated by text and position; the same table caption
// can legitimately appear twice on a page (e.g. continued tables), while a
// caption split into duplicate spans should be handled once.
fn dedup_key(caption: &Caption) -> (String, [u32; 4]) {
    (
        caption.text.clone(),
        [
            caption.bbox.x0.to_bits(),
            caption.bbox.y0.to_bits(),
            caption.bbox.x1.to_bits(),
            caption.bbox.y1.to_bits(),
        ],
    )
}

/// Run the first pass over a document.
///
/// Counters move even when OCR yields nothing, but only non-empty OCR text
/// becomes an [`ExtractedTable`] with content. OCR and rendering failures
/// abort the document; callers decide whether to continue with the next.
pub fn extract_document(
    doc: &PaperDocument,
    detector: &dyn TableDetector,
    ocr: &dyn OcrEngine,
    strategies: &StrategyRegistry,
) -> Result<(DocumentExtract, ExtractReport), ExtractError> {
    let mut extract = DocumentExtract::default();
    let mut report = ExtractReport::default();

    let first_page_text = doc.pages.first().map(|p| p.text.as_str()).unwrap_or("");
    let strategy = strategies.select(first_page_text);
    report.note(format!("Using extraction strategy: {}", strategy.name()));

    for page in &doc.pages {
        report.note(format!("Processing Page {}...", page.number));

        let captions = find_table_captions(page, strategy.caption_pattern());
        let native_tables = detector.tables_on_page(page.number)?;
        let mut handled: HashSet<(String, [u32; 4])> = HashSet::new();
        let mut tables = Vec::new();

        for (i, caption) in captions.iter().enumerate() {
            report.note(format!("  Found Caption: {}", caption.text));

            if !handled.insert(dedup_key(caption)) {
                continue;
            }

            if covering_table(&native_tables, &caption.bbox).is_some() {
                report.note("    -> Covered by standard table extraction.".to_string());
                report.total_tables += 1;
                tables.push(ExtractedTable {
                    page: page.number,
                    caption: caption.text.clone(),
                    content: String::new(),
                    source: TableSource::Native,
                });
                continue;
            }

            report.note("    -> Not covered by standard table. Initiating OCR...".to_string());
            report.image_tables += 1;
            report.total_tables += 1;

            let next_top = captions.get(i + 1).map(|c| c.bbox.y0);
            let (layout, outcome) =
                infer_region(&caption.bbox, page.number, page.width, page.height, next_top);
            report.note(format!("    -> Detected {}", layout.describe()));

            let region = match outcome {
                RegionOutcome::Usable(region) => region,
                RegionOutcome::Recovered(region) => {
                    report.note(
                        "    [Warning] Invalid crop region calculated. Using default height."
                            .to_string(),
                    );
                    region
                }
                RegionOutcome::OffPage => {
                    report.note("    [Warning] Caption at bottom of page. Skipping.".to_string());
                    continue;
                }
            };
            report.note(format!(
                "    Region: ({:.1}, {:.1}, {:.1}, {:.1})",
                region.rect.x0, region.rect.y0, region.rect.x1, region.rect.y1
            ));

            let content = ocr.recognize_region(&doc.path, page.number, &region.rect)?;
            if !content.is_empty() {
                tables.push(ExtractedTable {
                    page: page.number,
                    caption: caption.text.clone(),
                    content,
                    source: TableSource::Ocr,
                });
            }
        }

        extract.pages.push(PageExtract {
            number: page.number,
            text: page.text.clone(),
            tables,
        });
    }

    Ok((extract, report))
}
