//! Table recovery from research-paper PDFs using lopdf
//!
//! This crate provides:
//! - Caption-driven location of tables rendered as embedded images
//! - Crop-and-OCR recovery when no text-layer table covers a caption
//! - A plain-text artifact format with literal section markers
//! - A second pass parsing OCR text into standardized markdown tables

pub mod artifact;
pub mod captions;
pub mod coverage;
pub mod extractor;
pub mod geometry;
pub mod markdown;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod regions;
pub mod strategy;

pub use artifact::{render_artifact, standardized_section, summary_block};
pub use coverage::{GridDetectorConfig, GridTableDetector, TableDetector};
pub use extractor::PaperDocument;
pub use markdown::RenderedTable;
pub use ocr::{OcrConfig, OcrEngine, TesseractOcr};
pub use parser::{parse_artifact, standardize_extract};
pub use pipeline::{extract_document, DocumentExtract, ExtractReport};
pub use strategy::{ExtractionStrategy, StrategyRegistry};

use std::path::Path;

/// Result of running both passes over one document
#[derive(Debug)]
pub struct ProcessOutcome {
    /// Full artifact text: body, summary footer, standardized section
    pub artifact: String,
    /// Counters and log for the first pass
    pub report: ExtractReport,
    /// Standardized tables from the second pass
    pub tables: Vec<RenderedTable>,
}

/// Process a PDF end to end
///
/// This function will:
/// 1. Load the document and detect text-layer tables
/// 2. Find table captions and OCR the ones no native table covers
/// 3. Standardize the recovered tables and serialize everything
pub fn process_document<P: AsRef<Path>>(
    path: P,
    strategies: &StrategyRegistry,
    ocr: &dyn OcrEngine,
) -> Result<ProcessOutcome, ExtractError> {
    let doc = PaperDocument::load(path)?;
    let detector = GridTableDetector::from_document(&doc, &GridDetectorConfig::default());
    let (extract, report) = extract_document(&doc, &detector, ocr, strategies)?;
    let tables = standardize_extract(&extract);

    let mut output = render_artifact(&extract);
    output.push_str(&summary_block(&report));
    output.push_str(&standardized_section(&tables));

    Ok(ProcessOutcome {
        artifact: output,
        report,
        tables,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("render error: {0}")]
    Render(String),
    #[error("OCR error: {0}")]
    Ocr(String),
}

impl From<lopdf::Error> for ExtractError {
    fn from(e: lopdf::Error) -> Self {
        ExtractError::Parse(e.to_string())
    }
}
