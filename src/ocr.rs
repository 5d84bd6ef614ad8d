//! OCR over rendered page regions
//!
//! Renders a crop of a PDF page to a PNG with pdftoppm, then recognizes it
//! with tesseract. Both run as external commands so the crate has no native
//! library build requirements; a missing binary surfaces as an OCR error on
//! the first table that needs it.

use crate::geometry::Rect;
use crate::ExtractError;
use log::debug;
use std::path::Path;
use std::process::Command;

/// Rendering and recognition settings.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Render scale relative to 72 dpi; 3.0 gives 216 dpi
    pub zoom: f32,
    /// Tesseract page segmentation mode; 6 assumes a uniform text block
    pub page_segmentation_mode: u32,
    /// Tesseract language pack
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            zoom: 3.0,
            page_segmentation_mode: 6,
            language: "eng".to_string(),
        }
    }
}

/// Recognizes text inside a region of a PDF page.
pub trait OcrEngine {
    /// OCR the given region. Coordinates are top-origin layout units.
    /// Returns trimmed recognized text, possibly empty.
    fn recognize_region(&self, pdf: &Path, page: u32, region: &Rect)
        -> Result<String, ExtractError>;
}

/// Shell-out engine using poppler's pdftoppm for rendering and tesseract
/// for recognition.
pub struct TesseractOcr {
    config: OcrConfig,
}

impl TesseractOcr {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    fn dpi(&self) -> u32 {
        (self.config.zoom * 72.0).round() as u32
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new(OcrConfig::default())
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize_region(
        &self,
        pdf: &Path,
        page: u32,
        region: &Rect,
    ) -> Result<String, ExtractError> {
        let dir = tempfile::tempdir().map_err(ExtractError::Io)?;
        let prefix = dir.path().join("region");

        // pdftoppm crops in pixels at the render dpi
        let scale = self.dpi() as f32 / 72.0;
        let x = (region.x0 * scale).round() as i64;
        let y = (region.y0 * scale).round() as i64;
        let w = (region.width() * scale).round() as i64;
        let h = (region.height() * scale).round() as i64;

        debug!(
            "rendering {} page {} crop ({x}, {y}, {w}x{h}px) at {} dpi",
            pdf.display(),
            page,
            self.dpi()
        );
        let output = Command::new("pdftoppm")
            .arg("-r")
            .arg(self.dpi().to_string())
            .arg("-png")
            .arg("-f")
            .arg(page.to_string())
            .arg("-l")
            .arg(page.to_string())
            .arg("-x")
            .arg(x.to_string())
            .arg("-y")
            .arg(y.to_string())
            .arg("-W")
            .arg(w.to_string())
            .arg("-H")
            .arg(h.to_string())
            .arg(pdf)
            .arg(&prefix)
            .output()
            .map_err(|e| ExtractError::Render(format!("failed to run pdftoppm: {e}")))?;

        if !output.status.success() {
            return Err(ExtractError::Render(format!(
                "pdftoppm exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        // pdftoppm zero-pads the page number in the output name depending on
        // the document's page count, so scan the directory instead of
        // guessing the suffix.
        let png = std::fs::read_dir(dir.path())
            .map_err(ExtractError::Io)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .find(|path| path.extension().is_some_and(|ext| ext == "png"))
            .ok_or_else(|| ExtractError::Render("pdftoppm produced no output image".to_string()))?;

        debug!(
            "recognizing {} with psm {}",
            png.display(),
            self.config.page_segmentation_mode
        );
        let output = Command::new("tesseract")
            .arg(&png)
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.language)
            .arg("--psm")
            .arg(self.config.page_segmentation_mode.to_string())
            .output()
            .map_err(|e| ExtractError::Ocr(format!("failed to run tesseract: {e}")))?;

        if !output.status.success() {
            return Err(ExtractError::Ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
