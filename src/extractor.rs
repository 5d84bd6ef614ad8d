//! Positioned text extraction from PDF using lopdf
//!
//! Walks each page's content stream the PDF way (text matrix + CTM) and
//! emits spans with estimated bounding boxes in top-origin coordinates,
//! plus the page's plain text and dimensions. This is the input model for
//! caption location, coverage checking, and region inference.

use crate::geometry::Rect;
use crate::ExtractError;
use lopdf::{Document, Object, ObjectId};
use std::path::{Path, PathBuf};

/// A text span with an estimated bounding box.
///
/// Glyph widths are not consulted; the horizontal extent is approximated at
/// half an em per character, which is accurate enough for midpoint-based
/// column classification.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// Bounding box in top-origin page coordinates
    pub bbox: Rect,
    /// Font name
    pub font: String,
    /// Effective (rendered) font size
    pub font_size: f32,
    /// Page number (1-indexed)
    pub page: u32,
}

/// One page of a loaded document.
#[derive(Debug, Clone)]
pub struct PaperPage {
    /// Page number (1-indexed)
    pub number: u32,
    /// Page width in layout units
    pub width: f32,
    /// Page height in layout units
    pub height: f32,
    /// Plain extracted text for the page
    pub text: String,
    /// Positioned spans for the page
    pub spans: Vec<TextSpan>,
}

/// A fully loaded document: the typed input for the recovery pipeline.
#[derive(Debug, Clone)]
pub struct PaperDocument {
    /// Source path, needed again when a region is rendered for OCR
    pub path: PathBuf,
    pub pages: Vec<PaperPage>,
}

impl PaperDocument {
    /// Load a PDF and extract per-page text, dimensions, and spans.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let doc = Document::load(&path)?;
        let lopdf_pages = doc.get_pages();
        let mut pages = Vec::with_capacity(lopdf_pages.len());

        for (&page_num, &page_id) in lopdf_pages.iter() {
            let (width, height) = page_dimensions(&doc, page_id);
            let text = doc
                .extract_text(&[page_num])
                .map_err(|e| ExtractError::Parse(e.to_string()))?;
            let spans = extract_page_spans(&doc, page_id, page_num, height)?;
            pages.push(PaperPage {
                number: page_num,
                width,
                height,
                text,
                spans,
            });
        }

        Ok(Self {
            path: path.as_ref().to_path_buf(),
            pages,
        })
    }
}

/// Resolve a page's MediaBox, following Parent inheritance. Falls back to
/// US Letter when the document does not declare one.
fn page_dimensions(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let mut current = page_id;
    for _ in 0..8 {
        let Ok(dict) = doc.get_dictionary(current) else {
            break;
        };
        if let Ok(media_box) = dict.get(b"MediaBox") {
            let array = match media_box {
                Object::Array(a) => Some(a.clone()),
                Object::Reference(id) => doc
                    .get_object(*id)
                    .ok()
                    .and_then(|obj| obj.as_array().ok())
                    .cloned(),
                _ => None,
            };
            if let Some(array) = array {
                let vals: Vec<f32> = array.iter().filter_map(get_number).collect();
                if vals.len() == 4 {
                    return ((vals[2] - vals[0]).abs(), (vals[3] - vals[1]).abs());
                }
            }
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(id)) => current = *id,
            _ => break,
        }
    }
    (612.0, 792.0)
}

/// Multiply two 2D transformation matrices
/// Matrix format: [a, b, c, d, e, f] representing:
/// | a  b  0 |
/// | c  d  0 |
/// | e  f  1 |
fn multiply_matrices(m1: &[f32; 6], m2: &[f32; 6]) -> [f32; 6] {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

/// Build a span from the current text state. The PDF y (bottom-origin
/// baseline) is flipped so that y grows downward and the box spans one
/// rendered em above the baseline.
fn make_span(
    text: String,
    text_matrix: &[f32; 6],
    ctm: &[f32; 6],
    font: &str,
    base_font_size: f32,
    page: u32,
    page_height: f32,
) -> TextSpan {
    let rendered_size = effective_font_size(base_font_size, text_matrix);
    let combined = multiply_matrices(text_matrix, ctm);
    let (x, y) = (combined[4], combined[5]);

    let width_est = text.chars().count() as f32 * rendered_size * 0.5;
    let bottom = page_height - y;
    let top = bottom - rendered_size;

    TextSpan {
        text,
        bbox: Rect::new(x, top, x + width_est, bottom),
        font: font.to_string(),
        font_size: rendered_size,
        page,
    }
}

/// Extract positioned spans from a single page.
fn extract_page_spans(
    doc: &Document,
    page_id: ObjectId,
    page_num: u32,
    page_height: f32,
) -> Result<Vec<TextSpan>, ExtractError> {
    use lopdf::content::Content;

    let mut spans = Vec::new();

    // Get fonts for encoding
    let fonts = doc.get_page_fonts(page_id).unwrap_or_default();

    let content_data = doc
        .get_page_content(page_id)
        .map_err(|e| ExtractError::Parse(e.to_string()))?;
    let content = Content::decode(&content_data).map_err(|e| ExtractError::Parse(e.to_string()))?;

    // Graphics state tracking
    let mut ctm = [1.0f32, 0.0, 0.0, 1.0, 0.0, 0.0];
    let mut ctm_stack: Vec<[f32; 6]> = Vec::new();

    // Text state tracking
    let mut current_font = String::new();
    let mut current_font_size: f32 = 12.0;
    let mut text_matrix = [1.0f32, 0.0, 0.0, 1.0, 0.0, 0.0];
    let mut line_matrix = [1.0f32, 0.0, 0.0, 1.0, 0.0, 0.0];
    let mut in_text_block = false;

    for op in &content.operations {
        match op.operator.as_str() {
            "q" => {
                ctm_stack.push(ctm);
            }
            "Q" => {
                if let Some(saved) = ctm_stack.pop() {
                    ctm = saved;
                }
            }
            "cm" => {
                if op.operands.len() >= 6 {
                    let new_matrix = [
                        get_number(&op.operands[0]).unwrap_or(1.0),
                        get_number(&op.operands[1]).unwrap_or(0.0),
                        get_number(&op.operands[2]).unwrap_or(0.0),
                        get_number(&op.operands[3]).unwrap_or(1.0),
                        get_number(&op.operands[4]).unwrap_or(0.0),
                        get_number(&op.operands[5]).unwrap_or(0.0),
                    ];
                    ctm = multiply_matrices(&new_matrix, &ctm);
                }
            }
            "BT" => {
                in_text_block = true;
                text_matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
                line_matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
            }
            "ET" => {
                in_text_block = false;
            }
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Ok(name) = op.operands[0].as_name() {
                        current_font = String::from_utf8_lossy(name).to_string();
                    }
                    if let Some(size) = get_number(&op.operands[1]) {
                        current_font_size = size;
                    }
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                    line_matrix[4] += tx;
                    line_matrix[5] += ty;
                    text_matrix = line_matrix;
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    for (i, operand) in op.operands.iter().take(6).enumerate() {
                        text_matrix[i] =
                            get_number(operand).unwrap_or(if i == 0 || i == 3 { 1.0 } else { 0.0 });
                    }
                    line_matrix = text_matrix;
                }
            }
            "T*" => {
                // Approximate line height
                line_matrix[5] -= current_font_size * 1.2;
                text_matrix = line_matrix;
            }
            "Tj" => {
                if in_text_block && !op.operands.is_empty() {
                    if let Some(text) =
                        extract_text_from_operand(&op.operands[0], doc, &fonts, &current_font)
                    {
                        if !text.trim().is_empty() {
                            spans.push(make_span(
                                text,
                                &text_matrix,
                                &ctm,
                                &current_font,
                                current_font_size,
                                page_num,
                                page_height,
                            ));
                        }
                    }
                }
            }
            "TJ" => {
                if in_text_block && !op.operands.is_empty() {
                    if let Ok(array) = op.operands[0].as_array() {
                        let mut combined_text = String::new();
                        for item in array {
                            if let Some(text) =
                                extract_text_from_operand(item, doc, &fonts, &current_font)
                            {
                                combined_text.push_str(&text);
                            }
                        }
                        if !combined_text.trim().is_empty() {
                            spans.push(make_span(
                                combined_text,
                                &text_matrix,
                                &ctm,
                                &current_font,
                                current_font_size,
                                page_num,
                                page_height,
                            ));
                        }
                    }
                }
            }
            "'" => {
                line_matrix[5] -= current_font_size * 1.2;
                text_matrix = line_matrix;
                if !op.operands.is_empty() {
                    if let Some(text) =
                        extract_text_from_operand(&op.operands[0], doc, &fonts, &current_font)
                    {
                        if !text.trim().is_empty() {
                            spans.push(make_span(
                                text,
                                &text_matrix,
                                &ctm,
                                &current_font,
                                current_font_size,
                                page_num,
                                page_height,
                            ));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Ok(spans)
}

/// Helper to get f32 from Object
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Compute effective font size from base size and text matrix
fn effective_font_size(base_size: f32, text_matrix: &[f32; 6]) -> f32 {
    let scale_x = (text_matrix[0].powi(2) + text_matrix[1].powi(2)).sqrt();
    let scale_y = (text_matrix[2].powi(2) + text_matrix[3].powi(2)).sqrt();
    // Usually equal for non-rotated text; take the larger
    let scale = scale_x.max(scale_y);
    base_size * scale
}

/// Extract text from a text operand, handling encoding
fn extract_text_from_operand(
    obj: &Object,
    doc: &Document,
    fonts: &std::collections::BTreeMap<Vec<u8>, &lopdf::Dictionary>,
    current_font: &str,
) -> Option<String> {
    if let Object::String(bytes, _) = obj {
        // Try to decode using font encoding
        if let Some(font_dict) = fonts.get(current_font.as_bytes()) {
            if let Ok(encoding) = font_dict.get_font_encoding(doc) {
                if let Ok(text) = Document::decode_text(&encoding, bytes) {
                    return Some(text);
                }
            }
        }

        // Fallback: try UTF-16BE then Latin-1
        if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
            let utf16: Vec<u16> = bytes[2..]
                .chunks_exact(2)
                .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
                .collect();
            return Some(String::from_utf16_lossy(&utf16));
        }

        // Latin-1 fallback
        Some(bytes.iter().map(|&b| b as char).collect())
    } else {
        None
    }
}

/// Most common font size at or above 9pt; smaller sizes are typically table
/// cells, footnotes, or captions. Defaults to 12pt on thin pages.
pub fn base_font_size(spans: &[TextSpan]) -> f32 {
    use std::collections::HashMap;

    let mut size_counts: HashMap<i32, usize> = HashMap::new();
    for span in spans {
        if span.font_size >= 9.0 {
            let size_key = (span.font_size * 10.0) as i32;
            *size_counts.entry(size_key).or_insert(0) += 1;
        }
    }

    size_counts
        .iter()
        .max_by_key(|(_, count)| *count)
        .map(|(size, _)| *size as f32 / 10.0)
        .unwrap_or(12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(size: f32) -> TextSpan {
        TextSpan {
            text: "x".into(),
            bbox: Rect::new(0.0, 0.0, 5.0, size),
            font: "F1".into(),
            font_size: size,
            page: 1,
        }
    }

    #[test]
    fn test_base_font_size_ignores_small_fonts() {
        let mut spans = vec![span(8.0), span(8.0), span(8.0), span(8.0)];
        spans.extend([span(10.0), span(10.0)]);
        assert_eq!(base_font_size(&spans), 10.0);
    }

    #[test]
    fn test_base_font_size_defaults() {
        assert_eq!(base_font_size(&[]), 12.0);
        assert_eq!(base_font_size(&[span(7.0)]), 12.0);
    }

    #[test]
    fn test_make_span_flips_y() {
        let tm = [1.0, 0.0, 0.0, 1.0, 100.0, 700.0];
        let ctm = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let s = make_span("TABLE 1".into(), &tm, &ctm, "F1", 10.0, 1, 792.0);
        // Baseline at PDF y=700 puts the box near the top of the page.
        assert_eq!(s.bbox.y1, 92.0);
        assert_eq!(s.bbox.y0, 82.0);
        assert_eq!(s.bbox.x0, 100.0);
        // 7 chars at half an em each
        assert_eq!(s.bbox.x1, 100.0 + 7.0 * 5.0);
    }

    #[test]
    fn test_effective_font_size_scales() {
        let tm = [2.0, 0.0, 0.0, 2.0, 0.0, 0.0];
        assert_eq!(effective_font_size(10.0, &tm), 20.0);
    }
}
