//! Reads a loaded PDF into the IR: one [`Page`] per source page, with the
//! page's extracted text split into paragraphs.

use lopdf::{Dictionary, Object, ObjectId};
use tracing::debug;

use crate::error::{ConvertError, ConvertWarning};
use crate::ir::{Block, Document, Page, PageSize, Paragraph, Run};

/// Guards against cyclic `Parent` chains in malformed page trees.
const MAX_INHERIT_DEPTH: usize = 32;

/// Build the IR for every page of `pdf`, in page-number order.
pub fn read_document(
    pdf: &lopdf::Document,
) -> Result<(Document, Vec<ConvertWarning>), ConvertError> {
    let pages = pdf.get_pages();
    if pages.is_empty() {
        return Err(ConvertError::Parse("PDF contains no pages".to_string()));
    }

    let mut warnings = Vec::new();
    let mut doc = Document::default();

    for (number, page_id) in pages {
        let size = page_size(pdf, page_id).unwrap_or_else(|| {
            warnings.push(ConvertWarning {
                element: format!("Page {number}"),
                reason: "missing or malformed MediaBox, using A4".to_string(),
            });
            PageSize::default()
        });

        let blocks = match pdf.extract_text(&[number]) {
            Ok(text) => text_to_blocks(&text),
            Err(e) => {
                warnings.push(ConvertWarning {
                    element: format!("Page {number}"),
                    reason: format!("text extraction failed: {e}"),
                });
                Vec::new()
            }
        };

        if blocks.is_empty() {
            warnings.push(ConvertWarning {
                element: format!("Page {number}"),
                reason: "no extractable text (scanned image?)".to_string(),
            });
        }

        debug!(page = number, paragraphs = blocks.len(), "read page");
        doc.pages.push(Page {
            number,
            size,
            blocks,
        });
    }

    Ok((doc, warnings))
}

/// Split extracted page text into one paragraph per non-blank line.
pub fn text_to_blocks(text: &str) -> Vec<Block> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            Block::Paragraph(Paragraph {
                runs: vec![Run::new(line)],
            })
        })
        .collect()
}

/// Resolve the page's `MediaBox`, walking up the page tree for inherited values.
fn page_size(pdf: &lopdf::Document, page_id: ObjectId) -> Option<PageSize> {
    let mut current: &Dictionary = pdf.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_INHERIT_DEPTH {
        if let Ok(media_box) = current.get(b"MediaBox") {
            return media_box_size(pdf, media_box);
        }
        let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = pdf.get_dictionary(parent).ok()?;
    }
    None
}

fn media_box_size(pdf: &lopdf::Document, media_box: &Object) -> Option<PageSize> {
    let values = resolve(pdf, media_box)?.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let coords: Vec<f64> = values
        .iter()
        .map(|v| resolve(pdf, v).and_then(number))
        .collect::<Option<_>>()?;

    let width = (coords[2] - coords[0]).abs();
    let height = (coords[3] - coords[1]).abs();
    if width > 0.0 && height > 0.0 {
        Some(PageSize { width, height })
    } else {
        None
    }
}

fn resolve<'a>(pdf: &'a lopdf::Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => pdf.get_object(*id).ok(),
        other => Some(other),
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}
