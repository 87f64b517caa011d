use std::io::Cursor;

use tracing::debug;

use crate::error::ConvertError;
use crate::ir::{Block, Document, Page, PageSize, Paragraph};

/// One inch, in twips.
const MARGIN_TWIPS: i32 = 1440;

/// Serialize an IR document into DOCX package bytes.
///
/// The single output section takes its page size from the first source page.
/// Source pages are separated by explicit page breaks.
pub fn write_docx(doc: &Document) -> Result<Vec<u8>, ConvertError> {
    let size = doc.pages.first().map(|p| p.size).unwrap_or_default();
    let mut docx = docx_rs::Docx::new()
        .page_size(size.width_twips(), size.height_twips())
        .page_margin(
            docx_rs::PageMargin::new()
                .top(MARGIN_TWIPS)
                .bottom(MARGIN_TWIPS)
                .left(MARGIN_TWIPS)
                .right(MARGIN_TWIPS),
        );

    for (i, page) in doc.pages.iter().enumerate() {
        if i > 0 {
            docx = docx.add_paragraph(page_break());
        }
        log_size_change(page, size);
        for block in &page.blocks {
            docx = match block {
                Block::Paragraph(para) => docx.add_paragraph(convert_paragraph(para)),
            };
        }
    }

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| ConvertError::Render(format!("failed to write DOCX package: {e}")))?;
    let bytes = cursor.into_inner();
    debug!(bytes = bytes.len(), pages = doc.pages.len(), "packed DOCX");
    Ok(bytes)
}

fn convert_paragraph(para: &Paragraph) -> docx_rs::Paragraph {
    para.runs.iter().fold(docx_rs::Paragraph::new(), |p, run| {
        p.add_run(docx_rs::Run::new().add_text(&run.text))
    })
}

fn page_break() -> docx_rs::Paragraph {
    docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_break(docx_rs::BreakType::Page))
}

fn log_size_change(page: &Page, section: PageSize) {
    if page.size != section {
        debug!(
            page = page.number,
            width = page.size.width,
            height = page.size.height,
            "page size differs from section size"
        );
    }
}
