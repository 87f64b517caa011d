//! Small text PDFs built in memory, for tests and benchmarks.

use lopdf::{Object, Stream, dictionary};

use crate::error::ConvertError;

/// Builds a PDF whose pages show lines of Courier text.
#[derive(Debug, Clone)]
pub struct PdfFixture {
    pages: Vec<Vec<String>>,
    media_box: (i64, i64),
    inherit_media_box: bool,
}

impl Default for PdfFixture {
    fn default() -> Self {
        // US Letter
        Self {
            pages: Vec::new(),
            media_box: (612, 792),
            inherit_media_box: false,
        }
    }
}

impl PdfFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page showing `lines`, one text line each.
    pub fn page(mut self, lines: &[&str]) -> Self {
        self.pages
            .push(lines.iter().map(|line| line.to_string()).collect());
        self
    }

    /// Page dimensions in points.
    pub fn media_box(mut self, width: i64, height: i64) -> Self {
        self.media_box = (width, height);
        self
    }

    /// Put the MediaBox on the Pages node instead of on each page.
    pub fn inherited_media_box(mut self) -> Self {
        self.inherit_media_box = true;
        self
    }

    /// Serialize the PDF.
    pub fn build(&self) -> Result<Vec<u8>, ConvertError> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let (width, height) = self.media_box;
        let media_box =
            || Object::Array(vec![0.into(), 0.into(), width.into(), height.into()]);

        let mut kids = Vec::new();
        for lines in &self.pages {
            let mut content = String::from("BT /F1 12 Tf 72 720 Td 14 TL ");
            for line in lines {
                content.push_str(&format!("({}) Tj T* ", escape(line)));
            }
            content.push_str("ET");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            };
            if !self.inherit_media_box {
                page.set("MediaBox", media_box());
            }
            kids.push(Object::Reference(doc.add_object(page)));
        }

        let mut pages = dictionary! {
            "Type" => "Pages",
            "Count" => self.pages.len() as i64,
            "Kids" => kids,
        };
        if self.inherit_media_box {
            pages.set("MediaBox", media_box());
        }
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|e| ConvertError::Render(format!("failed to write fixture PDF: {e}")))?;
        Ok(output)
    }
}

/// A PDF with one single-line page per entry of `pages`.
pub fn pdf_with_pages(pages: &[&str]) -> Result<Vec<u8>, ConvertError> {
    pages
        .iter()
        .fold(PdfFixture::new(), |fixture, text| fixture.page(&[*text]))
        .build()
}

/// Escape a literal string operand.
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}
