use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Format;
use crate::error::{ConvertError, ConvertResult};
use crate::{parser, render};

/// An open conversion session against one source PDF.
///
/// The source file is read and parsed once, in [`Converter::open`]. The handle
/// is released by [`Converter::close`] or, on any other exit path, when it is
/// dropped.
pub struct Converter {
    source: PathBuf,
    pdf: lopdf::Document,
}

impl Converter {
    /// Read and parse the PDF at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        Self::from_bytes(&data, path)
    }

    /// Parse an in-memory PDF. `label` names the source in logs and errors.
    pub fn from_bytes(data: &[u8], label: impl Into<PathBuf>) -> Result<Self, ConvertError> {
        let source = label.into();
        if Format::sniff(data) != Some(Format::Pdf) {
            return Err(ConvertError::NotPdf(source.display().to_string()));
        }
        let pdf = parser::load(data)?;
        debug!(source = %source.display(), pages = pdf.get_pages().len(), "opened PDF");
        Ok(Self { source, pdf })
    }

    /// Source label given at open time.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Number of pages in the source PDF.
    pub fn page_count(&self) -> usize {
        self.pdf.get_pages().len()
    }

    /// Convert to DOCX bytes without touching the filesystem.
    pub fn to_docx(&self) -> Result<ConvertResult, ConvertError> {
        let (doc, warnings) = parser::pdf::read_document(&self.pdf)?;
        debug!(
            pages = doc.pages.len(),
            paragraphs = doc.paragraph_count(),
            warnings = warnings.len(),
            "read PDF text"
        );
        let docx = render::docx::write_docx(&doc)?;
        Ok(ConvertResult {
            docx,
            warnings,
            page_count: doc.pages.len(),
        })
    }

    /// Convert and write the DOCX to `destination`, replacing any existing file.
    ///
    /// The package is written to a temporary file next to `destination` and
    /// renamed over it, so a failed conversion or write leaves an existing
    /// destination intact.
    pub fn convert(&self, destination: impl AsRef<Path>) -> Result<ConvertResult, ConvertError> {
        let destination = destination.as_ref();
        let result = self.to_docx()?;
        write_replacing(destination, &result.docx)?;
        info!(
            source = %self.source.display(),
            destination = %destination.display(),
            pages = result.page_count,
            bytes = result.docx.len(),
            "wrote DOCX"
        );
        Ok(result)
    }

    /// Release the handle.
    pub fn close(self) {
        drop(self);
    }
}

fn write_replacing(destination: &Path, data: &[u8]) -> Result<(), ConvertError> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    staged.write_all(data)?;
    staged.as_file().sync_all()?;
    staged.persist(destination).map_err(|e| e.error)?;
    Ok(())
}

impl Drop for Converter {
    fn drop(&mut self) {
        debug!(source = %self.source.display(), "closed converter");
    }
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("source", &self.source)
            .field("pages", &self.page_count())
            .finish()
    }
}
