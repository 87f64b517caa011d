use thiserror::Error;

/// Errors that can occur during document conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("not a PDF file: {0}")]
    NotPdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("render error: {0}")]
    Render(String),
}

/// A non-fatal warning emitted when an element cannot be fully processed.
#[derive(Debug, Clone)]
pub struct ConvertWarning {
    /// Description of the element that caused the warning.
    pub element: String,
    /// Reason the element could not be processed.
    pub reason: String,
}

impl std::fmt::Display for ConvertWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.element, self.reason)
    }
}

/// Result of a successful conversion, containing DOCX bytes and any warnings.
#[derive(Debug)]
pub struct ConvertResult {
    /// The generated DOCX package bytes.
    pub docx: Vec<u8>,
    /// Warnings collected during conversion (non-fatal issues).
    pub warnings: Vec<ConvertWarning>,
    /// Number of pages read from the source PDF.
    pub page_count: usize,
}
