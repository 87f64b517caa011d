pub mod pdf;

use crate::error::ConvertError;

/// Load raw bytes as a `lopdf` document.
pub fn load(data: &[u8]) -> Result<lopdf::Document, ConvertError> {
    lopdf::Document::load_mem(data).map_err(|e| ConvertError::Parse(format!("invalid PDF: {e}")))
}
