pub mod config;
pub mod error;
#[doc(hidden)]
pub mod fixtures;
pub mod ir;
pub mod parser;
pub mod render;

mod converter;

use std::path::Path;

pub use converter::Converter;
use error::{ConvertError, ConvertResult};

/// Convert the PDF at `source` into a DOCX file at `destination`.
///
/// Opens a [`Converter`], writes the output, and closes the handle.
pub fn convert(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
) -> Result<ConvertResult, ConvertError> {
    let converter = Converter::open(source)?;
    let result = converter.convert(destination)?;
    converter.close();
    Ok(result)
}

/// Convert raw PDF bytes to DOCX bytes.
pub fn convert_bytes(data: &[u8]) -> Result<ConvertResult, ConvertError> {
    Converter::from_bytes(data, "<memory>")?.to_docx()
}
