//! Shared test utilities for integration tests.

use std::io::{Cursor, Read};

/// Read `word/document.xml` out of DOCX package bytes.
///
/// Panics if the bytes are not a ZIP archive or the part is missing.
pub fn document_xml(docx: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(docx)).expect("DOCX should be a ZIP");
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .expect("DOCX should contain word/document.xml")
        .read_to_string(&mut xml)
        .expect("document.xml should be UTF-8");
    xml
}
