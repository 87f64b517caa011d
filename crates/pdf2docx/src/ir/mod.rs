mod document;
mod elements;

pub use document::*;
pub use elements::*;
