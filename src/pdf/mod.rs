pub mod document;
pub mod splitter;

#[cfg(test)]
pub mod fixtures;

pub use document::PdfDocument;
