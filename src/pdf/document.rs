use anyhow::{Context, Result};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

pub struct PdfDocument {
    pub doc: Document,
    pub path: String,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let doc =
            Document::load(&path).with_context(|| format!("Failed to open PDF: {}", path_str))?;
        Ok(PdfDocument {
            doc,
            path: path_str,
        })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get 1-indexed page object IDs
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        let mut pages: Vec<_> = self.doc.get_pages().into_iter().collect();
        pages.sort_by_key(|(num, _)| *num);
        pages
    }

    /// The `/Producer` entry of the info dictionary, which usually names the converter
    pub fn producer(&self) -> Option<String> {
        let info_ref = match self.doc.trailer.get(b"Info") {
            Ok(Object::Reference(id)) => *id,
            _ => return None,
        };
        match self.doc.get_object(info_ref) {
            Ok(Object::Dictionary(dict)) => match dict.get(b"Producer") {
                Ok(Object::String(bytes, _)) => decode_pdf_string(bytes),
                _ => None,
            },
            _ => None,
        }
    }

    /// Build a new document holding pages `start..=end` (1-indexed) in source order.
    ///
    /// Callers validate the range first; an out-of-range request is still refused here
    /// so a bad range can never produce a document with the wrong pages.
    pub fn extract_range(&self, start: u32, end: u32) -> Result<Document> {
        let total = self.page_count();
        if start == 0 || start > end || end > total {
            anyhow::bail!("Page range {}-{} is out of range (1-{})", start, end, total);
        }

        let pages_to_delete: Vec<u32> = self
            .page_ids()
            .into_iter()
            .map(|(num, _)| num)
            .filter(|num| *num < start || *num > end)
            .collect();

        let mut new_doc = self.doc.clone();
        if !pages_to_delete.is_empty() {
            new_doc.delete_pages(&pages_to_delete);
            new_doc.prune_objects();
        }

        Ok(new_doc)
    }

    /// Write a document produced by [`PdfDocument::extract_range`] to `path`.
    pub fn save(doc: &mut Document, path: &Path) -> Result<()> {
        doc.save(path)
            .map(drop)
            .with_context(|| format!("Cannot write {}", path.display()))
    }
}

fn decode_pdf_string(bytes: &[u8]) -> Option<String> {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        // UTF-16 BE
        let u16_chars: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        String::from_utf16(&u16_chars).ok()
    } else {
        // PDFDocEncoding, close enough to Latin-1 for producer strings
        Some(bytes.iter().map(|&b| b as char).collect())
    }
}
