//! Split a PDF into several named files, one per inclusive page range.
//!
//! Every request is validated and written on its own: a bad range or a failed write
//! is reported for that request and the rest of the batch carries on. Results come
//! back in request order.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::pdf::PdfDocument;

pub const PDF_EXTENSION: &str = ".pdf";

/// One named output file covering pages `start_page..=end_page` (1-indexed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRequest {
    pub filename: String,
    #[serde(deserialize_with = "page_number")]
    pub start_page: i64,
    #[serde(deserialize_with = "page_number")]
    pub end_page: i64,
}

impl SplitRequest {
    pub fn new(filename: impl Into<String>, start_page: i64, end_page: i64) -> Self {
        SplitRequest {
            filename: filename.into(),
            start_page,
            end_page,
        }
    }
}

/// Page numbers arrive either as JSON integers or as numeric strings from form fields.
fn page_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid page number: {:?}", s))),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SplitResult {
    Success {
        filename: String,
        message: String,
        path: PathBuf,
    },
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
        message: String,
    },
}

impl SplitResult {
    fn error(filename: impl Into<String>, message: impl Into<String>) -> Self {
        SplitResult::Error {
            filename: Some(filename.into()),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SplitResult::Success { .. })
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            SplitResult::Success { filename, .. } => Some(filename),
            SplitResult::Error { filename, .. } => filename.as_deref(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            SplitResult::Success { message, .. } | SplitResult::Error { message, .. } => message,
        }
    }
}

pub fn success_count(results: &[SplitResult]) -> usize {
    results.iter().filter(|r| r.is_success()).count()
}

/// Batch outcome: successful if at least one file was written.
#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    pub success: bool,
    pub results: Vec<SplitResult>,
    pub message: String,
}

impl SplitReport {
    pub fn new(results: Vec<SplitResult>, requested: usize) -> Self {
        let created = success_count(&results);
        SplitReport {
            success: created > 0,
            message: format!("Successfully created {} of {} PDF files", created, requested),
            results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Page numbers must be greater than 0")]
    NotPositive,

    #[error("Start page ({start}) cannot be greater than end page ({end})")]
    StartAfterEnd { start: i64, end: i64 },

    #[error("End page ({end}) exceeds total pages ({total})")]
    EndExceedsTotal { end: i64, total: u32 },
}

/// Check a requested range against the source page count.
pub fn validate_range(start: i64, end: i64, total_pages: u32) -> Result<(u32, u32), RangeError> {
    if start < 1 || end < 1 {
        return Err(RangeError::NotPositive);
    }
    if start > end {
        return Err(RangeError::StartAfterEnd { start, end });
    }
    if end > i64::from(total_pages) {
        return Err(RangeError::EndExceedsTotal {
            end,
            total: total_pages,
        });
    }
    // 1 <= start <= end <= total_pages, so both fit in u32
    Ok((start as u32, end as u32))
}

// Literal pattern, so compilation cannot fail at runtime
fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("static regex"))
}

/// Reduce a user-supplied name to a single safe path component.
///
/// The name is NFKD-decomposed and what is still non-ASCII is dropped, path separators and whitespace become `_`,
/// anything outside `[A-Za-z0-9_.-]` is removed and leading/trailing `.`/`_` are
/// stripped. May return an empty string.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name.nfkd().filter(char::is_ascii).collect();
    let spaced = ascii.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = unsafe_chars().replace_all(&joined, "");
    let mut secured = cleaned.trim_matches(|c| c == '.' || c == '_').to_string();

    let base = secured.split('.').next().unwrap_or_default();
    if is_windows_device_name(base) {
        secured.insert(0, '_');
    }
    secured
}

fn is_windows_device_name(base: &str) -> bool {
    let base = base.to_ascii_uppercase();
    match base.as_str() {
        "CON" | "PRN" | "AUX" | "NUL" => true,
        _ => {
            base.len() == 4
                && (base.starts_with("COM") || base.starts_with("LPT"))
                && base.as_bytes()[3].is_ascii_digit()
        }
    }
}

fn has_pdf_extension(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(PDF_EXTENSION)
}

/// The requested name as reported back to the caller, with `.pdf` appended when missing.
pub fn display_filename(requested: &str) -> String {
    if has_pdf_extension(requested) {
        requested.to_string()
    } else {
        format!("{}{}", requested, PDF_EXTENSION)
    }
}

/// The on-disk name for a requested output: sanitized, then forced to end in `.pdf`.
pub fn output_filename(requested: &str) -> Option<String> {
    let mut name = secure_filename(requested);
    if name.is_empty() {
        return None;
    }
    if !has_pdf_extension(&name) {
        name.push_str(PDF_EXTENSION);
    }
    Some(name)
}

/// Write one output file per request into `output_dir`.
///
/// If the source cannot be read the whole batch fails with a single error entry.
pub fn split(source: &Path, requests: &[SplitRequest], output_dir: &Path) -> Vec<SplitResult> {
    let doc = match PdfDocument::open(source) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(source = %source.display(), "cannot read source PDF: {:#}", e);
            return vec![SplitResult::Error {
                filename: None,
                message: format!("Error reading PDF: {:#}", e),
            }];
        }
    };
    let total_pages = doc.page_count();
    debug!(source = %doc.path, total_pages, requests = requests.len(), "splitting");

    requests
        .iter()
        .map(|request| split_one(&doc, total_pages, request, output_dir))
        .collect()
}

fn split_one(
    doc: &PdfDocument,
    total_pages: u32,
    request: &SplitRequest,
    output_dir: &Path,
) -> SplitResult {
    let filename = display_filename(&request.filename);

    let (start, end) = match validate_range(request.start_page, request.end_page, total_pages) {
        Ok(range) => range,
        Err(e) => {
            debug!(%filename, "rejected: {}", e);
            return SplitResult::error(filename, e.to_string());
        }
    };

    let Some(safe_name) = output_filename(&request.filename) else {
        return SplitResult::error(filename, "Invalid output filename");
    };
    let path = output_dir.join(safe_name);

    let mut new_doc = match doc.extract_range(start, end) {
        Ok(new_doc) => new_doc,
        Err(e) => return SplitResult::error(filename, format!("Error building PDF: {:#}", e)),
    };

    match PdfDocument::save(&mut new_doc, &path) {
        Ok(()) => {
            info!(path = %path.display(), start, end, "wrote split");
            SplitResult::Success {
                filename,
                message: format!("Created with pages {}-{}", start, end),
                path,
            }
        }
        Err(e) => {
            warn!(path = %path.display(), "write failed: {:#}", e);
            SplitResult::error(filename, format!("Error writing file: {:#}", e))
        }
    }
}
