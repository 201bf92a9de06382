//! Temp-file lifecycle for an upload and the split request that follows it.
//!
//! Nothing is held in memory between requests. A session token names two files in the
//! temp directory, `upload_<token>` and `converted_<token>.pdf`, and the later request
//! rebuilds both paths from the token alone. Concurrent requests on one token are not
//! coordinated.

use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::convert::remove_if_present;
use crate::pdf::splitter::secure_filename;

pub const ALLOWED_EXTENSIONS: &[&str] = &["docx", "doc"];

const UPLOAD_PREFIX: &str = "upload_";
const CONVERTED_PREFIX: &str = "converted_";

fn extension(filename: &str) -> Option<&str> {
    filename.rsplit_once('.').map(|(_, ext)| ext)
}

/// Whether `filename` carries a whitelisted extension (case-insensitive).
pub fn allowed_file(filename: &str) -> bool {
    extension(filename)
        .map(|ext| ALLOWED_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// A fresh token: a random prefix plus the sanitized original name, extension kept.
pub fn new_token(original_filename: &str) -> String {
    let mut name = secure_filename(original_filename);
    if !allowed_file(&name) {
        let ext = extension(original_filename)
            .filter(|ext| allowed_file(&format!(".{}", ext)))
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| ALLOWED_EXTENSIONS[0].to_string());
        name = format!("document.{}", ext);
    }
    format!("{}_{}", Uuid::new_v4().simple(), name)
}

/// Tokens come back from clients, so only a single sanitized path component is accepted.
pub fn is_valid_token(token: &str) -> bool {
    !token.is_empty() && secure_filename(token) == token
}

/// An upload whose document has been converted and counted.
#[derive(Debug, Clone)]
pub struct UploadSession {
    pub token: String,
    pub original_filename: String,
    pub page_count: u32,
}

/// Paths reserved for an upload that has not been converted yet.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub token: String,
    pub original_filename: String,
    pub upload_path: PathBuf,
    pub converted_path: PathBuf,
}

impl PendingUpload {
    pub fn into_session(self, page_count: u32) -> UploadSession {
        UploadSession {
            token: self.token,
            original_filename: self.original_filename,
            page_count,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    temp_dir: PathBuf,
}

impl SessionStore {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        SessionStore {
            temp_dir: temp_dir.into(),
        }
    }

    pub fn begin(&self, original_filename: &str) -> PendingUpload {
        let token = new_token(original_filename);
        debug!(%token, original_filename, "new upload");
        PendingUpload {
            upload_path: self.upload_path(&token),
            converted_path: self.converted_path(&token),
            original_filename: original_filename.to_string(),
            token,
        }
    }

    pub fn upload_path(&self, token: &str) -> PathBuf {
        self.temp_dir.join(format!("{}{}", UPLOAD_PREFIX, token))
    }

    pub fn converted_path(&self, token: &str) -> PathBuf {
        self.temp_dir.join(format!("{}{}.pdf", CONVERTED_PREFIX, token))
    }

    /// The converted PDF for `token`, if the token is well-formed and the file is still there.
    pub fn locate(&self, token: &str) -> Option<PathBuf> {
        if !is_valid_token(token) {
            debug!(token, "rejected malformed token");
            return None;
        }
        let path = self.converted_path(token);
        path.is_file().then_some(path)
    }

    /// Remove both temp files of a session. Missing files are fine.
    pub async fn discard(&self, token: &str) {
        if !is_valid_token(token) {
            return;
        }
        remove_if_present(&self.upload_path(token)).await;
        remove_if_present(&self.converted_path(token)).await;
        debug!(token, "session discarded");
    }
}
