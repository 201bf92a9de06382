//! Request and response bodies for the HTTP surface

use serde::{Deserialize, Serialize};

use crate::pdf::splitter::SplitRequest;

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub page_count: u32,
    pub session_id: String,
    pub message: String,
}

/// Body of `POST /process`. Every field is optional at the wire level so that missing
/// values get their own 400 message instead of a generic parse error.
#[derive(Debug, Default, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub splits: Option<Vec<SplitRequest>>,
    #[serde(default)]
    pub output_folder: Option<String>,
}
